//! Game mode definitions
//!
//! A mode is a named game variant with its own entry fee, payout, question
//! count and qualification rule. The known variants are listed in
//! [`ModeKey`] in order of severity; the snapshot itself keys modes by
//! string so that overrides may introduce or replace entries freely.

use std::{fmt::Display, str::FromStr};

use enum_map::Enum;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    constants::mode::{MAX_NAME_LENGTH, MAX_QUESTIONS, MAX_WINNERS},
    error::Error,
};

/// The known game modes, declared from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ModeKey {
    /// Free weekly competition, no entry fee
    Free,
    /// Low-stakes paid competition
    Challenge,
    /// Monthly paid tournament
    Tournament,
    /// Monthly high-stakes tournament
    SuperTournament,
}

impl ModeKey {
    /// Returns the key under which this mode is stored in a snapshot
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Challenge => "challenge",
            Self::Tournament => "tournament",
            Self::SuperTournament => "superTournament",
        }
    }

    /// Iterates over all known modes in severity order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::LENGTH).map(Self::from_usize)
    }
}

impl Display for ModeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKey {
    type Err = Error;

    /// Parses a snapshot key back into a known mode
    ///
    /// # Errors
    ///
    /// Returns `Error::ModeNotFound` if the key names none of the known modes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::ModeNotFound(s.to_owned()))
    }
}

/// Currency an amount is denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    /// Real money
    Usd,
    /// In-app credits
    Credits,
}

/// Length of the competition period a mode runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    /// One competition per week
    Weekly,
    /// One competition per month
    Monthly,
}

#[skip_serializing_none]
/// Configuration of a single game mode
///
/// Every field is optional: an override replaces a mode entry wholesale, so
/// a stored entry carries exactly the fields its source supplied. The
/// compiled-in entries set all of them, and validation rejects entries that
/// miss any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    /// Display name
    #[garde(required, length(chars, min = 1, max = MAX_NAME_LENGTH))]
    pub name: Option<String>,
    /// Number of questions in a full session
    #[garde(required, range(min = 1, max = MAX_QUESTIONS))]
    pub questions: Option<u32>,
    /// Amount deducted to enter a session
    #[garde(required, range(min = 0.0), custom(validate_finite_amount))]
    pub entry_fee: Option<f64>,
    /// Currency the entry fee is charged in
    #[garde(required)]
    pub entry_fee_currency: Option<Currency>,
    /// Prize pool paid out at the end of the period
    #[garde(required, range(min = 0.0), custom(validate_finite_amount))]
    pub payout: Option<f64>,
    /// Currency the payout is made in; credits are never paid out as prizes
    #[garde(required, custom(|currency, _| validate_payout_currency(currency)))]
    pub payout_currency: Option<Currency>,
    /// Answers needed for a session to count towards the period leaderboard
    #[garde(required, range(min = 1), custom(at_most_questions(&self.questions)))]
    pub min_answers_to_qualify: Option<u32>,
    /// Length of the competition period
    #[garde(required)]
    pub period_type: Option<PeriodType>,
    /// Maximum number of winners per period
    #[garde(required, range(min = 1, max = MAX_WINNERS))]
    pub max_winners: Option<u32>,
}

fn validate_finite_amount(amount: &Option<f64>, _ctx: &()) -> garde::Result {
    match amount {
        Some(amount) if !amount.is_finite() => Err(garde::Error::new("amount must be finite")),
        _ => Ok(()),
    }
}

fn validate_payout_currency(currency: &Option<Currency>) -> garde::Result {
    match currency {
        Some(Currency::Credits) => Err(garde::Error::new("prizes cannot be paid in credits")),
        _ => Ok(()),
    }
}

fn at_most_questions(
    questions: &Option<u32>,
) -> impl FnOnce(&Option<u32>, &()) -> garde::Result + '_ {
    move |min_answers, _| match (min_answers, questions) {
        (Some(min_answers), Some(questions)) if min_answers > questions => Err(
            garde::Error::new(format!("greater than the question count {questions}")),
        ),
        _ => Ok(()),
    }
}

impl ModeConfig {
    /// Creates a fully specified mode entry
    pub fn new(
        name: &str,
        questions: u32,
        entry_fee: f64,
        entry_fee_currency: Currency,
        payout: f64,
        payout_currency: Currency,
        min_answers_to_qualify: u32,
        period_type: PeriodType,
        max_winners: u32,
    ) -> Self {
        Self {
            name: Some(name.to_owned()),
            questions: Some(questions),
            entry_fee: Some(entry_fee),
            entry_fee_currency: Some(entry_fee_currency),
            payout: Some(payout),
            payout_currency: Some(payout_currency),
            min_answers_to_qualify: Some(min_answers_to_qualify),
            period_type: Some(period_type),
            max_winners: Some(max_winners),
        }
    }

    /// Whether entering this mode costs nothing
    ///
    /// An entry without a fee is not considered free.
    pub fn is_free(&self) -> bool {
        self.entry_fee.is_some_and(|fee| fee == 0.)
    }

    /// Whether a session with `answered` answers qualifies for the period
    ///
    /// Entries without a qualification threshold never qualify.
    pub fn qualifies(&self, answered: u32) -> bool {
        self.min_answers_to_qualify
            .is_some_and(|min_answers| answered >= min_answers)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn challenge() -> ModeConfig {
        ModeConfig::new(
            "Challenge",
            15,
            1.,
            Currency::Credits,
            100.,
            Currency::Usd,
            12,
            PeriodType::Weekly,
            3,
        )
    }

    #[test]
    fn test_mode_key_order_is_severity() {
        let keys: Vec<_> = ModeKey::all().collect();
        assert_eq!(
            keys,
            vec![
                ModeKey::Free,
                ModeKey::Challenge,
                ModeKey::Tournament,
                ModeKey::SuperTournament
            ]
        );
        assert!(ModeKey::Free < ModeKey::SuperTournament);
    }

    #[test]
    fn test_mode_key_parse() {
        assert_eq!(
            "superTournament".parse::<ModeKey>().unwrap(),
            ModeKey::SuperTournament
        );
        assert_eq!(ModeKey::Challenge.to_string(), "challenge");
        assert!(matches!(
            "nonexistent".parse::<ModeKey>(),
            Err(Error::ModeNotFound(key)) if key == "nonexistent"
        ));
    }

    #[test]
    fn test_mode_key_serde_matches_as_str() {
        for key in ModeKey::all() {
            let serialized = serde_json::to_string(&key).unwrap();
            assert_eq!(serialized, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn test_currency_wire_names() {
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        assert_eq!(
            serde_json::to_string(&Currency::Credits).unwrap(),
            "\"CREDITS\""
        );
        assert_eq!(
            serde_json::to_string(&PeriodType::Monthly).unwrap(),
            "\"MONTHLY\""
        );
    }

    #[test]
    fn test_full_mode_is_valid() {
        assert!(challenge().validate().is_ok());
    }

    #[test]
    fn test_partial_mode_is_invalid() {
        let partial = ModeConfig {
            entry_fee: Some(999.),
            ..ModeConfig::default()
        };
        assert!(partial.validate().is_err());
    }

    #[test]
    fn test_min_answers_above_questions_is_invalid() {
        let mode = ModeConfig {
            min_answers_to_qualify: Some(16),
            ..challenge()
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn test_credits_payout_is_invalid() {
        let mode = ModeConfig {
            payout_currency: Some(Currency::Credits),
            ..challenge()
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn test_negative_entry_fee_is_invalid() {
        let mode = ModeConfig {
            entry_fee: Some(-1.),
            ..challenge()
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn test_non_finite_amounts_are_invalid() {
        for amount in [f64::NAN, f64::INFINITY] {
            let fee = ModeConfig {
                entry_fee: Some(amount),
                ..challenge()
            };
            assert!(fee.validate().is_err(), "entry fee {amount}");

            let payout = ModeConfig {
                payout: Some(amount),
                ..challenge()
            };
            assert!(payout.validate().is_err(), "payout {amount}");
        }
    }

    #[test]
    fn test_qualifies() {
        let mode = challenge();
        assert!(!mode.qualifies(11));
        assert!(mode.qualifies(12));
        assert!(mode.qualifies(15));
        assert!(!ModeConfig::default().qualifies(100));
    }

    #[test]
    fn test_is_free() {
        assert!(!challenge().is_free());
        let free = ModeConfig {
            entry_fee: Some(0.),
            ..challenge()
        };
        assert!(free.is_free());
        assert!(!ModeConfig::default().is_free());
    }

    #[test]
    fn test_partial_mode_serializes_only_present_fields() {
        let partial = ModeConfig {
            entry_fee: Some(999.),
            ..ModeConfig::default()
        };
        assert_eq!(
            serde_json::to_value(&partial).unwrap(),
            serde_json::json!({ "entryFee": 999.0 })
        );
    }
}
