//! Layering partial overrides onto a configuration snapshot
//!
//! Merging is deliberately shallow. Each top-level section is merged on its
//! own: fields the override supplies replace the base fields, everything
//! else is kept. Nothing deeper than one level is merged, so an override
//! for `modes.challenge` replaces the whole challenge entry and an override
//! for `credits.bundles` replaces the whole bundle table.
//!
//! The merge never validates. Use [`Config::check`] on the result (or
//! [`crate::store::ConfigStore::try_update_config`]) to reject bad data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    config::{AntiCheatConfig, AppConfig, Config, GameSettings, PaymentsConfig},
    economy::{Bundle, CreditsConfig},
    error::Error,
    mode::ModeConfig,
};

/// A partial section that knows how to overlay itself onto a full one
pub trait SectionOverride {
    /// The full section this override applies to
    type Section: Clone;

    /// Returns `base` with every field this override supplies replaced
    fn apply(&self, base: &Self::Section) -> Self::Section;
}

fn merge_section<O: SectionOverride>(base: &O::Section, overrides: Option<&O>) -> O::Section {
    match overrides {
        Some(overrides) => overrides.apply(base),
        None => base.clone(),
    }
}

/// Entries of `overrides` replace or extend `base` key by key
fn merge_entries<V: Clone>(
    base: &BTreeMap<String, V>,
    overrides: Option<&BTreeMap<String, V>>,
) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    if let Some(overrides) = overrides {
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

#[skip_serializing_none]
/// Partial credits section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsOverride {
    /// Replaces the daily claim amount
    pub daily_claim_amount: Option<u64>,
    /// Replaces the ad reward amount
    pub ad_reward_amount: Option<u64>,
    /// Replaces the daily ad limit
    pub ad_reward_daily_limit: Option<u32>,
    /// Replaces the entire bundle table
    pub bundles: Option<BTreeMap<String, Bundle>>,
}

impl SectionOverride for CreditsOverride {
    type Section = CreditsConfig;

    fn apply(&self, base: &CreditsConfig) -> CreditsConfig {
        CreditsConfig {
            daily_claim_amount: self.daily_claim_amount.unwrap_or(base.daily_claim_amount),
            ad_reward_amount: self.ad_reward_amount.unwrap_or(base.ad_reward_amount),
            ad_reward_daily_limit: self
                .ad_reward_daily_limit
                .unwrap_or(base.ad_reward_daily_limit),
            bundles: self.bundles.clone().unwrap_or_else(|| base.bundles.clone()),
        }
    }
}

#[skip_serializing_none]
/// Partial game settings section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettingsOverride {
    /// Replaces the question timer
    pub default_question_timer: Option<u32>,
    /// Replaces the batch size
    pub questions_per_batch: Option<u32>,
    /// Replaces the offline cache size
    pub max_offline_questions: Option<u32>,
    /// Replaces the resume window
    pub max_resume_time_minutes: Option<u32>,
}

impl SectionOverride for GameSettingsOverride {
    type Section = GameSettings;

    fn apply(&self, base: &GameSettings) -> GameSettings {
        GameSettings {
            default_question_timer: self
                .default_question_timer
                .unwrap_or(base.default_question_timer),
            questions_per_batch: self.questions_per_batch.unwrap_or(base.questions_per_batch),
            max_offline_questions: self
                .max_offline_questions
                .unwrap_or(base.max_offline_questions),
            max_resume_time_minutes: self
                .max_resume_time_minutes
                .unwrap_or(base.max_resume_time_minutes),
        }
    }
}

#[skip_serializing_none]
/// Partial anti-cheat section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiCheatOverride {
    /// Replaces the submission rate limit
    pub max_submissions_per_minute: Option<u32>,
    /// Replaces the suspicious score threshold
    pub suspicious_score_threshold: Option<f64>,
    /// Replaces the concurrent session limit
    pub max_concurrent_sessions: Option<u32>,
    /// Replaces the device fingerprint flag
    pub track_device_fingerprint: Option<bool>,
    /// Replaces the answer timing flag
    pub track_answer_timing: Option<bool>,
}

impl SectionOverride for AntiCheatOverride {
    type Section = AntiCheatConfig;

    fn apply(&self, base: &AntiCheatConfig) -> AntiCheatConfig {
        AntiCheatConfig {
            max_submissions_per_minute: self
                .max_submissions_per_minute
                .unwrap_or(base.max_submissions_per_minute),
            suspicious_score_threshold: self
                .suspicious_score_threshold
                .unwrap_or(base.suspicious_score_threshold),
            max_concurrent_sessions: self
                .max_concurrent_sessions
                .unwrap_or(base.max_concurrent_sessions),
            track_device_fingerprint: self
                .track_device_fingerprint
                .unwrap_or(base.track_device_fingerprint),
            track_answer_timing: self.track_answer_timing.unwrap_or(base.track_answer_timing),
        }
    }
}

#[skip_serializing_none]
/// Partial payments section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsOverride {
    /// Replaces the publishable key
    pub publishable_key: Option<String>,
    /// Replaces the test mode flag
    pub test_mode: Option<bool>,
    /// Replaces the charge currency
    pub currency: Option<String>,
}

impl SectionOverride for PaymentsOverride {
    type Section = PaymentsConfig;

    fn apply(&self, base: &PaymentsConfig) -> PaymentsConfig {
        PaymentsConfig {
            publishable_key: self
                .publishable_key
                .clone()
                .unwrap_or_else(|| base.publishable_key.clone()),
            test_mode: self.test_mode.unwrap_or(base.test_mode),
            currency: self
                .currency
                .clone()
                .unwrap_or_else(|| base.currency.clone()),
        }
    }
}

#[skip_serializing_none]
/// Partial app metadata section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOverride {
    /// Replaces the display name
    pub name: Option<String>,
    /// Replaces the environment name
    pub environment: Option<String>,
    /// Replaces the minimum supported client version
    pub minimum_supported_version: Option<String>,
    /// Replaces the support address
    pub support_email: Option<String>,
}

impl SectionOverride for AppOverride {
    type Section = AppConfig;

    fn apply(&self, base: &AppConfig) -> AppConfig {
        AppConfig {
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            environment: self
                .environment
                .clone()
                .unwrap_or_else(|| base.environment.clone()),
            minimum_supported_version: self
                .minimum_supported_version
                .clone()
                .unwrap_or_else(|| base.minimum_supported_version.clone()),
            support_email: self
                .support_email
                .clone()
                .unwrap_or_else(|| base.support_email.clone()),
        }
    }
}

#[skip_serializing_none]
/// A partial configuration, shaped like [`Config`] with every part optional
///
/// Unknown sections and fields in JSON input are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Mode entries, each replacing the base entry wholesale
    pub modes: Option<BTreeMap<String, ModeConfig>>,
    /// Partial credits section
    pub credits: Option<CreditsOverride>,
    /// Thresholds, each replacing the base threshold of its mode
    pub winner_gating_thresholds: Option<BTreeMap<String, f64>>,
    /// Partial game settings
    pub game: Option<GameSettingsOverride>,
    /// Partial anti-cheat section
    pub anti_cheat: Option<AntiCheatOverride>,
    /// Partial payments section
    pub payments: Option<PaymentsOverride>,
    /// Partial app metadata
    pub app: Option<AppOverride>,
}

impl ConfigOverride {
    /// Parses an override from JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the input is not JSON or a field has the
    /// wrong type.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts an already parsed JSON value into an override
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if a field has the wrong type.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// Names of the sections this override touches, in schema order
    pub fn sections(&self) -> Vec<&'static str> {
        [
            ("modes", self.modes.is_some()),
            ("credits", self.credits.is_some()),
            ("winnerGatingThresholds", self.winner_gating_thresholds.is_some()),
            ("game", self.game.is_some()),
            ("antiCheat", self.anti_cheat.is_some()),
            ("payments", self.payments.is_some()),
            ("app", self.app.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Whether this override touches no section at all
    pub fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }
}

/// Produces a new snapshot with `overrides` layered onto `base`
pub fn merge(base: &Config, overrides: &ConfigOverride) -> Config {
    Config {
        modes: merge_entries(&base.modes, overrides.modes.as_ref()),
        credits: merge_section(&base.credits, overrides.credits.as_ref()),
        winner_gating_thresholds: merge_entries(
            &base.winner_gating_thresholds,
            overrides.winner_gating_thresholds.as_ref(),
        ),
        game: merge_section(&base.game, overrides.game.as_ref()),
        anti_cheat: merge_section(&base.anti_cheat, overrides.anti_cheat.as_ref()),
        payments: merge_section(&base.payments, overrides.payments.as_ref()),
        app: merge_section(&base.app, overrides.app.as_ref()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{env::Environment, mode::Currency};

    fn base() -> Config {
        Config::base(&Environment::default())
    }

    fn overrides(value: serde_json::Value) -> ConfigOverride {
        ConfigOverride::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_override_is_identity() {
        let base = base();
        assert_eq!(merge(&base, &ConfigOverride::default()), base);
        assert_eq!(merge(&base, &overrides(json!({}))), base);
    }

    #[test]
    fn test_credits_field_override() {
        let base = base();
        let merged = merge(&base, &overrides(json!({ "credits": { "dailyClaimAmount": 20 } })));

        assert_eq!(merged.credits.daily_claim_amount, 20);
        assert_eq!(merged.credits.ad_reward_amount, 1);
        assert_eq!(merged.credits.bundles, base.credits.bundles);
        assert_eq!(merged.game, base.game);
        assert_eq!(merged.modes, base.modes);
    }

    #[test]
    fn test_single_field_override_per_section() {
        let base = base();
        let cases = [
            (json!({ "game": { "questionsPerBatch": 9 } }), "game"),
            (json!({ "antiCheat": { "trackAnswerTiming": false } }), "antiCheat"),
            (json!({ "payments": { "currency": "eur" } }), "payments"),
            (json!({ "app": { "name": "Quiz Night" } }), "app"),
            (json!({ "winnerGatingThresholds": { "free": 750.0 } }), "winnerGatingThresholds"),
        ];

        for (value, section) in cases {
            let merged = merge(&base, &overrides(value.clone()));
            let merged_json = serde_json::to_value(&merged).unwrap();
            let base_json = serde_json::to_value(&base).unwrap();

            let (field, expected) = value[section].as_object().unwrap().iter().next().unwrap();
            assert_eq!(&merged_json[section][field], expected, "{section}.{field}");

            for (other_field, base_value) in base_json[section].as_object().unwrap() {
                if other_field != field {
                    assert_eq!(&merged_json[section][other_field], base_value);
                }
            }
            for (other_section, base_value) in base_json.as_object().unwrap() {
                if other_section != section {
                    assert_eq!(&merged_json[other_section], base_value);
                }
            }
        }
    }

    #[test]
    fn test_mode_entry_is_replaced_wholesale() {
        let merged = merge(
            &base(),
            &overrides(json!({ "modes": { "challenge": { "entryFee": 999 } } })),
        );

        let challenge = merged.mode_config("challenge").unwrap();
        assert_eq!(
            challenge,
            &ModeConfig {
                entry_fee: Some(999.),
                ..ModeConfig::default()
            }
        );
        assert_eq!(challenge.name, None);
        assert_eq!(challenge.questions, None);
        assert_eq!(merged.modes["free"], base().modes["free"]);
    }

    #[test]
    fn test_bundle_table_is_replaced_wholesale() {
        let merged = merge(
            &base(),
            &overrides(json!({ "credits": { "bundles": { "solo": { "price": 1.0, "credits": 3 } } } })),
        );
        assert_eq!(merged.credits.bundles.len(), 1);
        assert_eq!(merged.credits.bundle("solo").map(|b| b.credits), Some(3));
        assert_eq!(merged.credits.daily_claim_amount, 5);
    }

    #[test]
    fn test_new_mode_keys_are_added() {
        let merged = merge(
            &base(),
            &overrides(json!({ "modes": { "weekend": { "name": "Weekend" } } })),
        );
        assert_eq!(merged.modes.len(), 5);
        assert_eq!(
            merged.mode_config("weekend").unwrap().name.as_deref(),
            Some("Weekend")
        );
    }

    #[test]
    fn test_merge_does_not_validate() {
        let merged = merge(
            &base(),
            &overrides(json!({ "modes": { "tournament": {
                "entryFee": -5.0,
                "payoutCurrency": "CREDITS"
            } } })),
        );
        let tournament = merged.mode_config("tournament").unwrap();
        assert_eq!(tournament.entry_fee, Some(-5.));
        assert_eq!(tournament.payout_currency, Some(Currency::Credits));
        assert!(merged.check().is_err());
    }

    #[test]
    fn test_merge_is_applied_against_given_snapshot() {
        let base = base();
        let first = overrides(json!({ "game": { "defaultQuestionTimer": 20 } }));
        let second = overrides(json!({ "game": { "questionsPerBatch": 8 } }));

        let merged = merge(&merge(&base, &first), &second);
        assert_eq!(merged.game.default_question_timer, 20);
        assert_eq!(merged.game.questions_per_batch, 8);
    }

    #[test]
    fn test_wrong_field_type_is_rejected_at_parse() {
        let result = ConfigOverride::from_json(r#"{ "credits": { "dailyClaimAmount": "lots" } }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let parsed = ConfigOverride::from_json(r#"{ "featureFlags": { "dark": true } }"#).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_sections_lists_present_sections() {
        let parsed = overrides(json!({ "app": {}, "credits": { "adRewardAmount": 2 } }));
        assert_eq!(parsed.sections(), vec!["credits", "app"]);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_override_serializes_sparse() {
        let parsed = overrides(json!({ "credits": { "dailyClaimAmount": 20 } }));
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({ "credits": { "dailyClaimAmount": 20 } })
        );
    }
}
