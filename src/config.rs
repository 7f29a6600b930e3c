//! The full configuration snapshot and its compiled-in base
//!
//! A [`Config`] groups every section consumed by game, wallet and anti-cheat
//! logic. [`Config::base`] builds the compiled-in defaults; overrides are
//! layered on top by [`crate::merge`].

use std::collections::BTreeMap;

use enum_map::{EnumMap, enum_map};
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{app, game, payments},
    economy::{Bundle, CreditsConfig},
    env::Environment,
    error::Error,
    mode::{Currency, ModeConfig, ModeKey, PeriodType},
};

/// Timing and batching settings for game sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Seconds a player gets to answer each question
    #[garde(range(min = game::MIN_QUESTION_TIMER, max = game::MAX_QUESTION_TIMER))]
    pub default_question_timer: u32,
    /// Questions fetched per request
    #[garde(range(min = 1, max = game::MAX_QUESTIONS_PER_BATCH))]
    pub questions_per_batch: u32,
    /// Questions cached for offline play
    #[garde(range(min = 1, max = game::MAX_OFFLINE_QUESTIONS))]
    pub max_offline_questions: u32,
    /// Minutes an interrupted session stays resumable
    #[garde(range(min = 1, max = game::MAX_RESUME_TIME_MINUTES))]
    pub max_resume_time_minutes: u32,
}

/// Thresholds used to flag automated or abusive play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AntiCheatConfig {
    /// Answer submissions allowed per player per minute
    #[garde(range(min = 1))]
    pub max_submissions_per_minute: u32,
    /// Fraction of correct answers above which a session is reviewed
    #[garde(range(min = 0.0, max = 1.0), custom(validate_finite))]
    pub suspicious_score_threshold: f64,
    /// Sessions a player may have open at once
    #[garde(range(min = 1))]
    pub max_concurrent_sessions: u32,
    /// Record device fingerprints with each session
    #[garde(skip)]
    pub track_device_fingerprint: bool,
    /// Record per-question answer timing
    #[garde(skip)]
    pub track_answer_timing: bool,
}

/// Payments provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsConfig {
    /// Publishable key, empty when the environment does not provide one
    #[garde(skip)]
    pub publishable_key: String,
    /// Whether charges go against the provider's test mode
    #[garde(skip)]
    pub test_mode: bool,
    /// ISO 4217 code of card charges
    #[garde(length(chars, min = payments::CURRENCY_CODE_LENGTH, max = payments::CURRENCY_CODE_LENGTH))]
    pub currency: String,
}

/// Application metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Display name
    #[garde(length(chars, min = 1, max = app::MAX_NAME_LENGTH))]
    pub name: String,
    /// Deployment environment name
    #[garde(skip)]
    pub environment: String,
    /// Oldest client version still allowed to connect
    #[garde(skip)]
    pub minimum_supported_version: String,
    /// Address shown on support screens
    #[garde(contains("@"))]
    pub support_email: String,
}

/// A complete configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Game modes keyed by snapshot key (see [`ModeKey::as_str`])
    #[garde(dive, custom(validate_mode_fees))]
    pub modes: BTreeMap<String, ModeConfig>,
    /// Credits economy
    #[garde(dive)]
    pub credits: CreditsConfig,
    /// Local-currency prize value at which winners need extra verification
    #[garde(custom(validate_threshold_order))]
    pub winner_gating_thresholds: BTreeMap<String, f64>,
    /// Game session settings
    #[garde(dive)]
    pub game: GameSettings,
    /// Anti-cheat thresholds
    #[garde(dive)]
    pub anti_cheat: AntiCheatConfig,
    /// Payments provider settings
    #[garde(dive)]
    pub payments: PaymentsConfig,
    /// Application metadata
    #[garde(dive)]
    pub app: AppConfig,
}

fn validate_finite(value: &f64, _ctx: &()) -> garde::Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(garde::Error::new("must be a finite number"))
    }
}

/// Only the free mode may be entered without paying
fn validate_mode_fees(modes: &BTreeMap<String, ModeConfig>, _ctx: &()) -> garde::Result {
    let free = ModeKey::Free.as_str();
    for (key, mode) in modes {
        match mode.entry_fee {
            Some(fee) if key == free && fee != 0. => {
                return Err(garde::Error::new(format!(
                    "mode `{key}` must not charge an entry fee"
                )));
            }
            Some(fee) if key != free && (fee.is_nan() || fee <= 0.) => {
                return Err(garde::Error::new(format!(
                    "mode `{key}` must charge an entry fee"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Thresholds must be non-negative and never decrease with mode severity
fn validate_threshold_order(thresholds: &BTreeMap<String, f64>, _ctx: &()) -> garde::Result {
    if let Some((key, _)) = thresholds
        .iter()
        .find(|(_, threshold)| !threshold.is_finite() || **threshold < 0.)
    {
        return Err(garde::Error::new(format!(
            "threshold for `{key}` must be a non-negative amount"
        )));
    }

    ModeKey::all()
        .filter_map(|key| thresholds.get(key.as_str()).map(|threshold| (key, threshold)))
        .tuple_windows()
        .find(|((_, lower), (_, higher))| higher < lower)
        .map_or(Ok(()), |((lower, _), (higher, _))| {
            Err(garde::Error::new(format!(
                "threshold for `{higher}` is below the threshold for `{lower}`"
            )))
        })
}

fn base_modes() -> EnumMap<ModeKey, ModeConfig> {
    use Currency::{Credits, Usd};
    use PeriodType::{Monthly, Weekly};

    enum_map! {
        ModeKey::Free => ModeConfig::new("Free", 10, 0., Credits, 25., Usd, 8, Weekly, 1),
        ModeKey::Challenge => ModeConfig::new("Challenge", 15, 1., Credits, 100., Usd, 12, Weekly, 3),
        ModeKey::Tournament => ModeConfig::new("Tournament", 20, 5., Credits, 500., Usd, 16, Monthly, 5),
        ModeKey::SuperTournament => {
            ModeConfig::new("Super Tournament", 25, 20., Credits, 2500., Usd, 20, Monthly, 10)
        }
    }
}

fn base_thresholds() -> EnumMap<ModeKey, f64> {
    enum_map! {
        ModeKey::Free => 500.,
        ModeKey::Challenge => 1_000.,
        ModeKey::Tournament => 5_000.,
        ModeKey::SuperTournament => 10_000.,
    }
}

fn base_bundles() -> BTreeMap<String, Bundle> {
    [
        ("starter", 0.99, 5),
        ("popular", 4.99, 30),
        ("value", 9.99, 70),
        ("mega", 19.99, 150),
    ]
    .into_iter()
    .map(|(id, price, credits)| (id.to_owned(), Bundle { price, credits }))
    .collect()
}

impl Config {
    /// Builds the compiled-in base configuration
    ///
    /// The payments key and test mode flag are taken from `env`.
    pub fn base(env: &Environment) -> Self {
        let config = Self {
            modes: base_modes()
                .into_iter()
                .map(|(key, mode)| (key.as_str().to_owned(), mode))
                .collect(),
            credits: CreditsConfig {
                daily_claim_amount: 5,
                ad_reward_amount: 1,
                ad_reward_daily_limit: 5,
                bundles: base_bundles(),
            },
            winner_gating_thresholds: base_thresholds()
                .into_iter()
                .map(|(key, threshold)| (key.as_str().to_owned(), threshold))
                .collect(),
            game: GameSettings {
                default_question_timer: 15,
                questions_per_batch: 5,
                max_offline_questions: 20,
                max_resume_time_minutes: 30,
            },
            anti_cheat: AntiCheatConfig {
                max_submissions_per_minute: 30,
                suspicious_score_threshold: 0.95,
                max_concurrent_sessions: 1,
                track_device_fingerprint: true,
                track_answer_timing: true,
            },
            payments: PaymentsConfig {
                publishable_key: env.publishable_key.clone(),
                test_mode: env.test_mode(),
                currency: "usd".to_owned(),
            },
            app: AppConfig {
                name: "Trivia".to_owned(),
                environment: env.name.clone(),
                minimum_supported_version: "1.0.0".to_owned(),
                support_email: "support@trivia.app".to_owned(),
            },
        };
        tracing::debug!(environment = %env.name, "built base configuration");
        config
    }

    /// Looks up a mode by its snapshot key
    ///
    /// # Errors
    ///
    /// Returns `Error::ModeNotFound` if no mode is stored under `key`.
    pub fn mode_config(&self, key: &str) -> Result<&ModeConfig, Error> {
        self.modes
            .get(key)
            .ok_or_else(|| Error::ModeNotFound(key.to_owned()))
    }

    /// Looks up the winner gating threshold of a mode
    pub fn winner_gating_threshold(&self, key: &str) -> Option<f64> {
        self.winner_gating_thresholds.get(key).copied()
    }

    /// Whether a prize of `prize` (local currency) needs winner verification
    ///
    /// # Errors
    ///
    /// Returns `Error::ThresholdNotFound` if the mode has no threshold.
    pub fn requires_winner_verification(&self, key: &str, prize: f64) -> Result<bool, Error> {
        self.winner_gating_threshold(key)
            .map(|threshold| prize >= threshold)
            .ok_or_else(|| Error::ThresholdNotFound(key.to_owned()))
    }

    /// Checks every section against its invariants
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` with the full validation report.
    pub fn check(&self) -> Result<(), Error> {
        self.validate().map_err(Error::InvalidConfig)
    }
}
