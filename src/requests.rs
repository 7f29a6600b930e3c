//! Incoming request payloads validated against the configuration
//!
//! Requests arrive as JSON tagged by `type`. They are only usable once
//! [`Request::into_valid`] has checked them against the current snapshot,
//! which yields a [`ValidRequest`].

use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    constants::{
        mode::MAX_QUESTIONS,
        requests::{MAX_ANSWER_INDEX, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS, OTP_LENGTH},
    },
    economy::CreditsConfig,
    error::Error,
};

/// Source of a credits claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimKind {
    /// Once-a-day free credits
    Daily,
    /// Credits for watching a rewarded ad
    AdReward,
}

impl ClaimKind {
    /// Credits granted by one claim of this kind
    pub fn amount(self, credits: &CreditsConfig) -> u64 {
        match self {
            Self::Daily => credits.daily_claim_amount,
            Self::AdReward => credits.ad_reward_amount,
        }
    }
}

/// A request payload as received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[garde(context(Config))]
pub enum Request {
    /// Start a session in a mode
    CreateSession {
        /// Snapshot key of the mode
        #[garde(custom(validate_known_mode))]
        mode: String,
    },
    /// Answer one question of a running session
    SubmitAnswer {
        /// Session the answer belongs to
        #[garde(skip)]
        session_id: Uuid,
        /// Zero-based position of the question in the session
        #[garde(custom(validate_question_index))]
        question_index: u32,
        /// Zero-based index of the chosen option
        #[garde(range(max = MAX_ANSWER_INDEX))]
        answer_index: u8,
        /// Milliseconds between the question appearing and the answer
        #[garde(custom(validate_time_taken))]
        time_taken_ms: u64,
    },
    /// Send a one-time password to a phone number
    SendOtp {
        /// International phone number
        #[garde(custom(validate_phone))]
        phone: String,
    },
    /// Verify a one-time password
    VerifyOtp {
        /// International phone number the code was sent to
        #[garde(custom(validate_phone))]
        phone: String,
        /// The code as typed by the player
        #[garde(custom(validate_otp))]
        code: String,
    },
    /// Claim free credits
    ClaimCredits {
        /// What the claim is for
        #[garde(skip)]
        kind: ClaimKind,
    },
}

#[allow(clippy::ptr_arg)]
fn validate_known_mode(mode: &String, config: &Config) -> garde::Result {
    config
        .mode_config(mode)
        .map(|_| ())
        .map_err(|error| garde::Error::new(error.to_string()))
}

/// Bounds the index by the longest mode in the snapshot
///
/// The request does not name its mode, so the bound for the session's own
/// mode is left to the caller holding the session.
fn validate_question_index(index: &u32, config: &Config) -> garde::Result {
    let questions = config
        .modes
        .values()
        .filter_map(|mode| mode.questions)
        .max()
        .unwrap_or(MAX_QUESTIONS);
    if *index < questions {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "question index must be below {questions}"
        )))
    }
}

fn validate_time_taken(time_taken_ms: &u64, config: &Config) -> garde::Result {
    let limit_ms = u64::from(config.game.default_question_timer) * 1000;
    if *time_taken_ms <= limit_ms {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "answered after the {limit_ms}ms question timer"
        )))
    }
}

#[allow(clippy::ptr_arg)]
fn validate_phone(phone: &String, _config: &Config) -> garde::Result {
    let digits = phone
        .strip_prefix('+')
        .ok_or_else(|| garde::Error::new("phone number must start with `+`"))?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(garde::Error::new("phone number must contain only digits"));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(garde::Error::new(format!(
            "phone number must have {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"
        )));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn validate_otp(code: &String, _config: &Config) -> garde::Result {
    if code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("code must be {OTP_LENGTH} digits")))
    }
}

/// A request that passed validation against a configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Deref)]
pub struct ValidRequest(Request);

impl ValidRequest {
    /// Returns the validated request
    pub fn into_inner(self) -> Request {
        self.0
    }
}

impl Request {
    /// Parses a request from JSON
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the payload is not a known request shape.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the request against `config`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` with every failed rule.
    pub fn into_valid(self, config: &Config) -> Result<ValidRequest, Error> {
        self.validate_with(config).map_err(Error::InvalidRequest)?;
        Ok(ValidRequest(self))
    }
}
