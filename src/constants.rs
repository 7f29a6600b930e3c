//! Configuration limits for the trivia economy
//!
//! This module contains the compile-time bounds that runtime configuration
//! and incoming requests are validated against. Runtime values themselves
//! live in [`crate::config::Config::base`].

/// Game mode limits
pub mod mode {
    /// Maximum length of a mode display name in characters
    pub const MAX_NAME_LENGTH: usize = 50;
    /// Maximum number of questions in a full session of any mode
    pub const MAX_QUESTIONS: u32 = 100;
    /// Maximum number of winners paid out per period
    pub const MAX_WINNERS: u32 = 1000;
}

/// Game session timing limits
pub mod game {
    /// Minimum time in seconds a player gets to answer a question
    pub const MIN_QUESTION_TIMER: u32 = 5;
    /// Maximum time in seconds a player gets to answer a question
    pub const MAX_QUESTION_TIMER: u32 = 240;
    /// Maximum number of questions fetched in one batch
    pub const MAX_QUESTIONS_PER_BATCH: u32 = 50;
    /// Maximum number of questions cached for offline play
    pub const MAX_OFFLINE_QUESTIONS: u32 = 500;
    /// Maximum time in minutes an interrupted session stays resumable
    pub const MAX_RESUME_TIME_MINUTES: u32 = 24 * 60;
}

/// Payments limits
pub mod payments {
    /// Length of an ISO 4217 currency code
    pub const CURRENCY_CODE_LENGTH: usize = 3;
}

/// App metadata limits
pub mod app {
    /// Maximum length of the app display name
    pub const MAX_NAME_LENGTH: usize = 100;
}

/// Request payload limits
pub mod requests {
    /// Number of digits in a one-time password
    pub const OTP_LENGTH: usize = 6;
    /// Minimum number of digits in an international phone number
    pub const MIN_PHONE_DIGITS: usize = 8;
    /// Maximum number of digits in an international phone number (E.164)
    pub const MAX_PHONE_DIGITS: usize = 15;
    /// Highest answer index of a question (four options)
    pub const MAX_ANSWER_INDEX: u8 = 3;
}
