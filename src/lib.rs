//! # Trivia Config Library
//!
//! This library provides the runtime configuration and economy model of a
//! trivia game: game mode definitions, the credits economy, winner gating
//! thresholds, session timing and anti-cheat settings. A compiled-in base
//! is layered with optional overrides and served to game, wallet and
//! anti-cheat logic through a [`ConfigStore`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::ref_option)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod constants;
pub mod economy;
pub mod env;
pub mod error;
pub mod merge;
pub mod mode;
pub mod requests;
pub mod store;

pub use config::Config;
pub use env::Environment;
pub use error::Error;
pub use merge::{ConfigOverride, merge};
pub use mode::{ModeConfig, ModeKey};
pub use store::ConfigStore;
