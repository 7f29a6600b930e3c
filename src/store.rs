//! Shared access to the current configuration snapshot
//!
//! A [`ConfigStore`] is built once at process entry and handed to every
//! consumer that needs configuration. Readers get an `Arc` to the current
//! snapshot, which stays the same allocation until the next update.
//! Updates build a complete new snapshot and swap it in under the write
//! lock, so no reader can observe a partially merged configuration.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    config::{Config, GameSettings},
    economy::Bundle,
    env::Environment,
    error::Error,
    merge::{ConfigOverride, merge},
    mode::ModeConfig,
};

/// Owner of the configuration snapshot
#[derive(Debug)]
pub struct ConfigStore {
    snapshot: RwLock<Arc<Config>>,
}

impl ConfigStore {
    /// Builds the store from the compiled-in base and an optional override
    pub fn new(env: &Environment, overrides: Option<&ConfigOverride>) -> Self {
        let base = Config::base(env);
        let config = match overrides {
            Some(overrides) => merge(&base, overrides),
            None => base,
        };
        Self::from_config(config)
    }

    /// Wraps an already built snapshot
    pub fn from_config(config: Config) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(config)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<Config>> {
        self.snapshot.read().unwrap_or_else(|poisoned| {
            tracing::warn!("configuration lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Config>> {
        self.snapshot.write().unwrap_or_else(|poisoned| {
            tracing::warn!("configuration lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Returns the current snapshot
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.read())
    }

    /// Returns the configuration of a mode
    ///
    /// # Errors
    ///
    /// Returns `Error::ModeNotFound` if the current snapshot has no mode
    /// stored under `key`.
    pub fn get_mode_config(&self, key: &str) -> Result<ModeConfig, Error> {
        self.read().mode_config(key).cloned()
    }

    /// Returns the winner gating threshold of a mode, if it has one
    pub fn get_winner_gating_threshold(&self, key: &str) -> Option<f64> {
        self.read().winner_gating_threshold(key)
    }

    /// Returns the purchasable bundle table
    pub fn get_credits_bundle_config(&self) -> BTreeMap<String, Bundle> {
        self.read().credits.bundles.clone()
    }

    /// Returns the game session settings
    pub fn get_game_settings(&self) -> GameSettings {
        self.read().game
    }

    /// Whether a prize of `prize` (local currency) needs winner verification
    ///
    /// # Errors
    ///
    /// Returns `Error::ThresholdNotFound` if the mode has no threshold.
    pub fn requires_winner_verification(&self, key: &str, prize: f64) -> Result<bool, Error> {
        self.read().requires_winner_verification(key, prize)
    }

    /// Layers `overrides` onto the current snapshot and publishes the result
    ///
    /// Updates are cumulative: each one merges against whatever snapshot is
    /// current, not against the base. The result is not validated.
    pub fn update_config(&self, overrides: &ConfigOverride) -> Arc<Config> {
        let mut snapshot = self.write();
        let updated = Arc::new(merge(&snapshot, overrides));
        *snapshot = Arc::clone(&updated);
        tracing::info!(sections = ?overrides.sections(), "configuration updated");
        updated
    }

    /// Like [`Self::update_config`], but only publishes a snapshot that
    /// passes validation
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` and keeps the current snapshot if the
    /// merged configuration violates any invariant.
    pub fn try_update_config(&self, overrides: &ConfigOverride) -> Result<Arc<Config>, Error> {
        let mut snapshot = self.write();
        let updated = merge(&snapshot, overrides);
        if let Err(error) = updated.check() {
            tracing::warn!(sections = ?overrides.sections(), %error, "configuration update rejected");
            return Err(error);
        }
        let updated = Arc::new(updated);
        *snapshot = Arc::clone(&updated);
        tracing::info!(sections = ?overrides.sections(), "configuration updated");
        Ok(updated)
    }
}

impl Default for ConfigStore {
    /// A store holding the base configuration for a development environment
    fn default() -> Self {
        Self::new(&Environment::default(), None)
    }
}
