//! Process environment read at construction
//!
//! Two configuration fields come from the environment rather than the
//! compiled-in base: the payments publishable key and the deployment
//! environment name, which decides whether payments run in test mode. Both
//! are read once; there is no hot reload.

/// Variable holding the payments provider publishable key
pub const PUBLISHABLE_KEY_VAR: &str = "PAYMENTS_PUBLISHABLE_KEY";
/// Variable holding the deployment environment name
pub const ENVIRONMENT_VAR: &str = "APP_ENV";
/// Environment name that disables payments test mode
pub const PRODUCTION: &str = "production";
/// Environment name assumed when none is set
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment-derived inputs to the base configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Payments provider publishable key, empty when unset
    pub publishable_key: String,
    /// Deployment environment name
    pub name: String,
}

impl Default for Environment {
    /// A development environment without a publishable key
    fn default() -> Self {
        Self {
            publishable_key: String::new(),
            name: DEFAULT_ENVIRONMENT.to_owned(),
        }
    }
}

impl Environment {
    /// Reads the environment of the current process
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the environment from an arbitrary variable lookup
    ///
    /// A missing publishable key resolves to an empty string; payment
    /// integration is expected to report it at the point of use.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let publishable_key = lookup(PUBLISHABLE_KEY_VAR).unwrap_or_default();
        let name = lookup(ENVIRONMENT_VAR)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned());

        if publishable_key.is_empty() {
            tracing::warn!(
                variable = PUBLISHABLE_KEY_VAR,
                environment = %name,
                "payments publishable key is not set"
            );
        }

        Self {
            publishable_key,
            name,
        }
    }

    /// Whether this is the production deployment
    pub fn is_production(&self) -> bool {
        self.name == PRODUCTION
    }

    /// Whether payments should run against the provider's test mode
    pub fn test_mode(&self) -> bool {
        !self.is_production()
    }
}
