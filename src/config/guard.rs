//! Route guard configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::onboarding::{GuardConfig as GuardSettings, DEFAULT_FETCH_TIMEOUT};

/// Route guard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Bound on each session/profile fetch, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl GuardConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Settings for `RouteGuard`.
    pub fn settings(&self) -> GuardSettings {
        GuardSettings {
            fetch_timeout: self.fetch_timeout(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fetch_timeout_ms == 0 || self.fetch_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidFetchTimeout);
        }
        Ok(())
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_millis() as u64
}
