//! Supabase project configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::supabase::SupabaseConfig as ClientConfig;

/// Minimum length Supabase accepts for a JWT secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Supabase project configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Public anon key
    pub anon_key: Secret<String>,

    /// Service role key. Optional; when set the server reads and writes
    /// rows with it instead of the caller's token.
    #[serde(default)]
    pub service_role_key: Option<Secret<String>>,

    /// Secret that signs access tokens
    pub jwt_secret: Secret<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings for the Supabase HTTP client.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.url.clone(), self.anon_key.expose_secret().clone())
            .with_timeout(self.request_timeout());
        match &self.service_role_key {
            Some(key) if !key.expose_secret().is_empty() => {
                config.with_service_key(key.expose_secret().clone())
            }
            _ => config,
        }
    }

    /// In production, requires HTTPS for the project URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE__URL"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ValidationError::InvalidSupabaseUrl);
        }
        if *environment == Environment::Production && !self.url.starts_with("https://") {
            return Err(ValidationError::SupabaseUrlMustBeHttps);
        }
        if self.anon_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE__ANON_KEY"));
        }
        if self.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_JWT_SECRET_LEN));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    10
}
