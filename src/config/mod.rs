//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `COMMUNITY_ONBOARDING`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use community_onboarding::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod guard;
mod server;
mod supabase;

pub use error::{ConfigError, ValidationError};
pub use guard::GuardConfig;
pub use server::{Environment, ServerConfig};
pub use supabase::{SupabaseConfig, MIN_JWT_SECRET_LEN};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Supabase project (URL, keys, JWT secret)
    pub supabase: SupabaseConfig,

    /// Route guard timeouts
    #[serde(default)]
    pub guard: GuardConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `COMMUNITY_ONBOARDING` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `COMMUNITY_ONBOARDING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COMMUNITY_ONBOARDING__SUPABASE__URL=...` -> `supabase.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COMMUNITY_ONBOARDING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.supabase.validate(&self.server.environment)?;
        self.guard.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "COMMUNITY_ONBOARDING__SUPABASE__URL",
        "COMMUNITY_ONBOARDING__SUPABASE__ANON_KEY",
        "COMMUNITY_ONBOARDING__SUPABASE__JWT_SECRET",
        "COMMUNITY_ONBOARDING__SERVER__PORT",
        "COMMUNITY_ONBOARDING__SERVER__ENVIRONMENT",
        "COMMUNITY_ONBOARDING__GUARD__FETCH_TIMEOUT_MS",
    ];

    fn set_minimal_env() {
        env::set_var("COMMUNITY_ONBOARDING__SUPABASE__URL", "https://xyz.supabase.co");
        env::set_var("COMMUNITY_ONBOARDING__SUPABASE__ANON_KEY", "anon-key");
        env::set_var(
            "COMMUNITY_ONBOARDING__SUPABASE__JWT_SECRET",
            "super-secret-jwt-token-with-at-least-32-characters",
        );
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.supabase.url, "https://xyz.supabase.co");
        assert_eq!(config.supabase.anon_key.expose_secret(), "anon-key");
        assert_eq!(config.guard.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("COMMUNITY_ONBOARDING__SERVER__PORT", "3000");
        env::set_var("COMMUNITY_ONBOARDING__SERVER__ENVIRONMENT", "production");
        env::set_var("COMMUNITY_ONBOARDING__GUARD__FETCH_TIMEOUT_MS", "2500");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.guard.fetch_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_missing_supabase_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        assert!(AppConfig::load().is_err());
    }
}
