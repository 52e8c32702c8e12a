//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TICTACTOE` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a working server.
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod game;
mod server;

pub use error::{ConfigError, ValidationError};
pub use game::GameConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Player connection deadlines and keep-alive
    #[serde(default)]
    pub game: GameConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TICTACTOE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TICTACTOE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TICTACTOE__GAME__READ_TIMEOUT_SECS=600` -> `game.read_timeout_secs = 600`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TICTACTOE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.game.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("TICTACTOE__SERVER__PORT");
        env::remove_var("TICTACTOE__SERVER__ENVIRONMENT");
        env::remove_var("TICTACTOE__GAME__READ_TIMEOUT_SECS");
        env::remove_var("TICTACTOE__GAME__KEEPALIVE_INTERVAL_SECS");
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.game.read_timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TICTACTOE__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TICTACTOE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_game_timing_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TICTACTOE__GAME__READ_TIMEOUT_SECS", "600");
        env::set_var("TICTACTOE__GAME__KEEPALIVE_INTERVAL_SECS", "15");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.game.read_timeout_secs, 600);
        assert_eq!(config.game.keepalive_interval_secs, 15);
        assert_eq!(config.game.write_timeout_secs, 10);
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        let config = AppConfig {
            game: GameConfig {
                read_timeout_secs: 5,
                write_timeout_secs: 10,
                keepalive_interval_secs: 1,
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::WriteTimeoutTooLong));
    }
}
