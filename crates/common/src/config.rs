//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session lifecycle configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Per-action throttling configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long a session stays joinable after creation.
    #[serde(default = "default_session_duration_hours")]
    pub duration_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_hours: default_session_duration_hours(),
        }
    }
}

/// A single fixed-window limit as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowLimit {
    /// Requests allowed per window.
    pub max: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Question submissions per participant.
    #[serde(default = "default_question_limit")]
    pub question: WindowLimit,
    /// Votes and unvotes per participant.
    #[serde(default = "default_vote_limit")]
    pub vote: WindowLimit,
    /// Pulse-check submissions per participant.
    #[serde(default = "default_feedback_limit")]
    pub feedback: WindowLimit,
    /// How often stale counters are purged.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            question: default_question_limit(),
            vote: default_vote_limit(),
            feedback: default_feedback_limit(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_session_duration_hours() -> i64 {
    24
}

const fn default_question_limit() -> WindowLimit {
    WindowLimit {
        max: 5,
        window_secs: 300,
    }
}

const fn default_vote_limit() -> WindowLimit {
    WindowLimit {
        max: 30,
        window_secs: 60,
    }
}

const fn default_feedback_limit() -> WindowLimit {
    WindowLimit {
        max: 20,
        window_secs: 60,
    }
}

const fn default_purge_interval_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `ASKBOARD_ENV`)
    /// 4. Environment variables with `ASKBOARD__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("ASKBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ASKBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("ASKBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config: Config = config::Config::builder()
            .set_override("server.port", 8080)
            .unwrap()
            .set_override("database.url", "postgres://localhost/askboard")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.session.duration_hours, 24);
        assert_eq!(config.rate_limit.question, WindowLimit { max: 5, window_secs: 300 });
        assert_eq!(config.rate_limit.vote.max, 30);
        assert_eq!(config.rate_limit.feedback.max, 20);
        assert_eq!(config.rate_limit.purge_interval_secs, 300);
    }
}
