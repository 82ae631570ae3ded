use core::fmt::{Debug, Display};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "meeting-suggest.toml";
pub const ENV_PREFIX: &str = "MEETING_SUGGEST_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Only needed by commands that talk to the database.
    pub database_url: Option<String>,
    /// `tracing_subscriber::EnvFilter` directives, `RUST_LOG` takes precedence.
    pub log_filter: String,
    pub pool_max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            log_filter: "info".to_owned(),
            pool_max_size: 16,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Header(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Defaults, then `meeting-suggest.toml`, then `MEETING_SUGGEST_*` variables.
#[must_use]
pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
