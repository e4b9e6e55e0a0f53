//! Configuration loading and representation.
//!
//! Read from the process environment with defaults for every key:
//!
//! | variable               | default | meaning                              |
//! |------------------------|---------|--------------------------------------|
//! | `LOANTRACK_CODE_PREFIX`| `ivt`   | prefix of generated detail codes     |
//! | `LOANTRACK_LOG_FILTER` | `info`  | log filter (overridden by `RUST_LOG`) |
//! | `LOANTRACK_LOG_JSON`   | `true`  | JSON log lines                       |

use thiserror::Error;

use loantrack_observability::LogSettings;

pub const CODE_PREFIX_VAR: &str = "LOANTRACK_CODE_PREFIX";
pub const LOG_FILTER_VAR: &str = "LOANTRACK_LOG_FILTER";
pub const LOG_JSON_VAR: &str = "LOANTRACK_LOG_JSON";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be true or false, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub code_prefix: String,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            code_prefix: "ivt".to_string(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from any variable source (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(prefix) = lookup(CODE_PREFIX_VAR) {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(ConfigError::Empty(CODE_PREFIX_VAR));
            }
            settings.code_prefix = prefix.to_string();
        }
        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            if filter.trim().is_empty() {
                return Err(ConfigError::Empty(LOG_FILTER_VAR));
            }
            settings.log.filter = filter.trim().to_string();
        }
        if let Some(json) = lookup(LOG_JSON_VAR) {
            settings.log.json = parse_bool(LOG_JSON_VAR, &json)?;
        }

        Ok(settings)
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}
