use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable present but not readable (e.g. not unicode)
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    /// Value could not be parsed into the target type
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Value parsed but is outside the accepted range
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
