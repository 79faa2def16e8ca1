use thiserror::Error;

/// Top-level error type for roster domain data.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid union {union_id}: {reason}")]
    InvalidUnion { union_id: i64, reason: String },

    #[error("Unknown {field} code: {code}")]
    UnknownCode { field: &'static str, code: u8 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for RosterError {
    fn from(e: config::ConfigError) -> Self {
        RosterError::Config(e.to_string())
    }
}
