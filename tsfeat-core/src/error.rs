//! Error types for the tsfeat core library.
//!
//! Uses `thiserror` for the public error enums. Configuration problems are
//! structured so callers can tell which setting was rejected.

/// Top-level error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Schema mismatch: expected columns {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FeatureError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Errors raised while validating a [`PipelineConfig`](crate::config::PipelineConfig)
/// or binding it to an input schema. All of them are fatal at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Rolling window size must be positive, got {window}")]
    InvalidWindow { window: usize },

    #[error("At least one lag offset is required")]
    NoLags,

    #[error("Lag offsets must be positive, got {lag}")]
    InvalidLag { lag: usize },

    #[error("Lag offset {lag} is listed more than once")]
    DuplicateLag { lag: usize },

    #[error("Timestamp format must not be empty")]
    EmptyTimestampFormat,

    #[error("Unknown timezone: {name}")]
    UnknownTimezone { name: String },

    #[error("Unknown {role} column: {name}")]
    UnknownColumn { role: &'static str, name: String },

    #[error("Column '{name}' is configured more than once")]
    DuplicateColumn { name: String },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load {
            message: err.to_string(),
        }
    }
}
