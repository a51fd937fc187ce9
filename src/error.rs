use std::path::PathBuf;
use thiserror::Error;

/// Failure to build the move catalog from its source table
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to open move table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed move table: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line} ({name}): unknown target_type `{value}`")]
    UnknownTargetType {
        line: usize,
        name: String,
        value: String,
    },
}

/// An event that cannot be applied to a form state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown move `{0}`")]
    UnknownMove(String),

    #[error("unknown toggle group `{0}`")]
    UnknownGroup(String),

    #[error("`{label}` is not an option of group `{group}`")]
    UnknownLabel { group: String, label: String },

    #[error("slot {0} is out of range (expected 1-3)")]
    UnknownSlot(u8),

    #[error("slot {slot}: switch name is {len} characters long (at most {max})")]
    SwitchNameTooLong { slot: u8, len: usize, max: usize },
}

/// A `target_type` tag outside `single|all|self|none|auto`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target_type `{0}`")]
pub struct UnknownTargetType(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port `{0}`")]
    InvalidPort(String),

    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),

    #[error("SESSION_SECRET must be at least 64 bytes (got {0})")]
    SessionSecretTooShort(usize),
}
