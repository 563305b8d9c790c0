use thiserror::Error;

use crate::plugin::HostVersion;

/// Failures of the instrumentation pass
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstrumentError {
    /// The output function is not visible from the function being instrumented.
    /// Fatal for that function only.
    #[error("plugin requires declaration of {name}, please create the function")]
    MissingDependency { name: String, function: String },

    /// Host and engine were built for different compiler versions.
    /// Fatal for the whole run.
    #[error("This plugin is for version {required}")]
    VersionMismatch {
        required: HostVersion,
        found: HostVersion,
    },

    /// Selection directive outside any function body. Warning only.
    #[error("Cannot use pragma outside a function")]
    DirectiveMisuse { directive: String },

    #[error("invalid host version `{0}`, expected <major>.<minor>")]
    InvalidVersion(String),
}

impl InstrumentError {
    /// Whether the error only warrants a warning
    pub fn is_recoverable(&self) -> bool {
        matches!(self, InstrumentError::DirectiveMisuse { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
