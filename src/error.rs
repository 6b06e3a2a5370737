//! Error kinds raised by the simulation kernel
//!
//! None of these are recovered inside the kernel. They propagate to the caller,
//! which decides whether to reject the configuration or abort the run.

use thiserror::Error;

/// Kernel errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Invalid dimensional input (non-positive length, width, radius, ...)
    #[error("invalid configuration: {field} = {value}")]
    Configuration { field: String, value: f64 },

    /// Internally inconsistent geometry
    #[error("segment '{id}': {reason}")]
    Geometry { id: String, reason: String },

    /// A query called with missing or invalid context
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two entities in one table or simulation share an id
    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

impl SimError {
    pub fn configuration(field: &str, value: f64) -> Self {
        SimError::Configuration {
            field: field.to_string(),
            value,
        }
    }

    pub fn geometry(id: &str, reason: &str) -> Self {
        SimError::Geometry {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for kernel operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors loading or saving a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}
