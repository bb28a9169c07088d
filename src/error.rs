//! Error types for gorekit.
//!
//! Only two situations are failures for a caller: the engine could not
//! analyze a binary, or a handle was used after it was closed. Text that is
//! not valid UTF-8 and records the engine left empty are represented in the
//! returned values instead of being reported here.

use thiserror::Error;

/// Main error type for gorekit operations.
#[derive(Debug, Error)]
pub enum GoreError {
    /// The engine could not open or analyze the binary
    #[error("Failed to open Go binary: {path}")]
    OpenFailed { path: String },

    /// Operation attempted on a closed handle
    #[error("Session is closed")]
    SessionClosed,

    /// Another live handle on the same engine already owns this path
    #[error("Go binary is already open: {path}")]
    AlreadyOpen { path: String },

    /// Path cannot be passed across the foreign boundary
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid argument text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The engine refused an assumed compiler version the configuration required
    #[error("Compiler version rejected by engine: {version}")]
    VersionRejected { version: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for gorekit operations
pub type Result<T> = std::result::Result<T, GoreError>;

/// Convert gorekit errors to PyO3 exceptions
#[cfg(feature = "python-ext")]
impl From<GoreError> for pyo3::PyErr {
    fn from(err: GoreError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};

        match err {
            GoreError::OpenFailed { .. } | GoreError::AlreadyOpen { .. } => {
                PyOSError::new_err(err.to_string())
            }
            GoreError::InvalidPath(msg) | GoreError::InvalidInput(msg) => {
                PyValueError::new_err(msg)
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
