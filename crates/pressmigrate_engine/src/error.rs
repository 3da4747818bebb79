//! Error types for the import engine.

use crate::store::StoreError;
use pressmigrate_protocol::ProtocolError;
use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur during an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source rejected the bearer token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network failure, timeout or non-success status.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// The response body is malformed or violates the page contract.
    #[error("malformed payload: {0}")]
    Payload(String),

    /// Destination store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Watermark could not be read, written or locked.
    #[error("watermark error: {0}")]
    Watermark(String),

    /// Configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The run was cancelled between pages.
    #[error("import cancelled")]
    Cancelled,

    /// Invalid state transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

impl ImportError {
    /// Creates a transport error without a status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error for a non-success status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns true for failures that abort the run and are surfaced to the
    /// operator. Everything else is isolated to one record.
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            ImportError::Auth(_) | ImportError::Transport { .. } | ImportError::Payload(_)
        )
    }
}

impl From<ProtocolError> for ImportError {
    fn from(err: ProtocolError) -> Self {
        ImportError::Payload(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Payload(err.to_string())
    }
}
