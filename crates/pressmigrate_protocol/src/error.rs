//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while decoding or validating wire messages.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The payload is not valid JSON or lacks required fields.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A record id does not lie beyond the requested cursor.
    #[error("record {id} is not beyond cursor {cursor}")]
    CursorViolation {
        /// Requested cursor.
        cursor: u64,
        /// Offending record id.
        id: u64,
    },

    /// Record ids are not strictly ascending.
    #[error("record {id} follows {previous}; ids must be strictly ascending")]
    OrderViolation {
        /// Id of the preceding record.
        previous: u64,
        /// Offending record id.
        id: u64,
    },

    /// The page holds more records than requested.
    #[error("page holds {len} records but the limit was {limit}")]
    PageOverflow {
        /// Requested limit.
        limit: u32,
        /// Records actually returned.
        len: usize,
    },

    /// A request parameter is not acceptable.
    #[error("invalid parameter {name}: {value:?}")]
    InvalidParam {
        /// Parameter name.
        name: &'static str,
        /// Rejected raw value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::CursorViolation { cursor: 10, id: 7 };
        assert_eq!(err.to_string(), "record 7 is not beyond cursor 10");

        let err = ProtocolError::PageOverflow { limit: 5, len: 6 };
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('6'));
    }
}
