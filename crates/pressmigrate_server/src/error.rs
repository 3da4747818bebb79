//! Error types for the export server.

use pressmigrate_protocol::{ErrorBody, ProtocolError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the export server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// No bearer token was presented.
    #[error("Missing bearer token")]
    MissingToken,

    /// The presented bearer token does not match.
    #[error("Invalid token")]
    InvalidToken,

    /// A query parameter could not be interpreted.
    #[error("Invalid parameter(s): {0}")]
    InvalidParam(String),

    /// No route matches the request path.
    #[error("No route was found matching the URL and request method")]
    NotFound,

    /// Record source failure.
    #[error("source error: {0}")]
    Source(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidParam { name, .. } => ServerError::InvalidParam(name.into()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::MissingToken
                | ServerError::InvalidToken
                | ServerError::InvalidParam(_)
                | ServerError::NotFound
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the HTTP status of this error.
    pub fn status(&self) -> u16 {
        match self {
            ServerError::MissingToken | ServerError::InvalidToken => 403,
            ServerError::InvalidParam(_) => 400,
            ServerError::NotFound => 404,
            _ => 500,
        }
    }

    /// Returns the wire error body.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ServerError::MissingToken | ServerError::InvalidToken => {
                ErrorBody::forbidden(self.to_string())
            }
            ServerError::InvalidParam(name) => ErrorBody::invalid_param(name),
            ServerError::NotFound => ErrorBody::not_found(),
            _ => ErrorBody::new("internal_error", "Internal server error", 500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::MissingToken.is_client_error());
        assert!(ServerError::InvalidParam("count".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
        assert!(!ServerError::NotFound.is_server_error());
    }

    #[test]
    fn auth_errors_are_forbidden() {
        for err in [ServerError::MissingToken, ServerError::InvalidToken] {
            assert_eq!(err.status(), 403);
            let body = err.to_body();
            assert_eq!(body.code, "forbidden");
            assert_eq!(body.data.status, 403);
        }
        assert_eq!(ServerError::MissingToken.to_body().message, "Missing bearer token");
        assert_eq!(ServerError::InvalidToken.to_body().message, "Invalid token");
    }

    #[test]
    fn invalid_param_from_protocol() {
        let err: ServerError = ProtocolError::InvalidParam {
            name: "count",
            value: "ten".into(),
        }
        .into();
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_body().data.status, 400);
    }

    #[test]
    fn internal_body_hides_details() {
        let body = ServerError::Source("disk on fire".into()).to_body();
        assert!(!body.message.contains("disk"));
        assert_eq!(body.data.status, 500);
    }
}
