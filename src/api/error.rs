//! Error types for messaging API calls.

use reqwest::StatusCode;
use thiserror::Error;

use super::types::ErrorPayload;

/// Local authentication failures. These never reach the network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("You can't authorize a request until you log in")]
    NotLoggedIn,
    #[error("You cannot renew a token without first logging in")]
    MissingRefreshToken,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status whose body was not a valid error payload.
    #[error("Unreadable error response ({status}): {body}")]
    MalformedErrorBody { status: StatusCode, body: String },

    #[error("Failed to parse response ({status}): {source}")]
    Deserialization {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Api call failed ({status}): {payload}")]
    Server {
        status: StatusCode,
        payload: ErrorPayload,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Deserialization,
    Server,
    Auth,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::MalformedErrorBody { .. } => ErrorKind::Transport,
            ApiError::Deserialization { .. } | ApiError::Encode(_) => ErrorKind::Deserialization,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Auth(_) => ErrorKind::Auth,
        }
    }

    /// HTTP status attached to the error, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status(),
            ApiError::MalformedErrorBody { status, .. }
            | ApiError::Deserialization { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::Encode(_) | ApiError::Auth(_) => None,
        }
    }

    /// Server-supplied payload for `Server` errors.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Server { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_includes_payload() {
        let err = ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            payload: ErrorPayload {
                kind: "AuthError".to_string(),
                message: "token invalid".to_string(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("AuthError : token invalid"));
    }

    #[test]
    fn test_auth_error_has_no_status() {
        let err = ApiError::from(AuthError::MissingRefreshToken);
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.status(), None);
        assert!(err.payload().is_none());
    }

    #[test]
    fn test_malformed_error_body_is_transport() {
        let err = ApiError::MalformedErrorBody {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
