//! Error reporting side channel.
//!
//! Every failure is reported to the client's [`ErrorSink`] where it is
//! produced, whether or not the caller goes on to handle it. Callers that
//! prefer a callback over a `Result` use [`OrHandle`].

use super::error::ApiError;

/// Receives every error an [`ApiClient`](super::client::ApiClient) produces.
///
/// Errors raised during a session renewal are reported while the client's
/// session lock is held; a sink must not call back into the client's
/// session methods from `report`.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &ApiError);
}

/// Default sink: writes through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &ApiError) {
        match error.status() {
            Some(status) => log::error!("Api call failed: {} (status {})", error, status),
            None => log::error!("Api call failed: {}", error),
        }
    }
}

/// Route an error to a caller-supplied handler instead of returning it.
pub trait OrHandle<T> {
    /// On error, pass it to `handler` and return `T::default()`.
    fn or_handle<F>(self, handler: F) -> T
    where
        T: Default,
        F: FnOnce(ApiError);
}

impl<T> OrHandle<T> for Result<T, ApiError> {
    fn or_handle<F>(self, handler: F) -> T
    where
        T: Default,
        F: FnOnce(ApiError),
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                handler(e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{AuthError, ErrorKind};

    #[test]
    fn test_or_handle_passes_value_through() {
        let result: Result<Vec<u32>, ApiError> = Ok(vec![1, 2]);
        let mut called = false;
        let value = result.or_handle(|_| called = true);
        assert_eq!(value, vec![1, 2]);
        assert!(!called);
    }

    #[test]
    fn test_or_handle_routes_error_and_returns_default() {
        let result: Result<Vec<u32>, ApiError> = Err(AuthError::NotLoggedIn.into());
        let mut seen = None;
        let value = result.or_handle(|e| seen = Some(e.kind()));
        assert!(value.is_empty());
        assert_eq!(seen, Some(ErrorKind::Auth));
    }
}
