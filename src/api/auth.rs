//! Account and session operations: register, login, forgot-password and
//! token renewal.
//!
//! None of these calls carry a bearer token. Login and renewal replace the
//! stored session wholesale.

use reqwest::Method;

use super::client::ApiClient;
use super::error::{ApiError, AuthError};
use super::types::{Credentials, Session};

const REGISTER_PATH: &str = "/api/auth/register";
const FORGOT_PATH: &str = "/api/auth/forgot";
const LOGIN_PATH: &str = "/api/auth";
const RENEW_PATH: &str = "/api/auth/renew";

impl ApiClient {
    /// Register a new account. This can only be done once per email.
    pub fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let credentials = Credentials::new(email, password);
        self.send(Method::POST, REGISTER_PATH, Some(&credentials), false)?;
        log::info!("Registered {}", email);
        Ok(())
    }

    /// Reset the password for `email` to `password`.
    pub fn forgot_password(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let credentials = Credentials::new(email, password);
        self.send(Method::POST, FORGOT_PATH, Some(&credentials), false)
    }

    /// Log in and store the returned session.
    ///
    /// On failure any previous session is kept as it was.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let credentials = Credentials::new(email, password);
        let session: Session = self.call(Method::POST, LOGIN_PATH, Some(&credentials), false)?;

        *self.session_guard() = Some(session.clone());
        log::info!("Logged in as {} (expires {})", session.user_id, session.expires_at);
        Ok(session)
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// Fails without touching the network when there is no refresh token.
    pub fn renew(&self) -> Result<Session, ApiError> {
        let mut guard = self.session_guard();
        self.renew_locked(&mut guard)
    }

    /// Renewal against an already-locked session slot.
    ///
    /// Any 4xx answer clears the slot, whatever its body; the caller has to
    /// log in again. Connection failures and 5xx answers leave it alone.
    pub(super) fn renew_locked(&self, slot: &mut Option<Session>) -> Result<Session, ApiError> {
        let refresh_token = match slot.as_ref() {
            Some(session) if session.has_refresh_token() => session.refresh_token.clone(),
            _ => return Err(self.report(AuthError::MissingRefreshToken.into())),
        };

        let path = format!(
            "{}?refreshToken={}",
            RENEW_PATH,
            urlencoding::encode(&refresh_token)
        );

        match self.get::<Session>(&path, false) {
            Ok(session) => {
                log::info!("Session renewed for {}", session.user_id);
                *slot = Some(session.clone());
                Ok(session)
            }
            Err(e) if e.status().is_some_and(|s| s.is_client_error()) => {
                log::warn!("Refresh token rejected, session cleared");
                *slot = None;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
