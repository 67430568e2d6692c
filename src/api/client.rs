//! Blocking HTTP client with JSON bodies and bearer auth injection.
//!
//! Every endpoint goes through the same three steps: [`ApiClient::build_request`]
//! (body + auth header, renewing an expired session first),
//! [`ApiClient::execute`] (one blocking round trip) and
//! [`ApiClient::interpret`] (typed payload or structured error).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{ApiError, AuthError};
use super::report::{ErrorSink, LogSink};
use super::types::{ErrorPayload, Session};
use crate::config::{AuthPolicy, ClientConfig};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Status and full body of a response, before interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// HTTP client wrapper for the messaging API.
///
/// Holds at most one session. The session sits behind a mutex and the
/// expiry check, renewal and token read in `ensure_fresh` happen under a
/// single lock, so one client can be shared across threads.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_policy: AuthPolicy,
    session: Mutex<Option<Session>>,
    sink: Arc<dyn ErrorSink>,
}

impl ApiClient {
    /// Create a client that reports errors through the `log` facade.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Create a client that reports errors to `sink`.
    pub fn with_sink(config: ClientConfig, sink: Arc<dyn ErrorSink>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_policy: config.auth_policy,
            session: Mutex::new(None),
            sink,
        }
    }

    /// Service root every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session_guard().clone()
    }

    /// Whether a session is held, expired or not.
    pub fn is_logged_in(&self) -> bool {
        self.session_guard().is_some()
    }

    /// Install a session obtained elsewhere (e.g. persisted by the caller).
    pub fn set_session(&self, session: Session) {
        *self.session_guard() = Some(session);
    }

    /// Drop the current session. Purely local; the server is not told.
    pub fn logout(&self) {
        if let Some(session) = self.session_guard().take() {
            log::info!("Logged out {}", session.user_id);
        }
    }

    pub(super) fn session_guard(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `error` to the sink and hand it back for propagation.
    pub(super) fn report(&self, error: ApiError) -> ApiError {
        self.sink.report(&error);
        error
    }

    /// Bearer token for an authorized request, renewing the session first
    /// if it has expired.
    fn ensure_fresh(&self) -> Result<String, ApiError> {
        let mut guard = self.session_guard();

        if guard.is_none() {
            drop(guard);
            let err = self.report(AuthError::NotLoggedIn.into());
            return match self.auth_policy {
                AuthPolicy::Strict => Err(err),
                AuthPolicy::Lenient => Ok(String::new()),
            };
        }

        if let Some(session) = guard.as_ref() {
            if !session.is_expired() {
                return Ok(session.token.clone());
            }
            log::info!("Session for {} expired, renewing", session.user_id);
        }

        let renewed = self.renew_locked(&mut guard)?;
        Ok(renewed.token)
    }

    /// Build a request against `path` (relative to the base URL).
    ///
    /// `body` is sent as UTF-8 JSON. With `authorize`, the session is
    /// checked (and renewed if expired) and `Authorization: Bearer` is set.
    pub fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authorize: bool,
    ) -> Result<RequestBuilder, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, &url);

        if let Some(body) = body {
            let json = serde_json::to_vec(body).map_err(|e| self.report(ApiError::Encode(e)))?;
            builder = builder.header(header::CONTENT_TYPE, JSON_CONTENT_TYPE).body(json);
        }

        if authorize {
            let token = self.ensure_fresh()?;
            builder = builder.bearer_auth(token);
        }

        Ok(builder)
    }

    /// Send the request and read the whole body. Blocks the calling thread.
    pub fn execute(&self, request: RequestBuilder) -> Result<RawResponse, ApiError> {
        let response = request.send().map_err(|e| self.report(e.into()))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.report(e.into()))?;
        log::debug!("<<< {} ({} bytes)", status, body.len());
        Ok(RawResponse { status, body })
    }

    /// Decode a success body into `T`, or turn a failure into an error.
    pub fn interpret<T: DeserializeOwned>(&self, response: RawResponse) -> Result<T, ApiError> {
        let response = self.check_status(response)?;
        serde_json::from_str(&response.body).map_err(|source| {
            self.report(ApiError::Deserialization {
                status: response.status,
                source,
            })
        })
    }

    /// Like [`interpret`](Self::interpret) for endpoints whose success body
    /// carries nothing of interest.
    pub fn interpret_empty(&self, response: RawResponse) -> Result<(), ApiError> {
        self.check_status(response).map(|_| ())
    }

    fn check_status(&self, response: RawResponse) -> Result<RawResponse, ApiError> {
        if response.status.is_success() {
            return Ok(response);
        }

        let err = match serde_json::from_str::<ErrorPayload>(&response.body) {
            Ok(payload) => ApiError::Server {
                status: response.status,
                payload,
            },
            Err(_) => ApiError::MalformedErrorBody {
                status: response.status,
                body: response.body,
            },
        };
        Err(self.report(err))
    }

    /// Build, send and decode one call.
    pub fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authorize: bool,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body, authorize)?;
        let response = self.execute(request)?;
        self.interpret(response)
    }

    /// Build and send one call, checking only for success.
    pub fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authorize: bool,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body, authorize)?;
        let response = self.execute(request)?;
        self.interpret_empty(response)
    }

    /// Body-less GET decoded into `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str, authorize: bool) -> Result<T, ApiError> {
        self.call(Method::GET, path, None::<&()>, authorize)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
