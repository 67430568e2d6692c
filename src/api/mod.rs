//! API client module for the messaging service.
//!
//! Provides a blocking HTTP client with JSON bodies, bearer auth injection
//! and automatic session renewal, plus the request/response types matching
//! the service's REST API.

pub mod auth;
pub mod client;
pub mod error;
pub mod messages;
pub mod report;
pub mod types;


pub use client::{ApiClient, RawResponse};
pub use error::{ApiError, AuthError, ErrorKind};
pub use messages::InboxQuery;
pub use report::{ErrorSink, LogSink, OrHandle};
pub use types::{
    Credentials, ErrorPayload, MessageDetail, MessageSummary, OutgoingMessage, SentMessage,
    SentMessageSummary, Session,
};
