//! Blocking client for the messaging web service.
//!
//! ```no_run
//! use mailbox_client::{ApiClient, ClientConfig, InboxQuery};
//!
//! let client = ApiClient::new(ClientConfig::default());
//! client.login("me@example.com", "secret")?;
//! client.send_text_message("hi", &["friend@example.com"])?;
//! for summary in client.list_inbox(&InboxQuery::default())? {
//!     println!("{}", summary);
//! }
//! # Ok::<(), mailbox_client::ApiError>(())
//! ```

pub mod api;
pub mod config;

pub use api::{
    ApiClient, ApiError, AuthError, ErrorKind, ErrorSink, InboxQuery, LogSink, MessageDetail,
    MessageSummary, OrHandle, Session,
};
pub use config::{AuthPolicy, ClientConfig, ConfigError};
