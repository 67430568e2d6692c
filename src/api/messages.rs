//! Sending, listing, reading and deleting messages.
//!
//! All calls here are authorized.

use chrono::NaiveDate;
use reqwest::Method;
use serde::Serialize;

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{MessageDetail, MessageSummary, OutgoingMessage};

const SEND_PATH: &str = "/api/messages/send";
const INBOX_PATH: &str = "/api/messages/inbox";

/// Content type used for plain text messages.
pub const TEXT_CONTENT_TYPE: &str = "text/utf8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filters for [`ApiClient::list_inbox`].
///
/// Only values that differ from the server defaults end up in the query
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub unread_only: bool,
    pub hidden: bool,
}

impl Default for InboxQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            unread_only: true,
            hidden: false,
        }
    }
}

impl InboxQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start = Some(date);
        self
    }

    pub fn end(mut self, date: NaiveDate) -> Self {
        self.end = Some(date);
        self
    }

    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// `?start=..&end=..&unreadOnly=false&hidden=true`, or empty when
    /// everything is default.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(start) = self.start {
            params.push(format!("start={}", start.format(DATE_FORMAT)));
        }
        if let Some(end) = self.end {
            params.push(format!("end={}", end.format(DATE_FORMAT)));
        }
        if !self.unread_only {
            params.push("unreadOnly=false".to_string());
        }
        if self.hidden {
            params.push("hidden=true".to_string());
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

impl ApiClient {
    /// Send raw `content` to every address in `recipients`, in order.
    pub fn send_message<S: AsRef<str>>(
        &self,
        content: Vec<u8>,
        content_type: &str,
        recipients: &[S],
    ) -> Result<(), ApiError> {
        let message = OutgoingMessage {
            content,
            content_type: content_type.to_string(),
            recipients: recipients.iter().map(|r| r.as_ref().to_string()).collect(),
        };
        self.send(Method::POST, SEND_PATH, Some(&message), true)?;
        log::info!(
            "Sent {} bytes ({}) to {} recipient(s)",
            message.content.len(),
            message.content_type,
            message.recipients.len()
        );
        Ok(())
    }

    /// Send `text` as UTF-8 with content type `text/utf8`.
    pub fn send_text_message<S: AsRef<str>>(
        &self,
        text: &str,
        recipients: &[S],
    ) -> Result<(), ApiError> {
        self.send_message(text.as_bytes().to_vec(), TEXT_CONTENT_TYPE, recipients)
    }

    /// Serialize `value` to JSON and send it as `application/json`.
    pub fn send_json_message<T, S>(&self, value: &T, recipients: &[S]) -> Result<(), ApiError>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let data = serde_json::to_vec(value).map_err(|e| self.report(ApiError::Encode(e)))?;
        self.send_message(data, JSON_CONTENT_TYPE, recipients)
    }

    /// List received messages matching `query`.
    pub fn list_inbox(&self, query: &InboxQuery) -> Result<Vec<MessageSummary>, ApiError> {
        let path = format!("{}{}", INBOX_PATH, query.to_query_string());
        self.get(&path, true)
    }

    /// Fetch one received message in full.
    pub fn get_message(&self, id: &str) -> Result<MessageDetail, ApiError> {
        self.get(&message_path(id), true)
    }

    /// Hide a received message.
    pub fn delete_message(&self, id: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, &message_path(id), None::<&()>, true)
    }
}

fn message_path(id: &str) -> String {
    format!("{}/{}", INBOX_PATH, urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_query_is_empty() {
        assert_eq!(InboxQuery::default().to_query_string(), "");
    }

    #[test]
    fn test_include_read_messages() {
        let query = InboxQuery::new().unread_only(false);
        assert_eq!(query.to_query_string(), "?unreadOnly=false");
    }

    #[test]
    fn test_include_hidden_messages() {
        let query = InboxQuery::new().hidden(true);
        assert_eq!(query.to_query_string(), "?hidden=true");
    }

    #[test]
    fn test_flags_keep_declared_order() {
        let query = InboxQuery::new().hidden(true).unread_only(false);
        assert_eq!(query.to_query_string(), "?unreadOnly=false&hidden=true");
    }

    #[test]
    fn test_date_bounds_share_one_format() {
        let query = InboxQuery::new().start(date(2024, 3, 1)).end(date(2024, 3, 9));
        assert_eq!(query.to_query_string(), "?start=2024-03-01&end=2024-03-09");
    }

    #[test]
    fn test_full_query() {
        let query = InboxQuery {
            start: Some(date(2024, 1, 5)),
            end: Some(date(2024, 12, 31)),
            unread_only: false,
            hidden: true,
        };
        assert_eq!(
            query.to_query_string(),
            "?start=2024-01-05&end=2024-12-31&unreadOnly=false&hidden=true"
        );
    }

    #[test]
    fn test_message_path_escapes_id() {
        assert_eq!(message_path("abc123"), "/api/messages/inbox/abc123");
        assert_eq!(message_path("a/b"), "/api/messages/inbox/a%2Fb");
    }
}
