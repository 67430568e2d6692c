//! Request and response types for the messaging API.
//!
//! Field names follow the service's camelCase JSON. Binary message
//! content travels as standard base64; timestamps may or may not carry an
//! offset (see [`timestamp`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Email/password pair used by register, login and forgot-password.
#[derive(Clone, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated session returned by login and renewal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(rename = "jwt")]
    pub token: String,
    #[serde(rename = "expires", with = "timestamp")]
    pub expires_at: DateTime<Utc>,
    /// Empty when the service sent none (missing or `null`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refresh_token: String,
}

impl Session {
    /// True once the bearer token has reached its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Error body sent by the service with every non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "error")]
    pub message: String,
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.kind, self.message)
    }
}

/// Body of POST api/messages/send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    #[serde(rename = "messageContent", with = "base64_bytes")]
    pub content: Vec<u8>,
    pub content_type: String,
    /// Recipient order is preserved on the wire.
    pub recipients: Vec<String>,
}

/// Inbox listing entry from GET api/messages/inbox.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    pub sender: String,
    pub content_type: String,
    pub content_length: usize,
    #[serde(rename = "sent", with = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub unread: bool,
    pub hidden: bool,
}

impl fmt::Display for MessageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] From:  {}  Content-Type:  {}",
            self.id, self.sender, self.content_type
        )
    }
}

/// A received message in full, from GET api/messages/inbox/{id}.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: String,
    pub sender: String,
    #[serde(rename = "messageContent", with = "base64_bytes")]
    pub content: Vec<u8>,
    pub content_type: String,
    #[serde(rename = "sent", with = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub recipient: String,
    /// `None` until the recipient has opened the message.
    #[serde(rename = "read", default, with = "timestamp::optional")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hidden: bool,
}

impl MessageDetail {
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    /// Content decoded as UTF-8, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

impl From<&MessageDetail> for MessageSummary {
    fn from(message: &MessageDetail) -> Self {
        Self {
            id: message.id.clone(),
            sender: message.sender.clone(),
            content_type: message.content_type.clone(),
            content_length: message.content.len(),
            sent_at: message.sent_at,
            unread: message.is_unread(),
            hidden: message.hidden,
        }
    }
}

/// Sender-side view of a message that was sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    pub sender: String,
    #[serde(rename = "messageContent", with = "base64_bytes")]
    pub content: Vec<u8>,
    pub content_type: String,
    #[serde(rename = "sent", with = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageSummary {
    pub id: String,
    pub sender: String,
    pub content_type: String,
    pub content_length: usize,
    #[serde(rename = "sent", with = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub recipients: Vec<String>,
}

impl From<&SentMessage> for SentMessageSummary {
    fn from(message: &SentMessage) -> Self {
        Self {
            id: message.id.clone(),
            sender: message.sender.clone(),
            content_type: message.content_type.clone(),
            content_length: message.content.len(),
            sent_at: message.sent_at,
            recipients: message.recipients.clone(),
        }
    }
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Standard base64 for `Vec<u8>` fields.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Timestamps as the service emits them.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `...+02:00`) and naive
/// `2024-05-01T10:00:00.1234567`, which is taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(_) => NaiveDateTime::parse_from_str(value, NAIVE_FORMAT).map(|dt| dt.and_utc()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Nullable timestamps. `null` and the zero value (year 1) both mean unset.
    pub mod optional {
        use chrono::{DateTime, Datelike, Utc};
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(value) => {
                    let dt = super::parse(&value).map_err(serde::de::Error::custom)?;
                    if dt.year() <= 1 {
                        Ok(None)
                    } else {
                        Ok(Some(dt))
                    }
                }
            }
        }
    }
}
