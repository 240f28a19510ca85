//! Protocol envelope and the book record it carries.
//!
//! On the wire every message is a single JSON object with a `Type` tag and a
//! nullable `Content` string. How `Content` is read depends on `Type`: plain
//! text for most messages, a nested serialized [`BookData`] for
//! [`MessageType::BookInquiryReply`]. [`Payload`] is the typed view of that
//! pairing used by the roles that need to interpret it.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to encode message: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("'{0:?}' message requires content")]
    MissingContent(MessageType),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    Hello,
    Welcome,
    BookInquiry,
    BookInquiryReply,
    NotFound,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "Type")]
    pub kind: MessageType,
    #[serde(rename = "Content")]
    pub content: Option<String>,
}

/// A catalog record. `Title` is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BookData {
    pub title: String,
    pub status: String,
    pub borrowed_by: Option<String>,
    pub return_date: Option<String>,
}

impl BookData {
    /// Serialized form nested in a `BookInquiryReply`.
    pub fn to_json(&self) -> String {
        // Only string fields; serialization has no failure path.
        serde_json::to_string(self).expect("book data serializes to json")
    }
}

impl Message {
    pub fn new(kind: MessageType, content: Option<String>) -> Self {
        Self { kind, content }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new(MessageType::Error, Some(description.into()))
    }

    /// The `Error` message a role substitutes for bytes it could not decode.
    pub fn unreadable(role: &str) -> Self {
        Self::error(format!(
            "{role} could not deserialize byte stream to Message object, the message was malformed"
        ))
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether a session ends once this message has been sent as a reply.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            MessageType::BookInquiryReply | MessageType::NotFound | MessageType::Error
        )
    }
}

/// Typed view over a [`Message`], pairing each type with what its content means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Hello { client_id: String },
    Welcome,
    BookInquiry { title: String },
    BookInquiryReply(BookData),
    NotFound(String),
    Error(String),
}

impl TryFrom<Message> for Payload {
    type Error = DecodeError;

    fn try_from(message: Message) -> Result<Self, DecodeError> {
        let Message { kind, content } = message;
        let required = |content: Option<String>| content.ok_or(DecodeError::MissingContent(kind));

        let payload = match kind {
            MessageType::Hello => Payload::Hello {
                client_id: required(content)?,
            },
            MessageType::Welcome => Payload::Welcome,
            MessageType::BookInquiry => Payload::BookInquiry {
                title: required(content)?,
            },
            MessageType::BookInquiryReply => {
                Payload::BookInquiryReply(serde_json::from_str(&required(content)?)?)
            }
            // A bare NotFound/Error is still a meaningful outcome.
            MessageType::NotFound => Payload::NotFound(content.unwrap_or_default()),
            MessageType::Error => Payload::Error(content.unwrap_or_default()),
        };
        Ok(payload)
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Hello { client_id } => Message::new(MessageType::Hello, Some(client_id)),
            Payload::Welcome => Message::new(MessageType::Welcome, None),
            Payload::BookInquiry { title } => Message::new(MessageType::BookInquiry, Some(title)),
            Payload::BookInquiryReply(book) => Message::new(
                MessageType::BookInquiryReply,
                Some(book.to_json()),
            ),
            Payload::NotFound(text) => Message::new(MessageType::NotFound, Some(text)),
            Payload::Error(text) => Message::error(text),
        }
    }
}
