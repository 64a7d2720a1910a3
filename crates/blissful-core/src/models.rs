//! Core data models for the Blissful assistant.
//!
//! These types are shared between the scripted assistant, the backend-driven
//! assistant, and any front-end that renders their output.
//!
//! # Data Flow
//!
//! ```text
//! Conversation ──▶ Assistant::chat(history, text) ──▶ ChatReply
//!                                                       ├─ reply: ChatMessage
//!                                                       └─ grounding_metadata?: GroundingMetadata
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AssistantError, Result};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

/// A single message in a conversation.
///
/// Messages are immutable once created. Ids are unique within a
/// conversation and timestamps never decrease along the stored order
/// (see [`Conversation`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message with a fresh id and the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message with a fresh id and the current time.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: format!("ai-{}", Uuid::new_v4()),
            sender: Sender::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered conversation history.
///
/// Owned by the caller and threaded into each assistant call; the assistant
/// itself keeps no session state. Deserializing replays every message
/// through [`Conversation::push`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawConversation")]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct RawConversation {
    messages: Vec<ChatMessage>,
}

impl TryFrom<RawConversation> for Conversation {
    type Error = AssistantError;

    fn try_from(raw: RawConversation) -> Result<Self> {
        Self::from_messages(raw.messages)
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, enforcing unique ids and non-decreasing timestamps.
    pub fn push(&mut self, message: ChatMessage) -> Result<()> {
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(AssistantError::InvalidRequest(format!(
                "duplicate message id '{}'",
                message.id
            )));
        }
        if let Some(last) = self.messages.last() {
            if message.timestamp < last.timestamp {
                return Err(AssistantError::InvalidRequest(format!(
                    "message '{}' is older than the last message in the conversation",
                    message.id
                )));
            }
        }
        self.messages.push(message);
        Ok(())
    }

    /// Build a conversation from existing messages, validating every push.
    pub fn from_messages(messages: impl IntoIterator<Item = ChatMessage>) -> Result<Self> {
        let mut conversation = Self::new();
        for message in messages {
            conversation.push(message)?;
        }
        Ok(conversation)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A citation attached to a search-like answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(rename = "uri")]
    pub source_uri: String,
    #[serde(rename = "title")]
    pub source_title: String,
}

impl GroundingChunk {
    pub fn new(source_uri: impl Into<String>, source_title: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            source_title: source_title.into(),
        }
    }
}

/// Citations backing a response. Never constructed empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroundingMetadata")]
pub struct GroundingMetadata {
    chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct RawGroundingMetadata {
    chunks: Vec<GroundingChunk>,
}

impl TryFrom<RawGroundingMetadata> for GroundingMetadata {
    type Error = String;

    fn try_from(raw: RawGroundingMetadata) -> std::result::Result<Self, Self::Error> {
        Self::from_chunks(raw.chunks).ok_or_else(|| "grounding metadata without chunks".to_string())
    }
}

impl GroundingMetadata {
    /// Wrap a list of chunks, returning `None` when the list is empty.
    pub fn from_chunks(chunks: Vec<GroundingChunk>) -> Option<Self> {
        if chunks.is_empty() {
            None
        } else {
            Some(Self { chunks })
        }
    }

    pub fn chunks(&self) -> &[GroundingChunk] {
        &self.chunks
    }
}

/// An audio session in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioContent {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Display duration such as `"15:30"`.
    #[serde(rename = "duration")]
    pub duration_label: String,
    pub cover_art_url: String,
    pub category: String,
    pub audio_url: String,
    #[serde(default)]
    pub is_favorite: bool,
}

/// One answer from the diagnostic questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Question id → answer, built per diagnostic session and then discarded.
pub type DiagnosisAnswers = BTreeMap<String, AnswerValue>;

/// Structured profile returned by best-effort extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub preferences: Vec<String>,
    pub last_session: String,
}

/// The assistant's answer to one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Opening greeting shown before the user has said anything.
pub fn welcome_message(user_name: &str) -> ChatMessage {
    ChatMessage {
        id: "ai-welcome".to_string(),
        sender: Sender::Assistant,
        text: format!(
            "Hello {}! I'm your personal Blissful assistant. How can I help you today? \
             You can ask me to find an audio, set a reminder, or just chat about how you're feeling.",
            user_name
        ),
        timestamp: Utc::now(),
    }
}
