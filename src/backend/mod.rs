//! Generative backend abstraction.
//!
//! [`GenerativeBackend`] is the boundary a hosted text-generation endpoint
//! plugs into. Two implementations ship with the crate:
//! - **[`MockBackend`]**: canned responses with simulated latency.
//! - **[`DisabledBackend`]**: fails every call; used when no backend is configured.
//!
//! # Wire Shape
//!
//! ```text
//! GenerateRequest { model, contents, config?: { response_mime_type?, tools } }
//!        │
//!        ▼
//! GenerateResponse { text, candidates: [{ grounding_metadata? }] }
//!        or
//! TextStream  (partial text chunks, ends when the stream closes)
//! ```
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use blissful::config::{BackendConfig, LatencyConfig};
//! # use blissful::backend::create_backend;
//! let backend = create_backend(&BackendConfig::default(), &LatencyConfig::default()).unwrap();
//! assert_eq!(backend.name(), "mock");
//! ```

mod mock;
mod session;

pub use mock::MockBackend;
pub use session::ChatSession;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use blissful_core::models::{ChatMessage, GroundingMetadata, Sender};
use blissful_core::{AssistantError, Result};
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::config::{BackendConfig, LatencyConfig};

/// Incremental text output. Dropping the stream stops production.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Author of a conversation turn as the backend sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of conversation history sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

impl From<&ChatMessage> for Turn {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.sender {
            Sender::User => Role::User,
            Sender::Assistant => Role::Model,
        };
        Self {
            role,
            text: message.text.clone(),
        }
    }
}

/// Prompt payload: a single prompt string or a multi-turn conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Text(String),
    Conversation(Vec<Turn>),
}

impl Contents {
    /// The most recent user text: the prompt itself, or the last user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        match self {
            Contents::Text(text) => Some(text),
            Contents::Conversation(turns) => turns
                .iter()
                .rev()
                .find(|t| t.role == Role::User)
                .map(|t| t.text.as_str()),
        }
    }
}

/// Tools the backend may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    GoogleSearch,
}

pub const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl GenerateConfig {
    /// Ask for a JSON response body.
    pub fn json() -> Self {
        Self {
            response_mime_type: Some(JSON_MIME.to_string()),
            tools: Vec::new(),
        }
    }

    /// Enable search grounding.
    pub fn with_search(mut self) -> Self {
        if !self.tools.contains(&Tool::GoogleSearch) {
            self.tools.push(Tool::GoogleSearch);
        }
        self
    }

    pub fn wants_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some(JSON_MIME)
    }

    pub fn has_search(&self) -> bool {
        self.tools.contains(&Tool::GoogleSearch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Contents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerateConfig>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, contents: Contents) -> Self {
        Self {
            model: model.into(),
            contents,
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn wants_json(&self) -> bool {
        self.config.as_ref().is_some_and(GenerateConfig::wants_json)
    }

    pub fn has_search(&self) -> bool {
        self.config.as_ref().is_some_and(GenerateConfig::has_search)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            candidates: Vec::new(),
        }
    }

    /// Grounding from the first candidate, if any.
    pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mime_type: Option<String>,
}

/// A generated image as base64 bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub image_bytes: String,
    pub mime_type: String,
}

impl GeneratedImage {
    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.image_bytes)
            .map_err(|e| AssistantError::InvalidResponseFormat(format!("image bytes: {}", e)))
    }

    /// `data:` URL suitable for an `<img src>`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub generated_images: Vec<GeneratedImage>,
}

/// A hosted (or simulated) text generation endpoint.
///
/// Implementations must be `Send + Sync`; one instance is shared across
/// all concurrent calls.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Provider identifier (e.g. `"mock"`).
    fn name(&self) -> &str;

    /// Produce a complete response.
    async fn generate_content(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Produce a response incrementally.
    async fn generate_content_stream(&self, request: GenerateRequest) -> Result<TextStream>;

    /// Produce one or more images for a prompt.
    async fn generate_images(&self, request: ImageRequest) -> Result<ImageResponse>;
}

// ============ Disabled Backend ============

/// A backend that rejects every call.
///
/// Used when `backend.provider = "disabled"`.
pub struct DisabledBackend;

fn disabled() -> AssistantError {
    AssistantError::Backend("backend disabled".to_string())
}

#[async_trait]
impl GenerativeBackend for DisabledBackend {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate_content(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
        Err(disabled())
    }

    async fn generate_content_stream(&self, _request: GenerateRequest) -> Result<TextStream> {
        Err(disabled())
    }

    async fn generate_images(&self, _request: ImageRequest) -> Result<ImageResponse> {
        Err(disabled())
    }
}

/// Instantiate the backend named by `backend.provider`.
pub fn create_backend(
    backend: &BackendConfig,
    latency: &LatencyConfig,
) -> anyhow::Result<Arc<dyn GenerativeBackend>> {
    match backend.provider.as_str() {
        "mock" => Ok(Arc::new(MockBackend::new(latency.clone()))),
        "disabled" => Ok(Arc::new(DisabledBackend)),
        other => anyhow::bail!("Unknown backend provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_user_text() {
        let contents = Contents::Conversation(vec![
            Turn::user("first"),
            Turn::model("reply"),
            Turn::user("second"),
            Turn::model("reply 2"),
        ]);
        assert_eq!(contents.last_user_text(), Some("second"));
        assert_eq!(Contents::Text("p".into()).last_user_text(), Some("p"));
        assert_eq!(Contents::Conversation(vec![]).last_user_text(), None);
    }

    #[test]
    fn test_turn_from_chat_message() {
        let turn = Turn::from(&ChatMessage::assistant("hi"));
        assert_eq!(turn.role, Role::Model);
        assert_eq!(Turn::from(&ChatMessage::user("yo")).role, Role::User);
    }

    #[test]
    fn test_config_flags() {
        let request = GenerateRequest::new("m", Contents::Text("x".into()))
            .with_config(GenerateConfig::json().with_search().with_search());
        assert!(request.wants_json());
        assert!(request.has_search());
        assert_eq!(request.config.unwrap().tools.len(), 1);
        assert!(!GenerateRequest::new("m", Contents::Text("x".into())).wants_json());
    }

    #[test]
    fn test_request_serializes_without_empty_config() {
        let json = serde_json::to_value(GenerateRequest::new("m", Contents::Text("x".into())))
            .unwrap();
        assert_eq!(json["contents"], "x");
        assert!(json.get("config").is_none());
    }

    #[test]
    fn test_image_decode_rejects_garbage() {
        let image = GeneratedImage {
            image_bytes: "***".into(),
            mime_type: "image/png".into(),
        };
        assert!(matches!(
            image.decode(),
            Err(AssistantError::InvalidResponseFormat(_))
        ));
        assert!(image.data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_disabled_backend_fails() {
        let err = DisabledBackend
            .generate_content(GenerateRequest::new("m", Contents::Text("x".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Backend(_)));
    }

    #[test]
    fn test_create_backend() {
        let latency = LatencyConfig::instant();
        let mut config = BackendConfig::default();
        assert_eq!(create_backend(&config, &latency).unwrap().name(), "mock");
        config.provider = "disabled".into();
        assert_eq!(create_backend(&config, &latency).unwrap().name(), "disabled");
        config.provider = "nope".into();
        assert!(create_backend(&config, &latency).is_err());
    }
}
