//! Backend-driven assistant.
//!
//! Turns each operation into a [`GenerateRequest`], sends it through
//! [`call_with_retry`], and maps the model's text back onto catalog items.
//!
//! # Prompt → Result Mapping
//!
//! | Operation | Request | Mapping |
//! |-----------|---------|---------|
//! | `recommendations` | JSON list of titles | exact title match (case-insensitive); catalog prefix if nothing usable |
//! | `prescription` | JSON `{title, reason}` | first item whose title contains the first word; else the first item |
//! | `chat` | conversation turns | reply text + first candidate's grounding |
//! | `stream_chat` | conversation turns | backend stream, passed through |
//! | `structured_value` | JSON MIME type | fence stripped, parsed; empty text is "no data" |
//! | `generate_image` | image model, JPEG | `data:` URL of the first image |
//!
//! Model output that cannot be mapped is logged with `warn!` and replaced
//! by the fallback in the table; only transport errors reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use blissful_core::catalog::{Catalog, CatalogSnapshot};
use blissful_core::diagnosis::summarize;
use blissful_core::json::extract_json;
use blissful_core::models::{AudioContent, ChatMessage, ChatReply, DiagnosisAnswers};
use blissful_core::{AssistantError, Result};
use serde::Deserialize;

use super::{as_prescription, as_recommendation, validate_message, Assistant};
use crate::backend::{
    Contents, GenerateConfig, GenerateRequest, GenerateResponse, GenerativeBackend, ImageRequest,
    TextStream, Turn,
};
use crate::retry::{call_with_retry, RetryPolicy};

const IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
struct PrescriptionPick {
    title: String,
    #[serde(default)]
    reason: Option<String>,
}

pub struct GenerativeAssistant {
    backend: Arc<dyn GenerativeBackend>,
    catalog: Arc<dyn Catalog>,
    model: String,
    image_model: String,
    retry: RetryPolicy,
    recommendation_count: usize,
}

impl GenerativeAssistant {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        catalog: Arc<dyn Catalog>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            catalog,
            model: model.into(),
            image_model: "imagen-3.0-generate-002".to_string(),
            retry: RetryPolicy::default(),
            recommendation_count: 3,
        }
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_recommendation_count(mut self, count: usize) -> Self {
        self.recommendation_count = count;
        self
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        call_with_retry(&self.retry, || {
            self.backend.generate_content(request.clone())
        })
        .await
    }

    fn conversation(history: &[ChatMessage], text: &str) -> Contents {
        let mut turns: Vec<Turn> = history.iter().map(Turn::from).collect();
        turns.push(Turn::user(text));
        Contents::Conversation(turns)
    }

    fn json_request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest::new(&self.model, Contents::Text(prompt)).with_config(GenerateConfig::json())
    }

    fn catalog_prefix(&self, snapshot: &CatalogSnapshot) -> Vec<AudioContent> {
        snapshot
            .iter()
            .take(self.recommendation_count)
            .map(as_recommendation)
            .collect()
    }
}

fn title_list(snapshot: &CatalogSnapshot) -> String {
    snapshot
        .iter()
        .map(|item| format!("- {} ({})", item.title, item.category))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Catalog items named in `titles`, in the model's order, without repeats.
fn match_titles(snapshot: &CatalogSnapshot, titles: &[String], limit: usize) -> Vec<AudioContent> {
    let mut matched: Vec<AudioContent> = Vec::new();
    for title in titles {
        if matched.len() >= limit {
            break;
        }
        let wanted = title.trim().to_lowercase();
        if let Some(item) = snapshot.iter().find(|i| i.title.to_lowercase() == wanted) {
            if !matched.iter().any(|m| m.id == item.id) {
                matched.push(as_recommendation(item));
            }
        }
    }
    matched
}

/// First item whose title contains the first word of `title`.
fn match_first_word<'a>(snapshot: &'a CatalogSnapshot, title: &str) -> Option<&'a AudioContent> {
    let word = title.split_whitespace().next()?;
    snapshot.iter().find(|item| item.title.contains(word))
}

#[async_trait]
impl Assistant for GenerativeAssistant {
    fn name(&self) -> &str {
        "generative"
    }

    async fn recommendations(&self, user_id: &str) -> Result<Vec<AudioContent>> {
        let snapshot = self.catalog.snapshot().await?;
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(user_id, model = %self.model, "generative recommendations");

        let prompt = format!(
            "Recommend {} audio sessions for user {} from this catalog:\n{}\n\
             Respond with a JSON array of exact titles.",
            self.recommendation_count,
            user_id,
            title_list(&snapshot)
        );
        let response = self.generate(self.json_request(prompt)).await?;

        let matched = match extract_json::<Vec<String>>(&response.text) {
            Ok(titles) => match_titles(&snapshot, &titles, self.recommendation_count),
            Err(e) => {
                tracing::warn!(error = %e, "unusable recommendation list");
                Vec::new()
            }
        };
        if matched.is_empty() {
            return Ok(self.catalog_prefix(&snapshot));
        }
        Ok(matched)
    }

    async fn prescription(&self, answers: &DiagnosisAnswers) -> Result<AudioContent> {
        let snapshot = self.catalog.snapshot().await?;
        let fallback = snapshot.first().ok_or(AssistantError::EmptyCatalog)?;
        tracing::debug!(answers = answers.len(), model = %self.model, "generative prescription");

        let prompt = format!(
            "User diagnosis:\n{}\nRecommend one session from this catalog:\n{}\n\
             Respond with JSON: {{\"title\": \"Session Title\", \"reason\": \"Why this session\"}}.",
            summarize(answers),
            title_list(&snapshot)
        );
        let response = self.generate(self.json_request(prompt)).await?;

        let chosen = match extract_json::<PrescriptionPick>(&response.text) {
            Ok(pick) => {
                tracing::debug!(title = %pick.title, reason = ?pick.reason, "model prescription");
                match_first_word(&snapshot, &pick.title).unwrap_or(fallback)
            }
            Err(e) => {
                tracing::warn!(error = %e, "unusable prescription");
                fallback
            }
        };
        Ok(as_prescription(chosen))
    }

    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<ChatReply> {
        validate_message(text)?;
        tracing::debug!(history = history.len(), model = %self.model, "generative chat");
        let request = GenerateRequest::new(&self.model, Self::conversation(history, text));
        let response = self.generate(request).await?;
        Ok(ChatReply {
            grounding_metadata: response.grounding_metadata().cloned(),
            reply: ChatMessage::assistant(response.text),
        })
    }

    async fn stream_chat(&self, history: &[ChatMessage], text: &str) -> Result<TextStream> {
        validate_message(text)?;
        tracing::debug!(history = history.len(), model = %self.model, "generative stream");
        let request = GenerateRequest::new(&self.model, Self::conversation(history, text));
        call_with_retry(&self.retry, || {
            self.backend.generate_content_stream(request.clone())
        })
        .await
    }

    async fn structured_value(&self, prompt: &str) -> Result<Option<serde_json::Value>> {
        tracing::debug!(prompt, model = %self.model, "generative structured extraction");
        let response = self.generate(self.json_request(prompt.to_string())).await?;
        if response.text.trim().is_empty() {
            return Ok(None);
        }
        match extract_json::<serde_json::Value>(&response.text)? {
            serde_json::Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt, model = %self.image_model, "generative image");
        let request = ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            output_mime_type: Some(IMAGE_MIME.to_string()),
        };
        let response = call_with_retry(&self.retry, || {
            self.backend.generate_images(request.clone())
        })
        .await?;
        let image = response.generated_images.first().ok_or_else(|| {
            AssistantError::InvalidResponseFormat("no images in response".to_string())
        })?;
        image.decode()?;
        Ok(image.data_url())
    }
}
