//! Caller-facing assistant operations.
//!
//! [`Assistant`] is what screens talk to. Both implementations read the
//! shared [`Catalog`] through snapshots and never mutate it; conversation
//! history is owned by the caller and passed into each call.
//!
//! | Implementation | Source of answers |
//! |----------------|-------------------|
//! | [`MockAssistant`] | fixed scripts and the keyword [`RuleTable`](blissful_core::rules::RuleTable) |
//! | [`GenerativeAssistant`] | a [`GenerativeBackend`](crate::backend::GenerativeBackend) behind the retry policy |
//!
//! # Structured extraction
//!
//! `structured_value` is object-safe and returns raw JSON. The typed
//! helpers [`structured_data`] and [`try_structured_data`] deserialize it:
//!
//! ```text
//! try_structured_data::<T>  →  Ok(Some(T))   parsed
//!                              Ok(None)      nothing found
//!                              Err(InvalidResponseFormat)  wrong shape
//! structured_data::<T>      →  Some(T) | None   (format errors logged, then None)
//! ```

mod generative;
mod mock;

pub use generative::GenerativeAssistant;
pub use mock::MockAssistant;

use std::sync::Arc;

use async_trait::async_trait;
use blissful_core::catalog::Catalog;
use blissful_core::models::{AudioContent, ChatMessage, ChatReply, DiagnosisAnswers};
use blissful_core::picker::{IndexPicker, RandomPicker, SeededPicker};
use blissful_core::{AssistantError, Result};
use serde::de::DeserializeOwned;

use crate::backend::{create_backend, TextStream};
use crate::config::Config;
use crate::retry::RetryPolicy;

/// Title suffix marking a recommended item.
pub const RECOMMENDATION_SUFFIX: &str = " (AI Rec)";
/// Title given to a prescribed item.
pub const PRESCRIPTION_TITLE: &str = "Personalized Relaxation Mix";

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Implementation identifier (e.g. `"scripted"`).
    fn name(&self) -> &str;

    /// Recommended sessions for `user_id`, in catalog order.
    async fn recommendations(&self, user_id: &str) -> Result<Vec<AudioContent>>;

    /// One session chosen from questionnaire answers.
    async fn prescription(&self, answers: &DiagnosisAnswers) -> Result<AudioContent>;

    /// Reply to `text` given the prior `history`.
    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<ChatReply>;

    /// Reply to `text` as a stream of fragments.
    async fn stream_chat(&self, history: &[ChatMessage], text: &str) -> Result<TextStream>;

    /// Best-effort structured extraction. `Ok(None)` means nothing was found.
    async fn structured_value(&self, prompt: &str) -> Result<Option<serde_json::Value>>;

    /// An image URL (remote or `data:`) for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// Typed structured extraction that keeps format errors distinguishable.
pub async fn try_structured_data<T: DeserializeOwned>(
    assistant: &dyn Assistant,
    prompt: &str,
) -> Result<Option<T>> {
    match assistant.structured_value(prompt).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AssistantError::InvalidResponseFormat(e.to_string())),
        None => Ok(None),
    }
}

/// Typed structured extraction where any failure reads as "no data".
pub async fn structured_data<T: DeserializeOwned>(
    assistant: &dyn Assistant,
    prompt: &str,
) -> Option<T> {
    match try_structured_data(assistant, prompt).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "structured extraction failed");
            None
        }
    }
}

pub(crate) fn validate_message(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AssistantError::InvalidRequest(
            "message text must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn as_recommendation(item: &AudioContent) -> AudioContent {
    AudioContent {
        title: format!("{}{}", item.title, RECOMMENDATION_SUFFIX),
        ..item.clone()
    }
}

pub(crate) fn as_prescription(item: &AudioContent) -> AudioContent {
    AudioContent {
        title: PRESCRIPTION_TITLE.to_string(),
        ..item.clone()
    }
}

/// Build the assistant selected by `assistant.mode`.
pub fn create_assistant(
    config: &Config,
    catalog: Arc<dyn Catalog>,
) -> anyhow::Result<Arc<dyn Assistant>> {
    match config.assistant.mode.as_str() {
        "scripted" => {
            let picker: Arc<dyn IndexPicker> = match config.assistant.seed {
                Some(seed) => Arc::new(SeededPicker::new(seed)),
                None => Arc::new(RandomPicker),
            };
            Ok(Arc::new(
                MockAssistant::new(catalog, config.latency.clone())
                    .with_picker(picker)
                    .with_recommendation_count(config.assistant.recommendation_count),
            ))
        }
        "generative" => {
            let backend = create_backend(&config.backend, &config.latency)?;
            Ok(Arc::new(
                GenerativeAssistant::new(backend, catalog, &config.backend.model)
                    .with_image_model(&config.backend.image_model)
                    .with_retry(RetryPolicy::from_config(&config.backend))
                    .with_recommendation_count(config.assistant.recommendation_count),
            ))
        }
        other => anyhow::bail!("Unknown assistant mode: {}", other),
    }
}
