//! Scripted assistant.
//!
//! Answers from fixed scripts after the configured latency:
//!
//! | Operation | Answer | Default delay |
//! |-----------|--------|---------------|
//! | `recommendations` | first N catalog items, titles suffixed `(AI Rec)` | 800 ms |
//! | `prescription` | one picked item titled `Personalized Relaxation Mix` | 1200 ms |
//! | `chat` | first matching keyword rule, else an echo | 700 ms |
//! | `stream_chat` | the demo sentence, one fragment per delay | 100 ms each |
//! | `structured_value` | a fixed profile for "user profile details", else nothing | 600 ms |
//! | `generate_image` | a picsum placeholder URL seeded by the prompt | 1500 ms |

use std::sync::Arc;

use async_trait::async_trait;
use blissful_core::catalog::Catalog;
use blissful_core::models::{AudioContent, ChatMessage, ChatReply, DiagnosisAnswers, UserProfile};
use blissful_core::picker::{IndexPicker, RandomPicker};
use blissful_core::rules::RuleTable;
use blissful_core::script::{split_fragments, DEMO_STREAM_TEXT};
use blissful_core::{AssistantError, Result};

use super::{as_prescription, as_recommendation, validate_message, Assistant};
use crate::backend::TextStream;
use crate::config::LatencyConfig;
use crate::latency::simulate_delay;

const PROFILE_TRIGGER: &str = "user profile details";

fn sample_profile() -> UserProfile {
    UserProfile {
        name: "John Doe".to_string(),
        preferences: vec!["meditation".to_string(), "sleep stories".to_string()],
        last_session: "Morning Dew Meditation".to_string(),
    }
}

pub struct MockAssistant {
    catalog: Arc<dyn Catalog>,
    rules: RuleTable,
    picker: Arc<dyn IndexPicker>,
    latency: LatencyConfig,
    recommendation_count: usize,
}

impl MockAssistant {
    pub fn new(catalog: Arc<dyn Catalog>, latency: LatencyConfig) -> Self {
        Self {
            catalog,
            rules: RuleTable::default(),
            picker: Arc::new(RandomPicker),
            latency,
            recommendation_count: 3,
        }
    }

    /// Replace the prescription picker (e.g. with a seeded one).
    pub fn with_picker(mut self, picker: Arc<dyn IndexPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_recommendation_count(mut self, count: usize) -> Self {
        self.recommendation_count = count;
        self
    }
}

#[async_trait]
impl Assistant for MockAssistant {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recommendations(&self, user_id: &str) -> Result<Vec<AudioContent>> {
        tracing::debug!(user_id, "scripted recommendations");
        let snapshot = self.catalog.snapshot().await?;
        let items: Vec<AudioContent> = snapshot
            .iter()
            .take(self.recommendation_count)
            .map(as_recommendation)
            .collect();
        Ok(simulate_delay(items, self.latency.recommendations).await)
    }

    async fn prescription(&self, answers: &DiagnosisAnswers) -> Result<AudioContent> {
        tracing::debug!(answers = answers.len(), "scripted prescription");
        let snapshot = self.catalog.snapshot().await?;
        let picked = self
            .picker
            .pick(snapshot.len())
            .and_then(|index| snapshot.get(index))
            .map(as_prescription)
            .ok_or(AssistantError::EmptyCatalog);
        simulate_delay(picked, self.latency.prescription).await
    }

    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<ChatReply> {
        validate_message(text)?;
        tracing::debug!(
            history = history.len(),
            rule = self.rules.matched_rule(text).unwrap_or("echo"),
            "scripted chat"
        );
        let routed = self.rules.route(text);
        let reply = ChatReply {
            reply: ChatMessage::assistant(routed.text),
            grounding_metadata: routed.grounding,
        };
        Ok(simulate_delay(reply, self.latency.chat).await)
    }

    async fn stream_chat(&self, history: &[ChatMessage], text: &str) -> Result<TextStream> {
        validate_message(text)?;
        tracing::debug!(history = history.len(), "scripted stream");
        let fragments = split_fragments(DEMO_STREAM_TEXT);
        let delay = self.latency.stream_fragment;
        let stream = async_stream::stream! {
            for fragment in fragments {
                simulate_delay((), delay).await;
                yield Ok::<String, AssistantError>(fragment);
            }
        };
        Ok(Box::pin(stream))
    }

    async fn structured_value(&self, prompt: &str) -> Result<Option<serde_json::Value>> {
        tracing::debug!(prompt, "scripted structured extraction");
        let value = if prompt.contains(PROFILE_TRIGGER) {
            Some(serde_json::to_value(sample_profile())?)
        } else {
            None
        };
        Ok(simulate_delay(value, self.latency.structured_data).await)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt, "scripted image");
        let url = format!(
            "https://picsum.photos/seed/{}/512/512",
            urlencoding::encode(prompt)
        );
        Ok(simulate_delay(url, self.latency.image).await)
    }
}
