//! Canned-response backend.
//!
//! Answers every request with fixed text after the configured latency.
//!
//! | Request | Response text |
//! |---------|---------------|
//! | prompt containing `hello` | greeting |
//! | any other prompt | generic mock sentence |
//! | conversation | `Mock AI response to: "<last user turn>". History length: <turns>` |
//! | + `GoogleSearch` tool | suffix sentence and two `mocksearch.com` citations |
//! | + JSON MIME type | `{"message": <text>, "mockData": true}` (the story prompt gets a fenced story instead) |

use async_trait::async_trait;
use blissful_core::models::{GroundingChunk, GroundingMetadata};
use blissful_core::script::{split_fragments, DEMO_STREAM_TEXT};
use blissful_core::{AssistantError, Result};

use super::{
    Candidate, Contents, GenerateRequest, GenerateResponse, GeneratedImage, GenerativeBackend,
    ImageRequest, ImageResponse, TextStream,
};
use crate::config::LatencyConfig;
use crate::latency::simulate_delay;

/// Base64 of a 1×1 PNG.
const PIXEL_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

const STORY_PROMPT: &str = "Tell me a story in 100 words.";

/// Backend that returns canned data.
pub struct MockBackend {
    latency: LatencyConfig,
}

impl MockBackend {
    pub fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }

    fn respond(request: &GenerateRequest) -> GenerateResponse {
        let mut text = match &request.contents {
            Contents::Text(prompt) if prompt.to_lowercase().contains("hello") => {
                "Hello there! This is a mock greeting.".to_string()
            }
            Contents::Text(_) => "This is a mock response from generateContent.".to_string(),
            Contents::Conversation(turns) => format!(
                "Mock AI response to: \"{}\". History length: {}",
                request.contents.last_user_text().unwrap_or_default(),
                turns.len()
            ),
        };

        let mut candidates = Vec::new();
        if request.has_search() {
            text.push_str(" Mocked Google Search results would appear here.");
            candidates.push(Candidate {
                grounding_metadata: GroundingMetadata::from_chunks(vec![
                    GroundingChunk::new("https://mocksearch.com/result1", "Mock Search Result 1"),
                    GroundingChunk::new("https://mocksearch.com/result2", "Mock Search Result 2"),
                ]),
            });
        }

        if request.wants_json() {
            text = if request.contents == Contents::Text(STORY_PROMPT.to_string()) {
                "```json\n{\"story\": \"Once upon a time, in a mock land...\"}\n```".to_string()
            } else {
                serde_json::json!({ "message": text, "mockData": true }).to_string()
            };
        }

        GenerateResponse { text, candidates }
    }

    fn stream_script(request: &GenerateRequest) -> String {
        match &request.contents {
            Contents::Text(_) => DEMO_STREAM_TEXT.to_string(),
            Contents::Conversation(_) => format!(
                "Mock streaming AI response to: \"{}\". Chunk 1. Chunk 2.",
                request.contents.last_user_text().unwrap_or_default()
            ),
        }
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_content(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        tracing::debug!(model = %request.model, "mock generate_content");
        let response = Self::respond(&request);
        Ok(simulate_delay(response, self.latency.generate).await)
    }

    async fn generate_content_stream(&self, request: GenerateRequest) -> Result<TextStream> {
        tracing::debug!(model = %request.model, "mock generate_content_stream");
        let fragments = split_fragments(&Self::stream_script(&request));
        let delay = self.latency.stream_fragment;
        let stream = async_stream::stream! {
            for fragment in fragments {
                simulate_delay((), delay).await;
                yield Ok::<String, AssistantError>(fragment);
            }
        };
        Ok(Box::pin(stream))
    }

    async fn generate_images(&self, request: ImageRequest) -> Result<ImageResponse> {
        tracing::debug!(model = %request.model, prompt = %request.prompt, "mock generate_images");
        let image = GeneratedImage {
            image_bytes: PIXEL_PNG_BASE64.to_string(),
            mime_type: request
                .output_mime_type
                .unwrap_or_else(|| "image/png".to_string()),
        };
        let response = ImageResponse {
            generated_images: vec![image],
        };
        Ok(simulate_delay(response, self.latency.generate).await)
    }
}
