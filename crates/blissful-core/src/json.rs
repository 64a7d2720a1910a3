//! JSON extraction from model text.
//!
//! Models asked for JSON often wrap it in a Markdown fence. The fence (with
//! or without a language tag) is stripped before parsing; anything that
//! still fails to parse becomes [`AssistantError::InvalidResponseFormat`].

use serde::de::DeserializeOwned;

use crate::error::{AssistantError, Result};

/// Remove a surrounding ```` ```lang ... ``` ```` fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Optional language tag, then any whitespace.
    let untagged = body.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
    let body = if untagged.trim().is_empty() { body } else { untagged };
    body.trim()
}

/// Parse `raw` (optionally fenced) as `T`.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| {
        AssistantError::InvalidResponseFormat(format!("{} (raw text: {:?})", e, raw))
    })
}
