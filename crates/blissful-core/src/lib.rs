//! # Blissful Core
//!
//! Runtime-agnostic logic for the Blissful assistant: data models, the
//! typed error taxonomy, the catalog store abstraction, the keyword reply
//! table, streaming-script splitting, index pickers, JSON extraction, and
//! the diagnostic questionnaire.
//!
//! This crate contains no tokio or other runtime dependencies; timing,
//! configuration, and backends live in the `blissful` application crate.

pub mod catalog;
pub mod diagnosis;
pub mod error;
pub mod json;
pub mod models;
pub mod picker;
pub mod rules;
pub mod script;

pub use error::{AssistantError, Result};
