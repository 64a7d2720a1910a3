//! # Blissful
//!
//! A wellness assistant service for a meditation audio catalog:
//! recommendations, questionnaire-based prescriptions, keyword-routed chat,
//! streamed replies, best-effort structured extraction, and image prompts.
//!
//! Two assistants share one async interface. The scripted one answers from
//! fixed scripts with simulated latency; the generative one drives a
//! pluggable backend behind a timeout and retry policy.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────────┐   ┌──────────────────┐
//! │   CLI    │──▶│ Assistant           │──▶│ Catalog snapshot │
//! │(blissful)│   │ Mock | Generative   │   │ (copy-on-write)  │
//! └──────────┘   └─────────┬───────────┘   └──────────────────┘
//!                          │ retry + timeout
//!                          ▼
//!                ┌──────────────────────┐
//!                │ GenerativeBackend    │
//!                │ Mock | Disabled      │
//!                └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assistant`] | Caller-facing operations and both implementations |
//! | [`backend`] | Generative backend boundary, mock backend, chat sessions |
//! | [`cancel`] | Cancelling in-flight calls |
//! | [`commands`] | CLI command runners |
//! | [`config`] | TOML configuration parsing |
//! | [`latency`] | Simulated processing delay |
//! | [`retry`] | Timeout and exponential backoff |
//!
//! Data models, the catalog store, the reply rule table and other
//! runtime-free pieces live in [`blissful_core`] and are re-exported here.

pub mod assistant;
pub mod backend;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod latency;
pub mod retry;

pub use blissful_core::{catalog, diagnosis, json, models, picker, rules, script};
pub use blissful_core::{AssistantError, Result};
