//! TOML configuration.
//!
//! Every field carries a serde default, so an empty file (or no file at all,
//! via [`load_or_default`]) yields [`Config::default`].
//!
//! ```toml
//! [assistant]
//! mode = "scripted"          # or "generative"
//! recommendation_count = 3
//! seed = 42                  # optional; pins prescription picks
//!
//! [backend]
//! provider = "mock"          # or "disabled"
//! model = "gemini-2.5-flash-preview-04-17"
//! timeout_ms = 10000
//! max_retries = 3
//! backoff_base_ms = 250
//!
//! [latency]
//! chat = 700
//! stream_fragment = 100
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            recommendation_count: default_recommendation_count(),
            seed: None,
        }
    }
}

fn default_mode() -> String {
    "scripted".to_string()
}
fn default_recommendation_count() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            image_model: default_image_model(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

fn default_provider() -> String {
    "mock".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash-preview-04-17".to_string()
}
fn default_image_model() -> String {
    "imagen-3.0-generate-002".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    250
}

/// Simulated processing time per operation, in milliseconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LatencyConfig {
    pub recommendations: u64,
    pub prescription: u64,
    pub chat: u64,
    pub stream_fragment: u64,
    pub structured_data: u64,
    pub image: u64,
    pub generate: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            recommendations: 800,
            prescription: 1200,
            chat: 700,
            stream_fragment: 100,
            structured_data: 600,
            image: 1500,
            generate: 500,
        }
    }
}

impl LatencyConfig {
    /// All delays zero; used by the CLI tests.
    pub fn instant() -> Self {
        Self {
            recommendations: 0,
            prescription: 0,
            chat: 0,
            stream_fragment: 0,
            structured_data: 0,
            image: 0,
            generate: 0,
        }
    }
}

/// Parse and validate a configuration string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse, and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.assistant.recommendation_count == 0 {
        anyhow::bail!("assistant.recommendation_count must be >= 1");
    }

    match config.assistant.mode.as_str() {
        "scripted" | "generative" => {}
        other => anyhow::bail!(
            "Unknown assistant mode: '{}'. Must be scripted or generative.",
            other
        ),
    }

    match config.backend.provider.as_str() {
        "mock" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown backend provider: '{}'. Must be mock or disabled.",
            other
        ),
    }

    if config.backend.timeout_ms == 0 {
        anyhow::bail!("backend.timeout_ms must be > 0");
    }

    Ok(())
}
