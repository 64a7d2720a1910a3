//! CLI command runners.
//!
//! Each `run_*` function builds what it needs from the [`Config`], performs
//! one assistant operation, and prints the result to stdout. Logs go to
//! stderr, so stdout can be piped.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use blissful_core::catalog::{Catalog, InMemoryCatalog, ALL_CATEGORIES};
use blissful_core::diagnosis::{questions, QuestionKind};
use blissful_core::models::{
    welcome_message, AnswerValue, ChatMessage, Conversation, DiagnosisAnswers, GroundingMetadata,
};
use futures::StreamExt;

use crate::assistant::{create_assistant, try_structured_data, Assistant};
use crate::backend::{create_backend, Contents, GenerateConfig, GenerateRequest};
use crate::config::Config;
use crate::retry::{call_with_retry, RetryPolicy};

fn default_catalog() -> Arc<dyn Catalog> {
    Arc::new(InMemoryCatalog::with_defaults())
}

fn assistant(config: &Config) -> Result<Arc<dyn Assistant>> {
    create_assistant(config, default_catalog())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_sources(grounding: Option<&GroundingMetadata>) {
    if let Some(grounding) = grounding {
        println!();
        println!("Sources:");
        for chunk in grounding.chunks() {
            println!("  - {} <{}>", chunk.source_title, chunk.source_uri);
        }
    }
}

/// Turn `key=value` pairs into questionnaire answers.
///
/// Numbers become [`AnswerValue::Number`], comma-separated values become
/// [`AnswerValue::List`], everything else is text.
pub fn parse_answers(pairs: Vec<(String, String)>) -> DiagnosisAnswers {
    pairs
        .into_iter()
        .map(|(key, raw)| {
            let value = if let Ok(n) = raw.trim().parse::<f64>() {
                AnswerValue::Number(n)
            } else if raw.contains(',') {
                AnswerValue::List(
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                )
            } else {
                AnswerValue::Text(raw)
            };
            (key, value)
        })
        .collect()
}

/// `blissful catalog [--category C]`
pub async fn run_catalog(category: Option<&str>) -> Result<()> {
    let snapshot = default_catalog().snapshot().await?;
    let items = snapshot.by_category(category.unwrap_or(ALL_CATEGORIES));
    if items.is_empty() {
        println!("No audio in this category.");
        return Ok(());
    }
    for item in items {
        println!(
            "{:<9} {:<42} {:<20} {:>6}  {}{}",
            item.id,
            item.title,
            item.artist,
            item.duration_label,
            item.category,
            if item.is_favorite { "  *" } else { "" }
        );
    }
    Ok(())
}

/// `blissful recommend <USER_ID>`
pub async fn run_recommend(config: &Config, user_id: &str) -> Result<()> {
    let recommendations = assistant(config)?.recommendations(user_id).await?;
    print_json(&recommendations)
}

/// `blissful prescribe --answer k=v ...`
pub async fn run_prescribe(config: &Config, answers: Vec<(String, String)>) -> Result<()> {
    let answers = parse_answers(answers);
    let item = assistant(config)?.prescription(&answers).await?;
    print_json(&item)
}

fn load_history(path: &Path) -> Result<Conversation> {
    if !path.exists() {
        return Ok(Conversation::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    let messages: Vec<ChatMessage> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file: {}", path.display()))?;
    Ok(Conversation::from_messages(messages)?)
}

/// `blissful chat <TEXT> [--history FILE] [--name NAME]`
///
/// With `--history`, prior messages are read from the file (a JSON array
/// of messages) and the new exchange is written back. A new history file
/// starts with the welcome message addressed to `user_name`.
pub async fn run_chat(
    config: &Config,
    text: &str,
    history: Option<&Path>,
    user_name: &str,
) -> Result<()> {
    let mut conversation = match history {
        Some(path) => load_history(path)?,
        None => Conversation::new(),
    };
    if history.is_some() && conversation.is_empty() {
        conversation.push(welcome_message(user_name))?;
    }

    let user_message = ChatMessage::user(text);
    let reply = assistant(config)?
        .chat(conversation.messages(), text)
        .await?;

    println!("{}", reply.reply.text);
    print_sources(reply.grounding_metadata.as_ref());

    if let Some(path) = history {
        conversation.push(user_message)?;
        conversation.push(reply.reply)?;
        std::fs::write(path, serde_json::to_string_pretty(conversation.messages())?)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;
    }
    Ok(())
}

/// `blissful stream <TEXT>`
pub async fn run_stream(config: &Config, text: &str) -> Result<()> {
    let mut stream = assistant(config)?.stream_chat(&[], text).await?;
    let mut stdout = std::io::stdout();
    let mut first = true;
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if !first {
            write!(stdout, " ")?;
        }
        write!(stdout, "{}", fragment)?;
        stdout.flush()?;
        first = false;
    }
    writeln!(stdout)?;
    Ok(())
}

/// `blissful extract <PROMPT>`
pub async fn run_extract(config: &Config, prompt: &str) -> Result<()> {
    let assistant = assistant(config)?;
    match try_structured_data::<serde_json::Value>(assistant.as_ref(), prompt).await {
        Ok(Some(value)) => print_json(&value),
        Ok(None) => {
            println!("No structured data.");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "structured extraction failed");
            println!("No structured data.");
            Ok(())
        }
    }
}

/// `blissful image <PROMPT>`
pub async fn run_image(config: &Config, prompt: &str) -> Result<()> {
    let url = assistant(config)?.generate_image(prompt).await?;
    println!("{}", url);
    Ok(())
}

/// `blissful questions`
pub fn run_questions() -> Result<()> {
    for question in questions() {
        println!("[{}] {}", question.id, question.text);
        match &question.kind {
            QuestionKind::Tags { options } => println!("    any of: {}", options.join(", ")),
            QuestionKind::Slider {
                min,
                max,
                default_value,
            } => println!("    {}..={} (default {})", min, max, default_value),
            QuestionKind::Choice { options } => println!("    one of: {}", options.join(", ")),
        }
    }
    Ok(())
}

/// `blissful generate <PROMPT> [--search] [--json]`
///
/// Talks to the configured backend directly, bypassing the assistant.
pub async fn run_generate(config: &Config, prompt: &str, search: bool, json: bool) -> Result<()> {
    let backend = create_backend(&config.backend, &config.latency)?;
    let mut generate_config = if json {
        GenerateConfig::json()
    } else {
        GenerateConfig::default()
    };
    if search {
        generate_config = generate_config.with_search();
    }
    let request = GenerateRequest::new(&config.backend.model, Contents::Text(prompt.to_string()))
        .with_config(generate_config);

    let policy = RetryPolicy::from_config(&config.backend);
    let response = call_with_retry(&policy, || backend.generate_content(request.clone())).await?;

    println!("{}", response.text);
    print_sources(response.grounding_metadata());
    Ok(())
}
