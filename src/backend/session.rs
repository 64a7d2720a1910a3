//! Stateful multi-turn chat over any [`GenerativeBackend`].
//!
//! Unlike the stateless `Assistant::chat`, a session keeps its own history.
//! Each send builds the request from the current history plus the new user
//! turn, and the user and model turns are recorded together once the reply
//! is complete. A failed or abandoned exchange leaves the history untouched,
//! so it always alternates user and model turns.

use std::sync::{Arc, Mutex, MutexGuard};

use blissful_core::{AssistantError, Result};
use futures::StreamExt;

use super::{
    Contents, GenerateConfig, GenerateRequest, GenerateResponse, GenerativeBackend, TextStream,
    Turn,
};

pub struct ChatSession {
    backend: Arc<dyn GenerativeBackend>,
    model: String,
    config: Option<GenerateConfig>,
    history: Arc<Mutex<Vec<Turn>>>,
}

fn lock_history(history: &Mutex<Vec<Turn>>) -> Result<MutexGuard<'_, Vec<Turn>>> {
    history
        .lock()
        .map_err(|_| AssistantError::Backend("session history lock poisoned".to_string()))
}

/// Append one completed exchange under a single lock.
fn record_exchange(history: &Mutex<Vec<Turn>>, message: &str, reply: String) -> Result<()> {
    let mut history = lock_history(history)?;
    history.push(Turn::user(message));
    history.push(Turn::model(reply));
    Ok(())
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        model: impl Into<String>,
        history: Vec<Turn>,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            config: None,
            history: Arc::new(Mutex::new(history)),
        }
    }

    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Copy of the turns exchanged so far.
    pub fn history(&self) -> Result<Vec<Turn>> {
        Ok(lock_history(&self.history)?.clone())
    }

    fn request_with(&self, message: &str) -> Result<GenerateRequest> {
        let mut turns = lock_history(&self.history)?.clone();
        turns.push(Turn::user(message));
        let request = GenerateRequest::new(&self.model, Contents::Conversation(turns));
        Ok(match &self.config {
            Some(config) => request.with_config(config.clone()),
            None => request,
        })
    }

    /// Send one user message and wait for the full reply.
    pub async fn send_message(&self, message: &str) -> Result<GenerateResponse> {
        let request = self.request_with(message)?;
        let response = self.backend.generate_content(request).await?;
        record_exchange(&self.history, message, response.text.clone())?;
        Ok(response)
    }

    /// Send one user message and stream the reply.
    ///
    /// The exchange is recorded once the stream has been fully consumed
    /// without errors; a stream dropped early or failing midway records
    /// nothing.
    pub async fn send_message_stream(&self, message: &str) -> Result<TextStream> {
        let request = self.request_with(message)?;
        let mut inner = self.backend.generate_content_stream(request).await?;

        let history = Arc::clone(&self.history);
        let message = message.to_string();
        let stream = async_stream::stream! {
            let mut fragments = Vec::new();
            let mut failed = false;
            while let Some(item) = inner.next().await {
                match &item {
                    Ok(fragment) => fragments.push(fragment.clone()),
                    Err(_) => failed = true,
                }
                yield item;
            }
            if !failed {
                if let Err(e) = record_exchange(&history, &message, fragments.join(" ")) {
                    tracing::warn!(error = %e, "could not record streamed exchange");
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
