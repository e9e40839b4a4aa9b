//! LLM provider abstraction.
//!
//! The orchestrator only ever talks to `dyn Llm`; the concrete provider
//! is chosen from config at startup. Gemini is the only provider today,
//! but the seam exists so another backend is a new module plus one match
//! arm in [`from_config`].

pub mod bridge;
mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use gruff_core::config::{Config, ConfigError};

/// Errors from LLM calls.
///
/// Cancellation is deliberately not represented here: a superseded or
/// aborted request is routine and the bridge reports it as its own
/// event, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0}")]
    Config(String),
    #[error("{0} environment variable is not set")]
    MissingApiKey(&'static str),
    #[error("unsupported llm provider '{0}'")]
    UnsupportedProvider(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("stream error: {0}")]
    Stream(String),
    #[error("the model returned an empty response")]
    EmptyResponse,
    #[error("timed out after {0} seconds")]
    TimedOut(u64),
}

impl From<ConfigError> for LlmError {
    fn from(err: ConfigError) -> Self {
        LlmError::Config(err.to_string())
    }
}

/// A text-generation backend.
#[async_trait]
pub trait Llm: Send + Sync {
    /// One-shot generation; returns the complete response.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Streaming generation. Chunks are pushed into `chunks` as they
    /// arrive; the future resolves when the stream ends. Dropping the
    /// receiver aborts the stream.
    async fn stream(
        &self,
        prompt: &str,
        chunks: mpsc::UnboundedSender<String>,
    ) -> Result<(), LlmError>;
}

/// Builds the provider named by config.
///
/// Fails fast on a missing provider/model key or API key so the user
/// sees the problem before any git work happens.
pub fn from_config(config: &Config) -> Result<Arc<dyn Llm>, LlmError> {
    let provider = config.llm_provider()?;
    let model = config.llm_model()?;

    match provider {
        "gemini" => Ok(Arc::new(gemini::Gemini::from_env(model)?)),
        other => Err(LlmError::UnsupportedProvider(other.to_owned())),
    }
}
