//! Gemini provider over the generativelanguage REST API.
//!
//! `generate` uses `:generateContent`; `stream` uses
//! `:streamGenerateContent?alt=sse` and decodes the SSE frames with
//! `eventsource-stream`. The API key is passed in the `x-goog-api-key`
//! header rather than the query string so it never lands in proxy logs.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{Llm, LlmError};

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct Gemini {
    client: reqwest::Client,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl Gemini {
    /// Builds a client for `model`, reading the API key from
    /// `GEMINI_API_KEY`.
    pub fn from_env(model: &str) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey(API_KEY_VAR))?;
        Ok(Self {
            client: reqwest::Client::new(),
            model: model.to_owned(),
            api_key,
        })
    }

    fn request(&self, endpoint: &str, prompt: &str) -> reqwest::RequestBuilder {
        let url = format!("{BASE_URL}/{}:{endpoint}", self.model);
        self.client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: [Content { parts: [Part { text: prompt }] }],
            })
    }
}

/// Extracts the text of the first candidate, joining multi-part answers.
fn response_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Llm for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.request("generateContent", prompt).send().await?;
        let response = error_for_status(response).await?;

        let body: GenerateResponse = response.json().await?;
        let text = response_text(body);
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn stream(
        &self,
        prompt: &str,
        chunks: mpsc::UnboundedSender<String>,
    ) -> Result<(), LlmError> {
        let response = self
            .request("streamGenerateContent", prompt)
            .query(&[("alt", "sse")])
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let mut events = response.bytes_stream().eventsource();
        let mut saw_text = false;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            let body: GenerateResponse = serde_json::from_str(&event.data)
                .map_err(|e| LlmError::Stream(e.to_string()))?;
            let text = response_text(body);
            if text.is_empty() {
                continue;
            }
            saw_text = true;
            if chunks.send(text).is_err() {
                // Receiver gone — the run was superseded; stop reading.
                return Ok(());
            }
        }

        if !saw_text {
            return Err(LlmError::EmptyResponse);
        }
        Ok(())
    }
}
