//! OpenAI-compatible chat-completion client
//!
//! Targets Groq's `/chat/completions` endpoint by default. Any provider that
//! speaks the same wire format works by changing `completion.base_url`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{CompletionProvider, GatewayError};
use crate::config::CompletionConfig;
use crate::error::TrekPlanError;

const COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completion client for Groq and other OpenAI-compatible APIs
pub struct GroqClient {
    client: Client,
    provider_name: String,
    api_key: String,
    model: String,
    temperature: f32,
    /// Full endpoint URL (base + COMPLETIONS_PATH)
    url: String,
    timeout: Duration,
}

impl GroqClient {
    /// Create a client from the completion settings. Fails without a credential.
    pub fn new(config: &CompletionConfig) -> Result<Self, TrekPlanError> {
        let api_key = config.api_key()?.to_string();
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trekplan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrekPlanError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider_name: config.provider_name.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            url: format!("{}{COMPLETIONS_PATH}", config.base_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// Endpoint the client posts to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(&e))?;
        debug!("Provider answered {} with {} bytes", status, bytes.len());

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value =
            serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))?;

        match extract_content(&result) {
            Some(text) => Ok(text),
            None => Err(GatewayError::NoContent { result }),
        }
    }

    fn classify(&self, err: &reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::transport(err)
        }
    }
}

/// First choice's message content, when present and not blank
fn extract_content(result: &Value) -> Option<String> {
    let response = ChatCompletionResponse::deserialize(result).ok()?;
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
        .filter(|text| !text.trim().is_empty())
}

#[async_trait]
impl CompletionProvider for GroqClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    #[instrument(name = "completion", skip_all, fields(provider = %self.provider_name, model = %self.model))]
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let start_time = Instant::now();
        info!("Requesting completion ({} prompt chars)", prompt.len());

        let outcome = match tokio::time::timeout(self.timeout, self.send(system, prompt)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        match &outcome {
            Ok(text) => info!("Completion received in {:.3}s ({} chars)", elapsed, text.len()),
            Err(e) => warn!("Completion failed after {:.3}s: {}", elapsed, e),
        }

        if elapsed > 20.0 {
            warn!("Slow completion response detected: {:.3}s", elapsed);
        }

        outcome
    }
}
