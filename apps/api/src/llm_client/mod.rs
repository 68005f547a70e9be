//! Anthropic Messages API client shared by every LLM-backed feature: resume and job
//! skill extraction, candidate profiling and deep ranking.
//!
//! All callers ask for JSON; `call_json` strips code fences and deserializes.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
/// Sampling temperature for every structured call.
const TEMPERATURE: f32 = 0.3;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Text of the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(LlmResponse),
    Retry(LlmError),
    Fail(LlmError),
}

fn retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    base_backoff: Duration,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
            base_backoff: Duration::from_millis(500),
        })
    }

    /// Points the client at another Messages-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn attempt(&self, request: &MessagesRequest<'_>) -> Attempt {
        let response = match self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => return Attempt::Retry(e.into()),
            Err(e) => return Attempt::Fail(e.into()),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<LlmResponse>().await {
                Ok(body) => Attempt::Done(body),
                Err(e) => Attempt::Fail(e.into()),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        let error = LlmError::Api {
            status: status.as_u16(),
            message,
        };
        if retryable(status) {
            Attempt::Retry(error)
        } else {
            Attempt::Fail(error)
        }
    }

    /// One user turn. Rate limits, 5xx and connection failures are retried
    /// with doubling delays; the last error is returned once attempts run out.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut delay = self.base_backoff;
        let mut attempt = 1;
        loop {
            match self.attempt(&request).await {
                Attempt::Done(response) => {
                    debug!(
                        "LLM call ok: {} in / {} out tokens",
                        response.usage.input_tokens, response.usage.output_tokens
                    );
                    return Ok(response);
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) if attempt >= MAX_ATTEMPTS => return Err(e),
                Attempt::Retry(e) => {
                    warn!("LLM attempt {attempt}/{MAX_ATTEMPTS} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }

    /// Calls the model and deserializes its text answer as `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(strip_json_fences(text))?)
    }
}

/// Removes a surrounding ```json / ``` fence, if any.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = ["```json", "```"]
        .iter()
        .find_map(|fence| text.strip_prefix(fence))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Wraps `text` the way the Messages API returns a single text block.
    pub fn message_body(text: &str) -> String {
        serde_json::json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        })
        .to_string()
    }

    /// A client aimed at a mockito server, with no retry delay.
    pub fn client_for(server: &mockito::ServerGuard) -> LlmClient {
        let mut client = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_endpoint(format!("{}/v1/messages", server.url()));
        client.base_backoff = Duration::ZERO;
        client
    }
}
