use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// Message returned to callers when the provider cannot be reached.
pub const UPSTREAM_UNREACHABLE_MESSAGE: &str = "Upstream request failed";

/// One chat-completion call: a system/user prompt pair plus generation bounds
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Client for the chat-completion provider
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

// -- wire shapes of the chat-completion API

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
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

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// Sends one completion request and returns the trimmed, non-empty generated text.
    ///
    /// The send and the body read race `request.timeout`; when the timer wins the
    /// in-flight future is dropped, which aborts the connection.
    pub async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let body = ChatCompletionBody {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        info!(
            "Calling upstream model {} (max_tokens={}, timeout={}ms)",
            request.model,
            request.max_tokens,
            request.timeout.as_millis()
        );

        let exchange = async {
            let response = self
                .http
                .post(&self.url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        let (status, bytes) = match tokio::time::timeout(request.timeout, exchange).await {
            Err(_) => {
                warn!(
                    "Upstream did not answer within {}ms, abandoning request",
                    request.timeout.as_millis()
                );
                return Err(AppError::UpstreamTimeout);
            }
            Ok(Err(e)) if e.is_timeout() => return Err(AppError::UpstreamTimeout),
            Ok(Err(e)) => {
                error!("Upstream request failed: {}", e);
                return Err(AppError::Upstream(UPSTREAM_UNREACHABLE_MESSAGE.to_string()));
            }
            Ok(Ok(result)) => result,
        };

        info!("Received upstream response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_slice::<ProviderErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .and_then(|error| error.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("upstream HTTP {}", status.as_u16()));
            return Err(AppError::Upstream(message));
        }

        let completion: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Upstream(format!("invalid upstream response: {e}")))?;
        debug!("Upstream returned {} choice(s)", completion.choices.len());

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::Upstream("Empty response from upstream".to_string()))
    }
}
