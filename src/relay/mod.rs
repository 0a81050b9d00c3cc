pub mod astro;
pub mod oracle;
pub mod prompts;

use std::sync::Arc;

use crate::config::{EndpointSettings, UpstreamConfig};
use crate::error::AppResult;
use crate::upstream::{CompletionRequest, UpstreamClient};

/// Shared relay: the configuration read at startup plus one pooled upstream client.
///
/// Cheap to clone; handlers receive it as an axum `Extension`.
#[derive(Debug, Clone)]
pub struct Relay {
    config: Arc<UpstreamConfig>,
    client: UpstreamClient,
}

impl Relay {
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let client = UpstreamClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn completion(
        &self,
        settings: &EndpointSettings,
        explicit_model: Option<&str>,
        system: &str,
        user: String,
    ) -> CompletionRequest {
        CompletionRequest {
            system: system.to_string(),
            user,
            model: self.config.resolve_model(settings, explicit_model),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout,
        }
    }

    async fn send(&self, request: CompletionRequest) -> AppResult<String> {
        self.client.complete(&request).await
    }
}
