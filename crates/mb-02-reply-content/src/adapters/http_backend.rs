//! HTTP generation backend (the `monibot-ai` edge function).

use crate::domain::{GenerationContext, GenerationError};
use crate::ports::{GeneratedText, GenerationBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the edge function under a Supabase project URL.
pub const EDGE_FUNCTION_PATH: &str = "/functions/v1/monibot-ai";

/// Endpoint settings.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Full function URL.
    pub url: String,
    /// Anonymous key sent as bearer token.
    pub anon_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl HttpBackendConfig {
    /// Config with a 20s timeout.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            request_timeout: Duration::from_secs(20),
        }
    }

    /// Function URL derived from a Supabase project URL.
    pub fn function_url(project_url: &str) -> String {
        format!("{}{}", project_url.trim_end_matches('/'), EDGE_FUNCTION_PATH)
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    action: &'a str,
    context: &'a GenerationContext,
}

/// `GenerationBackend` over HTTP POST.
pub struct HttpGenerationBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl HttpGenerationBackend {
    /// Create a new backend client.
    pub fn new(config: HttpBackendConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(
        &self,
        action: &str,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.anon_key)
            .json(&GenerationRequest { action, context })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                "[mb-02] Generation backend returned an error"
            );
            return Err(GenerationError::from_status(status.as_u16(), &body));
        }

        let generated: GeneratedText = response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        debug!(
            fallback = generated.fallback,
            has_text = generated.text.is_some(),
            "[mb-02] Generation response received"
        );
        Ok(generated)
    }
}
