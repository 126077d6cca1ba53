use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::client::GenerationClient;
use crate::types::{ChatRequest, ChatResponse, GenerationParams};
use crate::{LlmError, Result};

pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const API_KEY_HEADER: &str = "api-key";
const MAX_ERROR_BODY_CHARS: usize = 500;

// ─── AzureSettings ────────────────────────────────────────────────────────

/// Connection settings for an Azure OpenAI resource.
#[derive(Clone)]
pub struct AzureSettings {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AzureSettings {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ─── AzureOpenAiClient ────────────────────────────────────────────────────

/// [`GenerationClient`] backed by the Azure OpenAI chat completions API.
///
/// `GenerationParams::model` selects the deployment. Each call is a single
/// request; failures are returned as-is with no retry.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    settings: AzureSettings,
    http: Client,
}

impl AzureOpenAiClient {
    pub fn new(settings: AzureSettings) -> Result<Self> {
        if settings.endpoint.trim().is_empty() {
            return Err(LlmError::Config("endpoint is empty".into()));
        }
        if !settings.endpoint.starts_with("http://") && !settings.endpoint.starts_with("https://")
        {
            return Err(LlmError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                settings.endpoint
            )));
        }
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::Config("api key is empty".into()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &AzureSettings {
        &self.settings
    }

    /// Deployment names are percent-encoded as a single path segment.
    fn completions_url(&self, deployment: &str) -> Result<Url> {
        let mut url = Url::parse(self.settings.endpoint.trim_end_matches('/'))
            .map_err(|e| LlmError::Config(format!("invalid endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LlmError::Config("endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment, "chat", "completions"]);
        Ok(url)
    }
}

#[async_trait]
impl GenerationClient for AzureOpenAiClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let url = self.completions_url(&params.model)?;
        tracing::debug!(
            deployment = %params.model,
            temperature = params.temperature,
            max_tokens = params.max_output_tokens,
            prompt_chars = prompt.len(),
            "sending chat completion request"
        );

        let response = self
            .http
            .post(url)
            .query(&[("api-version", self.settings.api_version.as_str())])
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&ChatRequest::single_turn(prompt, params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("failed to parse response body: {e}")))?;

        match body.first_text() {
            Some(text) => Ok(text.to_string()),
            None => Err(LlmError::Response(format!(
                "no completion text (finish_reason: {})",
                body.finish_reason().unwrap_or("none")
            ))),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
