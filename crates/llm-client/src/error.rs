use thiserror::Error;

/// Failure of a single provider call.
///
/// The variants exist for logs and diagnostics; callers of the orchestration
/// layer only ever see "generation failed".
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected provider response: {0}")]
    Response(String),

    #[error("client configuration error: {0}")]
    Config(String),

    #[error("scripted failure: {0}")]
    Scripted(String),
}

impl LlmError {
    /// `true` when the provider rejected the call for rate limiting (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::Status { status: 429, .. })
    }
}
