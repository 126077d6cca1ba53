use std::sync::Arc;

use async_trait::async_trait;

use crate::{GenerationParams, Result};

/// The one capability kodini consumes from an LLM provider.
///
/// Implementations perform exactly one provider call per invocation and
/// return the raw completion text. Network, auth, rate-limit, timeout, and
/// provider-side faults all surface as [`crate::LlmError`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        (**self).complete(prompt, params).await
    }
}
