use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::GenerationClient;
use crate::{GenerationParams, LlmError, Result};

/// One call observed by a [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub params: GenerationParams,
}

/// A [`GenerationClient`] that replays queued outcomes in order.
///
/// Used wherever a real provider is unwanted: unit tests, server and CLI
/// integration tests. Every call is recorded so tests can assert on the
/// prompt and parameters that reached the "provider". Calling it with an
/// empty queue is a failure, not a panic.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    queue: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose first call returns `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        let client = Self::new();
        client.push_response(text);
        client
    }

    /// Client whose first call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let client = Self::new();
        client.push_failure(reason);
        client
    }

    pub fn push_response(&self, text: impl Into<String>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Ok(text.into()));
        }
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Err(reason.into()));
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                params: params.clone(),
            });
        }

        let next = self
            .queue
            .lock()
            .map_err(|_| LlmError::Scripted("script queue poisoned".into()))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(LlmError::Scripted(reason)),
            None => Err(LlmError::Scripted("no scripted response left".into())),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn params() -> GenerationParams {
        GenerationParams::new("m", 0.7, 1000)
    }

    #[tokio::test]
    async fn replays_responses_in_order() {
        let client = ScriptedClient::new();
        client.push_response("first");
        client.push_response("second");

        assert_eq!(client.complete("a", &params()).await.unwrap(), "first");
        assert_eq!(client.complete("b", &params()).await.unwrap(), "second");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn failure_is_returned_as_error() {
        let client = ScriptedClient::failing("provider down");
        let err = client.complete("a", &params()).await.unwrap_err();
        assert!(err.to_string().contains("provider down"));
    }

    #[tokio::test]
    async fn empty_queue_fails_instead_of_panicking() {
        let client = ScriptedClient::new();
        assert!(client.complete("a", &params()).await.is_err());
    }

    #[tokio::test]
    async fn records_prompt_and_params() {
        let client = ScriptedClient::replying("ok");
        client.complete("the prompt", &params()).await.unwrap();
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "the prompt");
        assert_eq!(calls[0].params, params());
    }

    #[tokio::test]
    async fn usable_behind_arc_dyn() {
        let client: Arc<dyn GenerationClient> = Arc::new(ScriptedClient::replying("ok"));
        assert_eq!(client.complete("x", &params()).await.unwrap(), "ok");
    }
}
