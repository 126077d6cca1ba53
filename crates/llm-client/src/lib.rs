//! `llm-client` — the completion capability kodini needs from an LLM provider.
//!
//! Everything above this crate sees a single operation: given a prompt and
//! generation parameters, return the completion text. Transport details
//! (endpoints, headers, wire format) stay behind [`GenerationClient`].
//!
//! # Architecture
//!
//! ```text
//! GenerationParams + prompt
//!     │
//!     ▼
//! GenerationClient   ← trait, object-safe (Arc<dyn GenerationClient>)
//!     │
//!     ├── AzureOpenAiClient   ← one POST to chat/completions per call
//!     └── ScriptedClient      ← queued responses for tests and offline runs
//!     │
//!     ▼
//! String             ← raw completion text, unvalidated
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use llm_client::{AzureOpenAiClient, AzureSettings, GenerationClient, GenerationParams};
//!
//! let settings = AzureSettings::new("https://my-resource.openai.azure.com", api_key);
//! let client = AzureOpenAiClient::new(settings)?;
//! let params = GenerationParams::new("kodini-dev-gpt-4o", 0.7, 2500);
//! let text = client.complete("Say hello as JSON.", &params).await?;
//! ```
//!
//! There is deliberately no retry, backoff, or caching here: a failed
//! attempt is a failed call, and the caller decides what to do with it.

pub mod azure;
pub mod client;
pub mod error;
pub mod scripted;
pub mod types;

pub use azure::{AzureOpenAiClient, AzureSettings, DEFAULT_API_VERSION};
pub use client::GenerationClient;
pub use error::LlmError;
pub use scripted::{RecordedCall, ScriptedClient};
pub use types::GenerationParams;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, LlmError>;
