pub mod config;
pub mod guidance;
pub mod idea;
pub mod init;
pub mod project;
pub mod story;
pub mod task;
pub mod ui;

use anyhow::Context;
use kodini_core::config::Config;
use kodini_core::{paths, Orchestrator, Store};
use llm_client::AzureOpenAiClient;
use std::future::Future;
use std::path::Path;

// ---------------------------------------------------------------------------
// Shared command plumbing
// ---------------------------------------------------------------------------

/// Open the project store. Requires `kodini init`.
pub fn open_store(root: &Path) -> anyhow::Result<Store> {
    Config::load(root)?;
    let path = paths::store_path(root);
    Store::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

/// Connect to the configured provider. Works without `kodini init` as long
/// as the endpoint and key come from the environment.
pub fn orchestrator(root: &Path) -> anyhow::Result<Orchestrator<AzureOpenAiClient>> {
    let mut config = Config::load_or_default(root)?;
    config.apply_env_overrides();
    let settings = config
        .llm
        .azure_settings()
        .context("AI generation is not configured")?;
    let client = AzureOpenAiClient::new(settings)?;
    Ok(Orchestrator::new(client, config.generation))
}

/// Drive an async core operation to completion on a fresh runtime.
pub fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(fut))
}
