use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use kodini_core::config::Config;
use kodini_core::{Orchestrator, Store, Workflow};
use llm_client::{AzureOpenAiClient, GenerationClient, GenerationParams, LlmError};

/// The provider handle shared by every request.
pub type SharedClient = Arc<dyn GenerationClient>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub orchestrator: Arc<Orchestrator<SharedClient>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Store, client: SharedClient, config: Config) -> Self {
        let orchestrator = Orchestrator::new(client, config.generation.clone());
        Self {
            store: Arc::new(store),
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }

    /// Open the project store under `root` and connect to the configured
    /// provider. A missing endpoint or key does not prevent startup: CRUD
    /// keeps working and every generation call fails with the reason.
    pub fn from_root(root: &Path) -> anyhow::Result<Self> {
        let mut config = Config::load_or_default(root)?;
        config.apply_env_overrides();
        let store = Store::open(&kodini_core::paths::store_path(root))?;

        let client: SharedClient = match config
            .llm
            .azure_settings()
            .map_err(anyhow::Error::from)
            .and_then(|s| AzureOpenAiClient::new(s).map_err(anyhow::Error::from))
        {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!("AI generation unavailable: {e}");
                Arc::new(UnconfiguredClient(e.to_string()))
            }
        };

        Ok(Self::new(store, client, config))
    }

    pub fn workflow(&self) -> Workflow<'_, SharedClient> {
        Workflow::new(&self.store, &self.orchestrator)
    }
}

/// Stands in for the provider when no endpoint or key is configured.
struct UnconfiguredClient(String);

#[async_trait]
impl GenerationClient for UnconfiguredClient {
    async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> llm_client::Result<String> {
        Err(LlmError::Config(self.0.clone()))
    }
}
