use crate::error::{KodiniError, Result};
use crate::paths;
use crate::types::Intent;
use llm_client::{AzureSettings, GenerationParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const API_VERSION_ENV: &str = "AZURE_OPENAI_API_VERSION";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Per-intent defaults
// ---------------------------------------------------------------------------

pub const SMALL_MODEL: &str = "kodini-dev-gpt-35-turbo";
pub const LARGE_MODEL: &str = "kodini-dev-gpt-4o";

/// Built-in generation parameters for an intent.
pub fn default_params(intent: Intent) -> GenerationParams {
    match intent {
        Intent::RefineIdea => GenerationParams::new(SMALL_MODEL, 0.7, 1000),
        Intent::SuggestVariations => GenerationParams::new(SMALL_MODEL, 0.8, 1000),
        Intent::GenerateTasks => GenerationParams::new(SMALL_MODEL, 0.7, 1000),
        Intent::GenerateGuidance => GenerationParams::new(LARGE_MODEL, 0.7, 2500),
        Intent::GenerateStories => GenerationParams::new(SMALL_MODEL, 0.7, 1500),
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Provider connection. The API key itself is never stored; only the name of
/// the environment variable holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_version() -> String {
    llm_client::DEFAULT_API_VERSION.to_string()
}

fn default_api_key_env() -> String {
    "AZURE_OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_version: default_api_version(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Build client settings, reading the API key from `api_key_env`.
    pub fn azure_settings(&self) -> Result<AzureSettings> {
        self.azure_settings_with(|name| std::env::var(name).ok())
    }

    pub fn azure_settings_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<AzureSettings> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                KodiniError::Config(format!(
                    "no LLM endpoint configured: set llm.endpoint or {ENDPOINT_ENV}"
                ))
            })?;
        let api_key = lookup(&self.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                KodiniError::Config(format!(
                    "{} environment variable not set",
                    self.api_key_env
                ))
            })?;

        let mut settings = AzureSettings::new(endpoint, api_key);
        settings.api_version = self.api_version.clone();
        settings.timeout_secs = self.timeout_secs;
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Partial override of an intent's built-in parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Keyed by intent name (`generate_guidance`, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub intents: HashMap<String, IntentOverride>,
}

impl GenerationConfig {
    pub fn params_for(&self, intent: Intent) -> GenerationParams {
        let mut params = default_params(intent);
        if let Some(o) = self.intents.get(intent.as_str()) {
            if let Some(model) = &o.model {
                params.model = model.clone();
            }
            if let Some(t) = o.temperature {
                params.temperature = t;
            }
            if let Some(n) = o.max_output_tokens {
                params.max_output_tokens = n;
            }
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            llm: LlmConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let data = crate::io::read_optional(&paths::config_path(root))?
            .ok_or(KodiniError::NotInitialized)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(KodiniError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Apply `AZURE_OPENAI_ENDPOINT` and `AZURE_OPENAI_API_VERSION`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.llm.endpoint = Some(endpoint);
        }
        if let Some(version) = lookup(API_VERSION_ENV).filter(|v| !v.trim().is_empty()) {
            self.llm.api_version = version;
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        match self.llm.endpoint.as_deref().map(str::trim) {
            None | Some("") => warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("llm.endpoint is not set; {ENDPOINT_ENV} must be provided"),
            }),
            Some(e) if !e.starts_with("http://") && !e.starts_with("https://") => {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("llm.endpoint '{e}' is not an http(s) URL"),
                })
            }
            Some(_) => {}
        }

        if self.llm.api_key_env.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "llm.api_key_env is empty".to_string(),
            });
        }
        if self.llm.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "llm.timeout_secs must be greater than 0".to_string(),
            });
        }

        let mut keys: Vec<&String> = self.generation.intents.keys().collect();
        keys.sort();
        for key in keys {
            if !Intent::is_valid(key) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown intent '{key}' in generation.intents"),
                });
                continue;
            }
            let o = &self.generation.intents[key];
            if let Some(model) = &o.model {
                if model.trim().is_empty() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("generation.intents.{key}.model is empty"),
                    });
                }
            }
            if let Some(t) = o.temperature {
                if !(0.0..=2.0).contains(&t) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "generation.intents.{key}.temperature={t} is outside 0.0-2.0"
                        ),
                    });
                }
            }
            if o.max_output_tokens == Some(0) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("generation.intents.{key}.max_output_tokens must be > 0"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
