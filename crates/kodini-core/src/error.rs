use thiserror::Error;

use crate::prompt::PromptError;
use crate::types::Intent;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum KodiniError {
    #[error("not initialized: run 'kodini init'")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("story not found: {0}")]
    StoryNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("guidance not found: {0}")]
    GuidanceNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid id '{0}': expected a UUID")]
    InvalidId(String),

    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    /// The provider call failed. Transport, auth, rate-limit, and timeout
    /// failures are deliberately not distinguished here.
    #[error("failed to {}: generation failed", .intent.verb())]
    Generation {
        intent: Intent,
        #[source]
        source: llm_client::LlmError,
    },

    /// The provider answered, but not with the shape this intent requires.
    #[error("failed to {}: {source}", .intent.verb())]
    Validation {
        intent: Intent,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl KodiniError {
    /// The intent whose generation or validation failed, if any.
    pub fn intent(&self) -> Option<Intent> {
        match self {
            KodiniError::Generation { intent, .. } | KodiniError::Validation { intent, .. } => {
                Some(*intent)
            }
            _ => None,
        }
    }

    /// Generic, user-presentable text for AI failures ("Failed to generate
    /// tasks. Please try again."). Never contains raw model output.
    pub fn user_message(&self) -> String {
        match self.intent() {
            Some(intent) => intent.failure_message(),
            None => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KodiniError>;
