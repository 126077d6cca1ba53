//! Core of kodini: prompt building, response validation, the orchestration
//! facade over a [`llm_client::GenerationClient`], and the project/story/task
//! store the generated results are projected into.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod orchestrator;
pub mod paths;
pub mod prompt;
pub mod store;
pub mod types;
pub mod validate;
pub mod workflow;

pub use error::{KodiniError, Result};
pub use orchestrator::Orchestrator;
pub use store::Store;
pub use types::Intent;
pub use workflow::Workflow;
