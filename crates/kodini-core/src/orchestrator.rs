//! Orchestration facade: one operation per intent.
//!
//! Every call is strictly linear: build the prompt, make exactly one provider
//! call with the intent's parameters, then parse and validate the text. A
//! provider failure is returned immediately without touching the validator.
//! Nothing here retries, caches, or writes to storage.

use llm_client::{GenerationClient, GenerationParams};

use crate::config::GenerationConfig;
use crate::error::{KodiniError, Result};
use crate::prompt;
use crate::types::{
    GeneratedStoriesResult, GeneratedTasksResult, GuidanceResult, Intent, RefinedIdeasResult,
};
use crate::validate::{validate_and_parse, Contract};

/// Maximum characters of raw model output written to debug logs.
const MAX_LOGGED_RAW_CHARS: usize = 2000;

pub struct Orchestrator<C> {
    client: C,
    config: GenerationConfig,
}

impl<C: GenerationClient> Orchestrator<C> {
    pub fn new(client: C, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    /// Orchestrator using the built-in parameters for every intent.
    pub fn with_defaults(client: C) -> Self {
        Self::new(client, GenerationConfig::default())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn params_for(&self, intent: Intent) -> GenerationParams {
        self.config.params_for(intent)
    }

    pub async fn refine_idea(&self, idea_text: &str) -> Result<RefinedIdeasResult> {
        let prompt = prompt::refine_idea_prompt(idea_text)?;
        self.run(Intent::RefineIdea, &prompt).await
    }

    pub async fn suggest_variations(&self, idea_text: &str) -> Result<RefinedIdeasResult> {
        let prompt = prompt::suggest_variations_prompt(idea_text)?;
        self.run(Intent::SuggestVariations, &prompt).await
    }

    pub async fn generate_tasks(
        &self,
        story_title: &str,
        as_a: &str,
        i_want_to: &str,
        so_that: &str,
    ) -> Result<GeneratedTasksResult> {
        let prompt = prompt::generate_tasks_prompt(story_title, as_a, i_want_to, so_that)?;
        self.run(Intent::GenerateTasks, &prompt).await
    }

    pub async fn generate_guidance(
        &self,
        project_title: &str,
        as_a: &str,
        i_want_to: &str,
        so_that: &str,
        task_description: &str,
    ) -> Result<GuidanceResult> {
        let prompt = prompt::generate_guidance_prompt(
            project_title,
            as_a,
            i_want_to,
            so_that,
            task_description,
        )?;
        self.run(Intent::GenerateGuidance, &prompt).await
    }

    pub async fn generate_stories(&self, idea_text: &str) -> Result<GeneratedStoriesResult> {
        let prompt = prompt::generate_stories_prompt(idea_text)?;
        self.run(Intent::GenerateStories, &prompt).await
    }

    async fn run<T: Contract>(&self, intent: Intent, prompt: &str) -> Result<T> {
        let params = self.config.params_for(intent);
        tracing::info!(
            intent = %intent,
            model = %params.model,
            prompt_chars = prompt.len(),
            "requesting generation"
        );

        let raw = match self.client.complete(prompt, &params).await {
            Ok(raw) => raw,
            Err(source) => {
                tracing::error!(intent = %intent, error = %source, "generation failed");
                return Err(KodiniError::Generation { intent, source });
            }
        };
        tracing::debug!(
            intent = %intent,
            raw = %truncate_for_log(&raw),
            "model response"
        );

        validate_and_parse::<T>(&raw).map_err(|source| {
            tracing::warn!(
                intent = %intent,
                kind = %source.kind(),
                path = source.path().unwrap_or("$"),
                error = %source,
                "model response failed validation"
            );
            KodiniError::Validation { intent, source }
        })
    }
}

fn truncate_for_log(s: &str) -> String {
    match s.char_indices().nth(MAX_LOGGED_RAW_CHARS) {
        Some((idx, _)) => format!("{}… [{} chars total]", &s[..idx], s.chars().count()),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
