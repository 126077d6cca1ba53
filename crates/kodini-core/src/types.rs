use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// A generation purpose. Each intent has its own prompt template, default
/// generation parameters, and result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RefineIdea,
    SuggestVariations,
    GenerateTasks,
    GenerateGuidance,
    GenerateStories,
}

impl Intent {
    pub fn all() -> &'static [Intent] {
        &[
            Intent::RefineIdea,
            Intent::SuggestVariations,
            Intent::GenerateTasks,
            Intent::GenerateGuidance,
            Intent::GenerateStories,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::RefineIdea => "refine_idea",
            Intent::SuggestVariations => "suggest_variations",
            Intent::GenerateTasks => "generate_tasks",
            Intent::GenerateGuidance => "generate_guidance",
            Intent::GenerateStories => "generate_stories",
        }
    }

    /// Lowercase verb phrase used in error messages ("refine idea").
    pub fn verb(self) -> &'static str {
        match self {
            Intent::RefineIdea => "refine idea",
            Intent::SuggestVariations => "suggest variations",
            Intent::GenerateTasks => "generate tasks",
            Intent::GenerateGuidance => "generate guidance",
            Intent::GenerateStories => "generate user stories",
        }
    }

    pub fn failure_message(self) -> String {
        format!("Failed to {}. Please try again.", self.verb())
    }

    pub fn is_valid(s: &str) -> bool {
        s.parse::<Intent>().is_ok()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = crate::error::KodiniError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refine_idea" => Ok(Intent::RefineIdea),
            "suggest_variations" => Ok(Intent::SuggestVariations),
            "generate_tasks" => Ok(Intent::GenerateTasks),
            "generate_guidance" => Ok(Intent::GenerateGuidance),
            "generate_stories" => Ok(Intent::GenerateStories),
            _ => Err(crate::error::KodiniError::UnknownIntent(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Idea refinement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedIdea {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Result of both `refine_idea` and `suggest_variations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedIdeasResult {
    pub ideas: Vec<RefinedIdea>,
}

// ---------------------------------------------------------------------------
// User stories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStory {
    pub title: String,
    pub as_a: String,
    pub i_want_to: String,
    pub so_that: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStoriesResult {
    pub stories: Vec<GeneratedStory>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTasksResult {
    pub tasks: Vec<GeneratedTask>,
}

// ---------------------------------------------------------------------------
// Guidance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceStep {
    pub step: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub title: String,
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceResult {
    pub steps: Vec<GuidanceStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_examples: Option<Vec<CodeExample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl GuidanceResult {
    /// Code examples, empty when the model omitted them.
    pub fn code_examples(&self) -> &[CodeExample] {
        self.code_examples.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
