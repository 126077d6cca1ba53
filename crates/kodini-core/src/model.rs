use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{KodiniError, Result};
use crate::types::{
    CodeExample, GeneratedStory, GeneratedTask, GuidanceResult, GuidanceStep, RefinedIdea,
};

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(KodiniError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_some(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}

/// Parse a record id from user input.
pub fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).map_err(|_| KodiniError::InvalidId(s.to_string()))
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub idea_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: &str, title: &str, idea_text: &str) -> Result<Self> {
        require("user id", user_id)?;
        require("title", title)?;
        require("idea text", idea_text)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            idea_text: idea_text.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub idea_text: Option<String>,
}

/// A selected refinement becomes the project's title and idea text.
impl From<&RefinedIdea> for ProjectUpdate {
    fn from(idea: &RefinedIdea) -> Self {
        Self {
            title: Some(idea.title.clone()),
            idea_text: Some(idea.description.clone()),
        }
    }
}

impl ProjectUpdate {
    pub fn apply(self, project: &mut Project) -> Result<()> {
        require_some("title", &self.title)?;
        require_some("idea text", &self.idea_text)?;
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(idea_text) = self.idea_text {
            project.idea_text = idea_text;
        }
        project.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub as_a: String,
    pub i_want_to: String,
    pub so_that: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// "As a X, I want to Y, so that Z".
    pub fn sentence(&self) -> String {
        format!(
            "As a {}, I want to {}, so that {}",
            self.as_a, self.i_want_to, self.so_that
        )
    }
}

/// Fields for a new story, typed in or generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub title: String,
    pub as_a: String,
    pub i_want_to: String,
    pub so_that: String,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl StoryDraft {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("as a", &self.as_a)?;
        require("i want to", &self.i_want_to)?;
        require("so that", &self.so_that)
    }

    pub(crate) fn into_story(self, project_id: Uuid, created_at: DateTime<Utc>) -> Story {
        Story {
            id: Uuid::new_v4(),
            project_id,
            title: self.title,
            as_a: self.as_a,
            i_want_to: self.i_want_to,
            so_that: self.so_that,
            rationale: self.rationale,
            created_at,
            updated_at: created_at,
        }
    }
}

impl From<GeneratedStory> for StoryDraft {
    fn from(s: GeneratedStory) -> Self {
        Self {
            title: s.title,
            as_a: s.as_a,
            i_want_to: s.i_want_to,
            so_that: s.so_that,
            rationale: s.rationale,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub as_a: Option<String>,
    #[serde(default)]
    pub i_want_to: Option<String>,
    #[serde(default)]
    pub so_that: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl StoryUpdate {
    pub fn apply(self, story: &mut Story) -> Result<()> {
        require_some("title", &self.title)?;
        require_some("as a", &self.as_a)?;
        require_some("i want to", &self.i_want_to)?;
        require_some("so that", &self.so_that)?;
        if let Some(v) = self.title {
            story.title = v;
        }
        if let Some(v) = self.as_a {
            story.as_a = v;
        }
        if let Some(v) = self.i_want_to {
            story.i_want_to = v;
        }
        if let Some(v) = self.so_that {
            story.so_that = v;
        }
        if let Some(v) = self.rationale {
            story.rationale = Some(v).filter(|r| !r.trim().is_empty());
        }
        story.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub story_id: Uuid,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub description: String,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<()> {
        require("description", &self.description)
    }

    pub(crate) fn into_task(self, story_id: Uuid, created_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            story_id,
            description: self.description,
            rationale: self.rationale,
            is_completed: false,
            created_at,
            updated_at: created_at,
        }
    }
}

impl From<GeneratedTask> for TaskDraft {
    fn from(t: GeneratedTask) -> Self {
        Self {
            description: t.description,
            rationale: t.rationale,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl TaskUpdate {
    pub fn apply(self, task: &mut Task) -> Result<()> {
        require_some("description", &self.description)?;
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.rationale {
            task.rationale = Some(v).filter(|r| !r.trim().is_empty());
        }
        if let Some(done) = self.is_completed {
            task.is_completed = done;
        }
        task.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Guidance
// ---------------------------------------------------------------------------

/// Stored implementation guidance for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    pub id: Uuid,
    pub task_id: Uuid,
    pub steps: Vec<GuidanceStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_examples: Option<Vec<CodeExample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guidance {
    pub fn from_result(task_id: Uuid, result: GuidanceResult) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_id,
            steps: result.steps,
            code_examples: result.code_examples,
            summary: result.summary,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
