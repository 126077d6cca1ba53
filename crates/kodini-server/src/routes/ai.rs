use axum::extract::State;
use axum::Json;
use kodini_core::types::{
    GeneratedStoriesResult, GeneratedTasksResult, GuidanceResult, RefinedIdeasResult,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaBody {
    pub idea_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTasksBody {
    pub story_title: String,
    pub as_a: String,
    pub i_want_to: String,
    pub so_that: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateGuidanceBody {
    pub project_title: String,
    pub as_a: String,
    pub i_want_to: String,
    pub so_that: String,
    pub task_description: String,
}

/// POST /api/ai/refine-idea — three refined versions of an idea.
pub async fn refine_idea(
    State(app): State<AppState>,
    Json(body): Json<IdeaBody>,
) -> Result<Json<RefinedIdeasResult>, AppError> {
    let result = app.orchestrator.refine_idea(&body.idea_text).await?;
    Ok(Json(result))
}

/// POST /api/ai/suggest-variations — creative variations of an idea.
pub async fn suggest_variations(
    State(app): State<AppState>,
    Json(body): Json<IdeaBody>,
) -> Result<Json<RefinedIdeasResult>, AppError> {
    let result = app.orchestrator.suggest_variations(&body.idea_text).await?;
    Ok(Json(result))
}

/// POST /api/ai/generate-stories — user stories for an idea.
pub async fn generate_stories(
    State(app): State<AppState>,
    Json(body): Json<IdeaBody>,
) -> Result<Json<GeneratedStoriesResult>, AppError> {
    let result = app.orchestrator.generate_stories(&body.idea_text).await?;
    Ok(Json(result))
}

/// POST /api/ai/generate-tasks — development tasks for a user story.
pub async fn generate_tasks(
    State(app): State<AppState>,
    Json(body): Json<GenerateTasksBody>,
) -> Result<Json<GeneratedTasksResult>, AppError> {
    let result = app
        .orchestrator
        .generate_tasks(&body.story_title, &body.as_a, &body.i_want_to, &body.so_that)
        .await?;
    Ok(Json(result))
}

/// POST /api/ai/generate-guidance — step-by-step guidance for a task.
pub async fn generate_guidance(
    State(app): State<AppState>,
    Json(body): Json<GenerateGuidanceBody>,
) -> Result<Json<GuidanceResult>, AppError> {
    let result = app
        .orchestrator
        .generate_guidance(
            &body.project_title,
            &body.as_a,
            &body.i_want_to,
            &body.so_that,
            &body.task_description,
        )
        .await?;
    Ok(Json(result))
}
