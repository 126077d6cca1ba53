use axum::extract::{Path, State};
use axum::Json;
use kodini_core::model::{Story, StoryDraft, StoryUpdate};

use super::{blocking, parse_id};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/projects/{id}/stories — a project's stories, oldest first.
pub async fn list_stories(
    State(app): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Story>>, AppError> {
    let project_id = parse_id(&project_id)?;
    let store = app.store.clone();
    let stories = blocking(move || store.list_stories(project_id)).await?;
    Ok(Json(stories))
}

/// POST /api/projects/{id}/stories — add a hand-written story.
pub async fn create_story(
    State(app): State<AppState>,
    Path(project_id): Path<String>,
    Json(draft): Json<StoryDraft>,
) -> Result<Json<Story>, AppError> {
    let project_id = parse_id(&project_id)?;
    let store = app.store.clone();
    let story = blocking(move || store.create_story(project_id, draft)).await?;
    Ok(Json(story))
}

/// POST /api/projects/{id}/stories/generate — generate and store user stories.
pub async fn generate_stories(
    State(app): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Story>>, AppError> {
    let project_id = parse_id(&project_id)?;
    let stories = app.workflow().generate_and_create_stories(project_id).await?;
    Ok(Json(stories))
}

/// GET /api/stories/{id}
pub async fn get_story(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Story>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let story = blocking(move || store.get_story(id)).await?;
    Ok(Json(story))
}

/// PUT /api/stories/{id}
pub async fn update_story(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StoryUpdate>,
) -> Result<Json<Story>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let story = blocking(move || store.update_story(id, body)).await?;
    Ok(Json(story))
}

/// DELETE /api/stories/{id} — delete with its tasks and their guidance.
pub async fn delete_story(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    blocking(move || store.delete_story(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
