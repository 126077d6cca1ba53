use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use kodini_core::model::{Task, TaskDraft, TaskUpdate};
use serde::Deserialize;

use super::{blocking, parse_id};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CompleteTaskBody {
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

/// GET /api/stories/{id}/tasks — a story's tasks, oldest first.
pub async fn list_tasks(
    State(app): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<Vec<Task>>, AppError> {
    let story_id = parse_id(&story_id)?;
    let store = app.store.clone();
    let tasks = blocking(move || store.list_tasks(story_id)).await?;
    Ok(Json(tasks))
}

/// POST /api/stories/{id}/tasks — add a hand-written task.
pub async fn create_task(
    State(app): State<AppState>,
    Path(story_id): Path<String>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, AppError> {
    let story_id = parse_id(&story_id)?;
    let store = app.store.clone();
    let task = blocking(move || store.create_task(story_id, draft)).await?;
    Ok(Json(task))
}

/// POST /api/stories/{id}/tasks/generate — generate and store tasks for a story.
pub async fn generate_tasks(
    State(app): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<Vec<Task>>, AppError> {
    let story_id = parse_id(&story_id)?;
    let tasks = app.workflow().generate_and_create_tasks(story_id).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let task = blocking(move || store.get_task(id)).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let task = blocking(move || store.update_task(id, body)).await?;
    Ok(Json(task))
}

/// POST /api/tasks/{id}/complete — mark done, or pass `{"completed": false}` to reopen.
pub async fn complete_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let completed = if body.is_empty() {
        true
    } else {
        serde_json::from_slice::<CompleteTaskBody>(&body)
            .map_err(|e| AppError::bad_request(format!("invalid body: {e}")))?
            .completed
    };
    let store = app.store.clone();
    let task = blocking(move || store.set_task_completed(id, completed)).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id} — delete with its guidance.
pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    blocking(move || store.delete_task(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
