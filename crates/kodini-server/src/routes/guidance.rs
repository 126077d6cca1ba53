use axum::extract::{Path, State};
use axum::Json;
use kodini_core::model::Guidance;
use kodini_core::KodiniError;

use super::{blocking, parse_id};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/tasks/{id}/guidance — stored guidance for a task.
pub async fn get_task_guidance(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Guidance>, AppError> {
    let task_id = parse_id(&task_id)?;
    let store = app.store.clone();
    let guidance = blocking(move || {
        store
            .guidance_for_task(task_id)?
            .ok_or_else(|| KodiniError::GuidanceNotFound(format!("task {task_id}")))
    })
    .await?;
    Ok(Json(guidance))
}

/// POST /api/tasks/{id}/guidance/generate — generate guidance, replacing any existing.
pub async fn generate_guidance(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Guidance>, AppError> {
    let task_id = parse_id(&task_id)?;
    let guidance = app.workflow().generate_and_create_guidance(task_id).await?;
    Ok(Json(guidance))
}

/// DELETE /api/guidance/{id}
pub async fn delete_guidance(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    blocking(move || store.delete_guidance(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
