use axum::extract::{Path, State};
use axum::Json;
use kodini_core::model::{Project, ProjectUpdate, Task};
use kodini_core::types::{RefinedIdea, RefinedIdeasResult};
use serde::Deserialize;

use super::{blocking, parse_id, CurrentUser};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProjectBody {
    pub title: String,
    pub idea_text: String,
}

/// GET /api/projects — the caller's projects, newest first.
pub async fn list_projects(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Project>>, AppError> {
    let store = app.store.clone();
    let projects = blocking(move || store.list_projects(&user)).await?;
    Ok(Json(projects))
}

/// POST /api/projects — create a project owned by the caller.
pub async fn create_project(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateProjectBody>,
) -> Result<Json<Project>, AppError> {
    let store = app.store.clone();
    let project =
        blocking(move || store.create_project(&user, &body.title, &body.idea_text)).await?;
    Ok(Json(project))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let project = blocking(move || store.get_project(id)).await?;
    Ok(Json(project))
}

/// PUT /api/projects/{id} — change title and/or idea text.
pub async fn update_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProjectUpdate>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let project = blocking(move || store.update_project(id, body)).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id} — delete with all stories, tasks, and guidance.
pub async fn delete_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    blocking(move || store.delete_project(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/projects/{id}/refine — refinements of the project's idea.
pub async fn refine_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RefinedIdeasResult>, AppError> {
    let id = parse_id(&id)?;
    let result = app.workflow().refine_project(id).await?;
    Ok(Json(result))
}

/// POST /api/projects/{id}/variations — variations of the project's idea.
pub async fn suggest_project_variations(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RefinedIdeasResult>, AppError> {
    let id = parse_id(&id)?;
    let result = app.workflow().suggest_project_variations(id).await?;
    Ok(Json(result))
}

/// POST /api/projects/{id}/apply-idea — adopt a refined idea as title and idea text.
pub async fn apply_idea(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(idea): Json<RefinedIdea>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id)?;
    let project = blocking(move || app.workflow().apply_idea(id, &idea)).await?;
    Ok(Json(project))
}

/// GET /api/projects/{id}/tasks — every task across the project's stories.
pub async fn list_project_tasks(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>, AppError> {
    let id = parse_id(&id)?;
    let store = app.store.clone();
    let tasks = blocking(move || store.list_tasks_by_project(id)).await?;
    Ok(Json(tasks))
}
