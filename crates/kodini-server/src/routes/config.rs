use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config — effective configuration after environment overrides.
///
/// Only the name of the API key variable is part of the config, never the key.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let json = serde_json::to_value(app.config.as_ref())?;
    Ok(Json(json))
}
