pub mod ai;
pub mod config;
pub mod guidance;
pub mod projects;
pub mod stories;
pub mod tasks;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

pub const USER_HEADER: &str = "x-user-id";

/// The caller's opaque user id, taken from the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::unauthorized(format!("missing {USER_HEADER} header")))?;
        Ok(CurrentUser(user.to_string()))
    }
}

/// Parse a record id taken from the URL path.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Ok(kodini_core::model::parse_id(raw)?)
}

/// Run a store operation on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> kodini_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(result)
}
