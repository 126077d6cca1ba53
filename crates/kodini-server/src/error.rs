use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kodini_core::KodiniError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 401 errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 401 through the `anyhow::Error` chain.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(KodiniError::InvalidInput(msg.into()).into())
    }

    /// Construct a 401 Unauthorized error.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(u) = self.0.downcast_ref::<UnauthorizedError>() {
            let body = serde_json::json!({ "error": u.0.clone() });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }

        let Some(e) = self.0.downcast_ref::<KodiniError>() else {
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        // AI failures get the generic per-intent message; raw model output
        // and provider details stay in the logs.
        if let Some(intent) = e.intent() {
            let kind = match e {
                KodiniError::Validation { source, .. } => source.kind().as_str(),
                _ => "generation",
            };
            let body = serde_json::json!({
                "error": e.user_message(),
                "intent": intent.as_str(),
                "kind": kind,
            });
            return (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response();
        }

        let status = match e {
            KodiniError::NotInitialized => StatusCode::BAD_REQUEST,
            KodiniError::ProjectNotFound(_)
            | KodiniError::StoryNotFound(_)
            | KodiniError::TaskNotFound(_)
            | KodiniError::GuidanceNotFound(_) => StatusCode::NOT_FOUND,
            KodiniError::InvalidInput(_)
            | KodiniError::InvalidId(_)
            | KodiniError::UnknownIntent(_) => StatusCode::BAD_REQUEST,
            KodiniError::Generation { .. } | KodiniError::Validation { .. } => {
                StatusCode::BAD_GATEWAY
            }
            KodiniError::Prompt(_)
            | KodiniError::Config(_)
            | KodiniError::Store(_)
            | KodiniError::Io(_)
            | KodiniError::Yaml(_)
            | KodiniError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": e.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use kodini_core::Intent;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn project_not_found_maps_to_404() {
        let err = AppError(KodiniError::ProjectNotFound("p".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn guidance_not_found_maps_to_404() {
        let err = AppError(KodiniError::GuidanceNotFound("g".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_id_maps_to_400() {
        let err = AppError(KodiniError::InvalidId("nope".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("title must not be empty");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_constructor_maps_to_401() {
        let err = AppError::unauthorized("missing x-user-id header");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn store_error_maps_to_500() {
        let err = AppError(KodiniError::Store("disk full".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_kodini_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn generation_failure_maps_to_502_with_generic_message() {
        let err = AppError(
            KodiniError::Generation {
                intent: Intent::GenerateGuidance,
                source: llm_client::LlmError::Status {
                    status: 401,
                    body: "bad key abc123".into(),
                },
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to generate guidance. Please try again.");
        assert_eq!(json["kind"], "generation");
        assert!(!json.to_string().contains("abc123"));
    }

    #[tokio::test]
    async fn validation_failure_reports_kind() {
        let source = kodini_core::validate::validate_and_parse::<
            kodini_core::types::GeneratedTasksResult,
        >("not json")
        .unwrap_err();
        let err = AppError(
            KodiniError::Validation {
                intent: Intent::GenerateTasks,
                source,
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "malformed");
        assert_eq!(json["intent"], "generate_tasks");
    }
}
