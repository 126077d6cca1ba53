pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // AI facade
        .route("/api/ai/refine-idea", post(routes::ai::refine_idea))
        .route(
            "/api/ai/suggest-variations",
            post(routes::ai::suggest_variations),
        )
        .route("/api/ai/generate-stories", post(routes::ai::generate_stories))
        .route("/api/ai/generate-tasks", post(routes::ai::generate_tasks))
        .route(
            "/api/ai/generate-guidance",
            post(routes::ai::generate_guidance),
        )
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/refine",
            post(routes::projects::refine_project),
        )
        .route(
            "/api/projects/{id}/variations",
            post(routes::projects::suggest_project_variations),
        )
        .route(
            "/api/projects/{id}/apply-idea",
            post(routes::projects::apply_idea),
        )
        .route(
            "/api/projects/{id}/tasks",
            get(routes::projects::list_project_tasks),
        )
        // Stories
        .route(
            "/api/projects/{id}/stories",
            get(routes::stories::list_stories).post(routes::stories::create_story),
        )
        .route(
            "/api/projects/{id}/stories/generate",
            post(routes::stories::generate_stories),
        )
        .route(
            "/api/stories/{id}",
            get(routes::stories::get_story)
                .put(routes::stories::update_story)
                .delete(routes::stories::delete_story),
        )
        // Tasks
        .route(
            "/api/stories/{id}/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/stories/{id}/tasks/generate",
            post(routes::tasks::generate_tasks),
        )
        .route(
            "/api/tasks/{id}",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/api/tasks/{id}/complete", post(routes::tasks::complete_task))
        // Guidance
        .route(
            "/api/tasks/{id}/guidance",
            get(routes::guidance::get_task_guidance),
        )
        .route(
            "/api/tasks/{id}/guidance/generate",
            post(routes::guidance::generate_guidance),
        )
        .route(
            "/api/guidance/{id}",
            delete(routes::guidance::delete_guidance),
        )
        // Config
        .route("/api/config", get(routes::config::get_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the kodini API server on `port`.
pub async fn serve(app_state: AppState, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener, open_browser).await
}

/// Start the kodini API server on a pre-bound listener.
///
/// Lets the caller read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("kodini API listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/config");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
