//! API Routes
//!
//! Configures the Axum router with all scheduler endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    execute_handler, get_config_handler, health_handler, save_config_handler, status_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /scheduler/config` - Persisted config plus live status
/// - `POST /scheduler/config` - Validate, persist, and apply a config change
/// - `GET /scheduler/status` - Status of every known task
/// - `POST /scheduler/execute/clear-all-backups` - Start a manual cleanup run
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/scheduler/config",
            get(get_config_handler).post(save_config_handler),
        )
        .route("/scheduler/status", get(status_handler))
        .route(
            "/scheduler/execute/clear-all-backups",
            post(execute_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::CleanupRunner;
    use crate::scheduler::{ConfigStore, Scheduler};
    use crate::users::FsUserDirectory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn create_test_app(dir: &tempfile::TempDir) -> Router {
        let store = ConfigStore::new(dir.path().join("config.yml"));
        let resolver = Arc::new(FsUserDirectory::new(dir.path().join("data")));
        let runner = Arc::new(CleanupRunner::new(resolver));
        let state = AppState::new(Arc::new(Scheduler::new(store, runner).await));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scheduler/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scheduler/config")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_save_config_invalid_expression_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scheduler/config")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"enabled":true,"cronExpression":"bogus"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
