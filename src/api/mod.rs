//! REST API endpoints.
//!
//! Axum-based HTTP API serving benchmark metadata, leaderboards, runs and
//! derived match statistics.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::fetch::FetchError;
use crate::source::SourceError;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Superseded => (StatusCode::CONFLICT, "SUPERSEDED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match &err {
            SourceError::BenchmarkNotFound(_)
            | SourceError::NoBenchmarks
            | SourceError::RunNotFound(_)
            | SourceError::MissingArtifact(_)
            | SourceError::Storage(StorageError::PathNotFound(_)) => {
                ApiError::NotFound(err.to_string())
            }
            SourceError::Fetch(FetchError::HttpStatus { status: 404, .. }) => {
                ApiError::NotFound(err.to_string())
            }
            SourceError::Storage(StorageError::InvalidPath(_)) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/benchmarks", get(routes::benchmarks::list_benchmarks))
        .route("/api/benchmarks/:id", get(routes::benchmarks::get_benchmark))
        .route(
            "/api/benchmarks/:id/leaderboard",
            get(routes::benchmarks::get_leaderboard),
        )
        .route("/api/benchmarks/:id/runs", get(routes::runs::list_runs))
        .route(
            "/api/benchmarks/:id/runs/:run_id",
            get(routes::runs::get_run),
        )
        .route("/api/benchmarks/:id/stats", get(routes::stats::compute))
        .route("/api/stats/latest", get(routes::stats::latest));

    let router = match &state.static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.cors_origin))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::path::PathBuf;
    use tower::util::ServiceExt;

    #[test]
    fn test_source_error_mapping() {
        let err: ApiError = SourceError::RunNotFound("r9".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError =
            SourceError::Storage(StorageError::PathNotFound(PathBuf::from("x"))).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = SourceError::Storage(StorageError::InvalidPath("..".into())).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = SourceError::Fetch(FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
        .into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_superseded_response() {
        let resp = ApiError::Superseded.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "SUPERSEDED");
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("index.html"), "<h1>benchboard</h1>").unwrap();

        let mut state = AppState::for_tests(tmp.path());
        state.static_dir = Some(tmp.path().to_path_buf());
        let app = build_router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
