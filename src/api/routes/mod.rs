pub mod benchmarks;
pub mod runs;
pub mod stats;

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{fixture_app, get_json};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (_tmp, state) = fixture_app();
        let (status, json) = get_json(state, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_api_path() {
        let (_tmp, state) = fixture_app();
        let (status, _) = get_json(state, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
