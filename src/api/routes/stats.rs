use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::compute_stats;
use crate::models::StatsReport;
use crate::source::{load_matches, load_runs, resolve_benchmark};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Request token the report was published under
    pub request: u64,
    /// Artifacts dropped because they failed to load
    pub failed_artifacts: usize,
    /// Run-list lines dropped because they failed to parse
    pub skipped_runs: usize,
    pub report: Arc<StatsReport>,
}

/// Recompute stats for a benchmark and publish them as the latest report.
pub async fn compute(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let token = state.stats.begin();

    let source = state.source.as_ref();
    let benchmark = resolve_benchmark(source, Some(&id)).await?;
    let list = load_runs(source, &benchmark).await?;
    let loaded = load_matches(
        state.source.clone(),
        &benchmark,
        &list.runs,
        state.fetch_concurrency,
    )
    .await;

    let report = compute_stats(&loaded.matches).with_benchmark(&benchmark.benchmark_id);
    let report = Arc::new(report);

    if state.stats.publish(token, report.clone()).await.is_err() {
        info!("Stats request {} for {} superseded", token.value(), id);
        return Err(ApiError::Superseded);
    }

    Ok(Json(StatsResponse {
        request: token.value(),
        failed_artifacts: loaded.failed,
        skipped_runs: list.skipped,
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct LatestStatsResponse {
    pub request: u64,
    pub report: Arc<StatsReport>,
}

/// The most recently published report.
pub async fn latest(State(state): State<AppState>) -> Result<Json<LatestStatsResponse>, ApiError> {
    let published = state
        .stats
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No stats computed yet".to_string()))?;

    Ok(Json(LatestStatsResponse {
        request: published.token.value(),
        report: published.value,
    }))
}
