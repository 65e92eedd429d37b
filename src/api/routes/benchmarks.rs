use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{BenchmarkEntry, BenchmarkMeta};
use crate::source::{load_index, load_leaderboard, load_meta, resolve_benchmark};
use crate::view::{format_date, LeaderboardView};

#[derive(Debug, Serialize)]
pub struct BenchmarksResponse {
    pub benchmarks: Vec<BenchmarkEntry>,
}

pub async fn list_benchmarks(
    State(state): State<AppState>,
) -> Result<Json<BenchmarksResponse>, ApiError> {
    let index = load_index(state.source.as_ref()).await?;
    Ok(Json(BenchmarksResponse {
        benchmarks: index.benchmarks,
    }))
}

#[derive(Debug, Serialize)]
pub struct BenchmarkResponse {
    pub benchmark: BenchmarkEntry,
    pub meta: BenchmarkMeta,
    /// `generated_at` formatted for display
    pub generated: String,
}

pub async fn get_benchmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BenchmarkResponse>, ApiError> {
    let source = state.source.as_ref();
    let benchmark = resolve_benchmark(source, Some(&id)).await?;
    let meta = load_meta(source, &benchmark).await?;

    Ok(Json(BenchmarkResponse {
        generated: format_date(meta.generated_at.as_deref()),
        benchmark,
        meta,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub set: Option<String>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardView>, ApiError> {
    let source = state.source.as_ref();
    let benchmark = resolve_benchmark(source, Some(&id)).await?;
    let leaderboard = load_leaderboard(source, &benchmark).await?;

    Ok(Json(LeaderboardView::select(
        &leaderboard,
        params.set.as_deref(),
    )))
}
