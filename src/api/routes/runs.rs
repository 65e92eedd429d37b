use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::source::{find_run, load_artifact, load_runs, resolve_benchmark};
use crate::view::{page_runs, Pagination, RunDetail, RunSummary, RunsPage};

#[derive(Debug, Deserialize)]
pub struct RunsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    #[serde(flatten)]
    pub page: RunsPage,
    /// Lines of `runs.jsonl` that could not be parsed
    pub skipped_lines: usize,
}

pub async fn list_runs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RunsParams>,
) -> Result<Json<RunsResponse>, ApiError> {
    let source = state.source.as_ref();
    let benchmark = resolve_benchmark(source, Some(&id)).await?;
    let list = load_runs(source, &benchmark).await?;

    let pagination = Pagination::new(
        params.page,
        Some(params.page_size.unwrap_or(state.default_page_size)),
    );
    let search = params.search.unwrap_or_default();

    Ok(Json(RunsResponse {
        page: page_runs(&list.runs, &search, &pagination),
        skipped_lines: list.skipped,
    }))
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run: RunSummary,
    pub detail: RunDetail,
}

pub async fn get_run(
    State(state): State<AppState>,
    Path((id, run_id)): Path<(String, String)>,
) -> Result<Json<RunResponse>, ApiError> {
    let source = state.source.as_ref();
    let benchmark = resolve_benchmark(source, Some(&id)).await?;
    let runs = load_runs(source, &benchmark).await?.runs;
    let run = find_run(&runs, &run_id)?;
    let record = load_artifact(source, &benchmark, run).await?;

    Ok(Json(RunResponse {
        run: RunSummary::from(run),
        detail: RunDetail::from(&record),
    }))
}
