//! Dashboard view state and presentation shapes.
//!
//! [`ViewState`] holds what the user is looking at (benchmark, runs page,
//! search). The functions here turn loaded data into serializable shapes
//! shared by the API and the CLI; none of them do I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Leaderboard, LeaderboardEntry, MatchRecord, RunRecord};

/// Default runs per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Format an ISO-8601 timestamp for display.
///
/// Absent values show as "-"; unparseable ones are returned unchanged.
pub fn format_date(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => "-".to_string(),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt
                .with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            Err(_) => raw.to_string(),
        },
    }
}

/// Pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn total_pages(&self, total_items: usize) -> u32 {
        let pages = (total_items as u32).div_ceil(self.page_size);
        pages.max(1)
    }

    /// Same size, page pulled back onto the last page when past the end.
    pub fn clamped(&self, total_items: usize) -> Self {
        Self {
            page: self.page.min(self.total_pages(total_items)),
            page_size: self.page_size,
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: usize) -> Self {
        let total_pages = pagination.total_pages(total_items);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items: total_items as u32,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }

    /// "N runs"
    pub fn count_label(&self) -> String {
        format!("{} runs", self.total_items)
    }

    /// "Page X of Y"
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// One row of the runs list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub title: String,
    pub match_type: String,
    pub status: String,
    pub created: String,
    pub artifacts_ref: Option<String>,
}

impl From<&RunRecord> for RunSummary {
    fn from(run: &RunRecord) -> Self {
        Self {
            run_id: run.run_id.clone(),
            title: run.title(),
            match_type: run.match_type_label(),
            status: run.status_label().to_string(),
            created: format_date(run.created_at.as_deref()),
            artifacts_ref: run.artifact_path().map(str::to_string),
        }
    }
}

/// A page of the filtered runs list.
#[derive(Debug, Clone, Serialize)]
pub struct RunsPage {
    pub runs: Vec<RunSummary>,
    pub pagination: PaginationMeta,
    pub count_label: String,
    pub page_label: String,
}

/// Filter `runs` by `search`, then cut out one page.
pub fn page_runs(runs: &[RunRecord], search: &str, pagination: &Pagination) -> RunsPage {
    let filtered: Vec<&RunRecord> = runs.iter().filter(|r| r.matches_search(search)).collect();
    let pagination = pagination.clamped(filtered.len());
    let meta = PaginationMeta::new(&pagination, filtered.len());

    let runs = filtered
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.page_size as usize)
        .map(RunSummary::from)
        .collect();

    RunsPage {
        runs,
        count_label: meta.count_label(),
        page_label: meta.page_label(),
        pagination: meta,
    }
}

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub benchmark_id: Option<String>,
    pub pagination: Pagination,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: u32) -> Self {
        Self {
            benchmark_id: None,
            pagination: Pagination::new(None, Some(page_size)),
            search: String::new(),
        }
    }

    /// Switching benchmark starts over at page 1.
    pub fn select_benchmark(&mut self, benchmark_id: impl Into<String>) {
        self.benchmark_id = Some(benchmark_id.into());
        self.pagination.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.pagination.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.pagination = Pagination::new(Some(1), Some(page_size));
    }

    pub fn prev_page(&mut self) {
        self.pagination.page = self.pagination.page.saturating_sub(1).max(1);
    }

    /// Advance one page; the next [`ViewState::page`] call clamps overshoot.
    pub fn next_page(&mut self) {
        self.pagination.page = self.pagination.page.saturating_add(1);
    }

    /// Render the current page and pull the stored page back in range.
    pub fn page(&mut self, runs: &[RunRecord]) -> RunsPage {
        let page = page_runs(runs, &self.search, &self.pagination);
        self.pagination.page = page.pagination.page;
        page
    }
}

/// Summary of one run's match artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDetail {
    pub matchup: String,
    pub status: String,
    pub winner: String,
    pub rounds: usize,
    pub created: String,
    pub completed: String,
}

impl From<&MatchRecord> for RunDetail {
    fn from(record: &MatchRecord) -> Self {
        Self {
            matchup: record.pairing_label(),
            status: record.status.clone().unwrap_or_else(|| "-".to_string()),
            winner: record.winner_label(),
            rounds: record.rounds.len(),
            created: format_date(record.created_at.as_deref()),
            completed: format_date(record.completed_at.as_deref()),
        }
    }
}

/// The leaderboard set being shown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LeaderboardView {
    /// The benchmark publishes no sets
    NoData,
    /// The selected set is empty
    NoEntries { set_id: String, tabs: Vec<LeaderboardTab> },
    Table {
        set_id: String,
        tabs: Vec<LeaderboardTab>,
        entries: Vec<LeaderboardEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardTab {
    pub id: String,
    pub label: String,
    pub active: bool,
}

impl LeaderboardView {
    pub fn select(leaderboard: &Leaderboard, set_id: Option<&str>) -> Self {
        let Some(active) = leaderboard.select(set_id) else {
            return Self::NoData;
        };
        let tabs = leaderboard
            .sets
            .iter()
            .map(|set| LeaderboardTab {
                id: set.id.clone(),
                label: set.tab_label().to_string(),
                active: set.id == active.id,
            })
            .collect();

        if active.entries.is_empty() {
            Self::NoEntries {
                set_id: active.id.clone(),
                tabs,
            }
        } else {
            Self::Table {
                set_id: active.id.clone(),
                tabs,
                entries: active.entries.clone(),
            }
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        match self {
            Self::Table { entries, .. } => entries,
            _ => &[],
        }
    }
}
