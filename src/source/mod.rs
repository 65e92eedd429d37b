//! Benchmark data sources.
//!
//! A [`BenchmarkSource`] reads files relative to a data root. Two backends
//! exist: a local directory and a remote HTTP root fronted by the caching
//! [`Fetcher`]. Typed loaders on top of the trait parse the index, metadata,
//! leaderboard, run list and match artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::DataConfig;
use crate::fetch::{FetchError, Fetcher};
use crate::models::{
    sort_newest_first, BenchmarkEntry, BenchmarkIndex, BenchmarkMeta, Leaderboard, MatchRecord,
    RunArtifact, RunRecord,
};
use crate::storage::{parse_jsonl, BenchmarkPaths, StorageConfig, StorageError, INDEX_FILE};

/// Errors that can occur loading benchmark data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Benchmark not found: {0}")]
    BenchmarkNotFound(String),

    #[error("No benchmarks found")]
    NoBenchmarks,

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run {0} has no match artifact")]
    MissingArtifact(String),
}

/// Read access to a benchmark data root.
#[async_trait]
pub trait BenchmarkSource: Send + Sync {
    /// Human-readable location, for logging.
    fn describe(&self) -> String;

    /// Read a file relative to the data root.
    async fn read_text(&self, relative: &str) -> Result<String, SourceError>;

    /// Last path segment of the data root, used to rebase site-relative
    /// benchmark paths.
    fn root_name(&self) -> Option<String> {
        None
    }
}

/// Data root on the local filesystem.
pub struct LocalSource {
    storage: StorageConfig,
}

impl LocalSource {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl BenchmarkSource for LocalSource {
    fn describe(&self) -> String {
        self.storage.data_dir.display().to_string()
    }

    async fn read_text(&self, relative: &str) -> Result<String, SourceError> {
        let path = self.storage.resolve(relative)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::PathNotFound(path).into())
            }
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    fn root_name(&self) -> Option<String> {
        self.storage.root_name()
    }
}

/// Data root served over HTTP.
pub struct HttpSource {
    base: Url,
    fetcher: Fetcher,
}

impl HttpSource {
    pub fn new(base: Url, fetcher: Fetcher) -> Self {
        // Url::join replaces the last segment unless the base ends in '/'.
        let base = if base.path().ends_with('/') {
            base
        } else {
            let mut base = base;
            let path = format!("{}/", base.path());
            base.set_path(&path);
            base
        };
        Self { base, fetcher }
    }

    fn url_for(&self, relative: &str) -> Result<Url, FetchError> {
        let url = self
            .base
            .join(relative.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", relative, e)))?;
        if !url.as_str().starts_with(self.base.as_str()) {
            return Err(FetchError::InvalidUrl(relative.to_string()));
        }
        Ok(url)
    }
}

#[async_trait]
impl BenchmarkSource for HttpSource {
    fn describe(&self) -> String {
        self.base.to_string()
    }

    async fn read_text(&self, relative: &str) -> Result<String, SourceError> {
        let url = self.url_for(relative)?;
        Ok(self.fetcher.fetch_text(&url).await?)
    }

    fn root_name(&self) -> Option<String> {
        self.base
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string)
    }
}

/// Build the source named by `[data] base`: a URL or a local directory.
pub fn source_from_config(config: &DataConfig) -> Result<Arc<dyn BenchmarkSource>, SourceError> {
    let base = config.base.trim();
    let source: Arc<dyn BenchmarkSource> = if config.is_remote() {
        let url = Url::parse(base)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base, e)))?;
        let fetcher = Fetcher::new(config.fetcher_config())?;
        Arc::new(HttpSource::new(url, fetcher))
    } else {
        Arc::new(LocalSource::new(StorageConfig::new(PathBuf::from(base))))
    };
    info!("Reading benchmarks from {}", source.describe());
    Ok(source)
}

async fn read_json<T: serde::de::DeserializeOwned>(
    source: &dyn BenchmarkSource,
    path: &str,
) -> Result<T, SourceError> {
    let text = source.read_text(path).await?;
    serde_json::from_str(&text).map_err(|source| SourceError::Parse {
        path: path.to_string(),
        source,
    })
}

fn paths_for(source: &dyn BenchmarkSource, benchmark: &BenchmarkEntry) -> BenchmarkPaths {
    BenchmarkPaths::within_root(&benchmark.path, source.root_name().as_deref())
}

/// Load `index.json` from the data root.
pub async fn load_index(source: &dyn BenchmarkSource) -> Result<BenchmarkIndex, SourceError> {
    let index: BenchmarkIndex = read_json(source, INDEX_FILE).await?;
    debug!(
        "Loaded {} benchmarks from {}",
        index.benchmarks.len(),
        source.describe()
    );
    Ok(index)
}

/// Pick a benchmark from the index by id, defaulting to the first one.
pub async fn resolve_benchmark(
    source: &dyn BenchmarkSource,
    benchmark_id: Option<&str>,
) -> Result<BenchmarkEntry, SourceError> {
    let index = load_index(source).await?;
    match index.select(benchmark_id) {
        Some(entry) => Ok(entry.clone()),
        None => match benchmark_id {
            Some(id) => Err(SourceError::BenchmarkNotFound(id.to_string())),
            None => Err(SourceError::NoBenchmarks),
        },
    }
}

pub async fn load_meta(
    source: &dyn BenchmarkSource,
    benchmark: &BenchmarkEntry,
) -> Result<BenchmarkMeta, SourceError> {
    read_json(source, &paths_for(source, benchmark).meta()).await
}

pub async fn load_leaderboard(
    source: &dyn BenchmarkSource,
    benchmark: &BenchmarkEntry,
) -> Result<Leaderboard, SourceError> {
    read_json(source, &paths_for(source, benchmark).leaderboard()).await
}

/// A benchmark's run list.
#[derive(Debug, Clone, Default)]
pub struct RunList {
    /// Newest first
    pub runs: Vec<RunRecord>,
    /// Lines of `runs.jsonl` that could not be parsed
    pub skipped: usize,
}

/// Load the run list, newest first. Unparseable lines are skipped and counted.
pub async fn load_runs(
    source: &dyn BenchmarkSource,
    benchmark: &BenchmarkEntry,
) -> Result<RunList, SourceError> {
    let path = paths_for(source, benchmark).runs();
    let text = source.read_text(&path).await?;
    let parsed = parse_jsonl::<RunRecord>(&text, &path);
    if parsed.skipped > 0 {
        warn!(
            "Skipped {} unreadable run lines for {}",
            parsed.skipped, benchmark.benchmark_id
        );
    }

    let mut runs = parsed.items;
    sort_newest_first(&mut runs);
    Ok(RunList {
        runs,
        skipped: parsed.skipped,
    })
}

/// Everything the dashboard shows for one benchmark, minus match artifacts.
#[derive(Debug, Clone)]
pub struct BenchmarkData {
    pub entry: BenchmarkEntry,
    pub meta: BenchmarkMeta,
    pub leaderboard: Leaderboard,
    pub runs: RunList,
}

/// Load metadata, leaderboard and runs concurrently; any failure fails all.
pub async fn load_benchmark(
    source: &dyn BenchmarkSource,
    entry: BenchmarkEntry,
) -> Result<BenchmarkData, SourceError> {
    let (meta, leaderboard, runs) = tokio::try_join!(
        load_meta(source, &entry),
        load_leaderboard(source, &entry),
        load_runs(source, &entry),
    )?;
    info!(
        "Loaded benchmark {} ({} runs, {} leaderboard sets)",
        entry.benchmark_id,
        runs.runs.len(),
        leaderboard.sets.len()
    );
    Ok(BenchmarkData {
        entry,
        meta,
        leaderboard,
        runs,
    })
}

/// Find a run by id.
pub fn find_run<'a>(runs: &'a [RunRecord], run_id: &str) -> Result<&'a RunRecord, SourceError> {
    runs.iter()
        .find(|r| r.run_id == run_id)
        .ok_or_else(|| SourceError::RunNotFound(run_id.to_string()))
}

/// Load the match artifact of one run.
pub async fn load_artifact(
    source: &dyn BenchmarkSource,
    benchmark: &BenchmarkEntry,
    run: &RunRecord,
) -> Result<MatchRecord, SourceError> {
    let artifact_ref = run
        .artifact_path()
        .ok_or_else(|| SourceError::MissingArtifact(run.run_id.clone()))?;
    let path = paths_for(source, benchmark).artifact(artifact_ref);
    read_artifact(source, &path, &run.run_id).await
}

async fn read_artifact(
    source: &dyn BenchmarkSource,
    path: &str,
    run_id: &str,
) -> Result<MatchRecord, SourceError> {
    let artifact: RunArtifact = read_json(source, path).await?;
    artifact
        .match_record
        .ok_or_else(|| SourceError::MissingArtifact(run_id.to_string()))
}

/// Matches retrieved for a stats computation.
#[derive(Debug, Default)]
pub struct LoadedMatches {
    /// In run-list order
    pub matches: Vec<MatchRecord>,
    /// Artifacts that failed to load or parse
    pub failed: usize,
}

/// Fetch the match artifact of every completed run, at most `concurrency`
/// at a time.
///
/// A failed retrieval is logged and dropped; it never fails the whole load.
pub async fn load_matches(
    source: Arc<dyn BenchmarkSource>,
    benchmark: &BenchmarkEntry,
    runs: &[RunRecord],
    concurrency: usize,
) -> LoadedMatches {
    let paths = paths_for(source.as_ref(), benchmark);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = JoinSet::new();

    for (idx, run) in runs.iter().filter(|r| r.is_stats_eligible()).enumerate() {
        let Some(artifact_ref) = run.artifact_path() else {
            continue;
        };
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let source = source.clone();
        let path = paths.artifact(artifact_ref);
        let run_id = run.run_id.clone();

        set.spawn(async move {
            let _permit = permit;
            let result = read_artifact(source.as_ref(), &path, &run_id).await;
            (idx, run_id, result)
        });
    }

    let mut loaded = Vec::new();
    let mut failed = 0;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, _, Ok(record))) => loaded.push((idx, record)),
            Ok((_, run_id, Err(e))) => {
                warn!("Dropping run {} from stats: {}", run_id, e);
                failed += 1;
            }
            Err(e) => {
                warn!("Artifact task failed: {}", e);
                failed += 1;
            }
        }
    }

    loaded.sort_by_key(|(idx, _)| *idx);
    info!(
        "Loaded {} match artifacts for {} ({} failed)",
        loaded.len(),
        benchmark.benchmark_id,
        failed
    );

    LoadedMatches {
        matches: loaded.into_iter().map(|(_, m)| m).collect(),
        failed,
    }
}

#[cfg(test)]
pub(crate) mod testdata {
    //! On-disk benchmark fixture shared by source and API tests.

    use std::path::{Path, PathBuf};

    /// Write a data root with one benchmark, `chess`, holding four runs:
    /// two completed with valid artifacts, one completed with a broken
    /// artifact, and one still running.
    pub fn write_fixture(root: &Path) {
        write_benchmarks(root, "");
    }

    /// Write the same data the way a published site lays it out: the data
    /// root is `<site>/benchmarks` and the index lists paths relative to the
    /// site (`benchmarks/chess`). Returns the data root.
    pub fn write_site_fixture(site: &Path) -> PathBuf {
        let root = site.join("benchmarks");
        write_benchmarks(&root, "benchmarks/");
        root
    }

    fn write_benchmarks(root: &Path, path_prefix: &str) {
        let bench = root.join("chess");
        std::fs::create_dir_all(bench.join("artifacts")).unwrap();

        std::fs::write(
            root.join("index.json"),
            format!(
                r#"{{"benchmarks": [
                    {{"benchmark_id": "chess", "name": "Chess", "path": "{0}chess"}},
                    {{"benchmark_id": "empty", "name": "Empty", "path": "{0}empty"}}
                ]}}"#,
                path_prefix
            ),
        )
        .unwrap();

        std::fs::write(
            bench.join("benchmark.json"),
            r#"{"name": "Chess Arena", "schema_version": 1,
                "generated_at": "2025-05-01T12:00:00Z",
                "run_types": ["bo3"], "description": "Best-of-three chess"}"#,
        )
        .unwrap();

        std::fs::write(
            bench.join("leaderboard.json"),
            r#"{"sets": [{"id": "overall", "label": "Overall", "entries": [
                {"rank": 1, "display_name": "A", "rating": 1612.456,
                 "games_played": 2, "wins": 2, "losses": 0, "draws": 0, "win_rate": 100}
            ]}]}"#,
        )
        .unwrap();

        let runs = [
            r#"{"run_id": "r1", "participants": [{"provider": "acme", "model_name": "a-1", "display_name": "A"}, {"provider": "beta", "model_name": "b-1", "display_name": "B"}], "status": "completed", "match_type": "bo3", "created_at": "2025-04-01T10:00:00Z", "artifacts_ref": "artifacts/r1.json"}"#,
            r#"{"run_id": "r2", "participants": [{"provider": "acme", "model_name": "a-1", "display_name": "A"}, {"provider": "gamma", "model_name": "c-1", "display_name": "C"}], "status": "completed", "match_type": "bo3", "created_at": "2025-04-02T10:00:00Z", "artifacts_ref": "artifacts/r2.json"}"#,
            r#"{"run_id": "r3", "participants": [], "status": "completed", "created_at": "2025-04-03T10:00:00Z", "artifacts_ref": "artifacts/broken.json"}"#,
            r#"{"run_id": "r4", "participants": [], "status": "running", "created_at": "2025-04-04T10:00:00Z"}"#,
            "this line is not json",
        ];
        std::fs::write(bench.join("runs.jsonl"), runs.join("\n")).unwrap();

        std::fs::write(
            bench.join("artifacts/r1.json"),
            r#"{"match": {
                "player1": {"id": 1, "display_name": "A"},
                "player2": {"id": 2, "display_name": "B"},
                "rounds": [{"winner_id": 1}, {"winner_id": 1}],
                "winner_id": 1, "player1_score": 2, "player2_score": 0,
                "status": "completed",
                "created_at": "2025-04-01T10:00:00Z",
                "completed_at": "2025-04-01T10:30:00Z"
            }}"#,
        )
        .unwrap();

        std::fs::write(
            bench.join("artifacts/r2.json"),
            r#"{"match": {
                "player1": {"id": 1, "display_name": "A"},
                "player2": {"id": 3, "display_name": "C"},
                "rounds": [{"winner_id": 3}, {"winner_id": 1}, {"winner_id": 1}],
                "winner_id": 1, "player1_score": 2, "player2_score": 1,
                "status": "completed"
            }}"#,
        )
        .unwrap();

        std::fs::write(bench.join("artifacts/broken.json"), "{ not json").unwrap();
    }
}
