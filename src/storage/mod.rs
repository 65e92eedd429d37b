//! Benchmark data layout.
//!
//! A data root holds `index.json`; each benchmark listed there lives in its
//! own directory below the root:
//! - `benchmark.json`: metadata
//! - `leaderboard.json`: published rating sets
//! - `runs.jsonl`: one line per run
//! - per-run match artifacts referenced by `artifacts_ref`
//!
//! Published sites keep the data root in a `benchmarks/` directory and list
//! benchmark paths relative to the site root (`benchmarks/chess`). Those
//! paths are rebased onto the data root by [`BenchmarkPaths::within_root`].

mod jsonl;

pub use jsonl::*;

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur resolving or reading stored data.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Index file at the data root.
pub const INDEX_FILE: &str = "index.json";

/// Relative paths of one benchmark's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkPaths {
    base: String,
}

impl BenchmarkPaths {
    pub fn new(benchmark_path: &str) -> Self {
        Self {
            base: benchmark_path.trim_matches('/').to_string(),
        }
    }

    /// Paths for a benchmark listed in the index of a data root whose
    /// directory is named `root_name`.
    ///
    /// A path starting with `root_name` is taken as relative to the parent of
    /// the data root and rebased onto it; any other path is already relative
    /// to the data root.
    pub fn within_root(benchmark_path: &str, root_name: Option<&str>) -> Self {
        let path = benchmark_path.trim_start_matches("./").trim_matches('/');
        let rebased = root_name.filter(|name| !name.is_empty()).and_then(|name| {
            if path == name {
                Some("")
            } else {
                path.strip_prefix(name)?.strip_prefix('/')
            }
        });
        Self::new(rebased.unwrap_or(path))
    }

    pub fn meta(&self) -> String {
        self.join("benchmark.json")
    }

    pub fn leaderboard(&self) -> String {
        self.join("leaderboard.json")
    }

    pub fn runs(&self) -> String {
        self.join("runs.jsonl")
    }

    pub fn artifact(&self, artifacts_ref: &str) -> String {
        self.join(artifacts_ref)
    }

    fn join(&self, file: &str) -> String {
        let file = file.trim_start_matches('/');
        if self.base.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.base, file)
        }
    }
}

/// Configuration for a filesystem data root.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory name of the data root, if it has one.
    pub fn root_name(&self) -> Option<String> {
        self.data_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Resolve a relative data path under the root.
    ///
    /// Absolute paths and `..` components are rejected so artifact references
    /// cannot escape the data root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.trim().is_empty() || escapes {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.data_dir.join(rel))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./benchmarks"))
    }
}
