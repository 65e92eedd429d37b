//! Benchmark index, metadata and published leaderboards.

use serde::{Deserialize, Serialize};

/// Top-level `index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkIndex {
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkEntry>,
}

impl BenchmarkIndex {
    /// Look up a benchmark by id, or take the first one when no id is given.
    pub fn select(&self, benchmark_id: Option<&str>) -> Option<&BenchmarkEntry> {
        match benchmark_id {
            Some(id) => self.benchmarks.iter().find(|b| b.benchmark_id == id),
            None => self.benchmarks.first(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub benchmark_id: String,
    pub name: String,
    /// Directory of the benchmark, relative to the data root
    pub path: String,
}

/// `benchmark.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMeta {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub schema_version: Option<serde_json::Value>,

    #[serde(default)]
    pub generated_at: Option<String>,

    #[serde(default)]
    pub run_types: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// `leaderboard.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub sets: Vec<LeaderboardSet>,
}

impl Leaderboard {
    /// The set with the given id, falling back to the first set.
    pub fn select(&self, set_id: Option<&str>) -> Option<&LeaderboardSet> {
        set_id
            .and_then(|id| self.sets.iter().find(|s| s.id == id))
            .or_else(|| self.sets.first())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSet {
    pub id: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSet {
    pub fn tab_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub display_name: String,
    pub rating: f64,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    /// Percentage, already scaled to 0-100
    #[serde(default)]
    pub win_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_select() {
        let index: BenchmarkIndex = serde_json::from_str(
            r#"{"benchmarks": [
                {"benchmark_id": "chess", "name": "Chess", "path": "chess"},
                {"benchmark_id": "go", "name": "Go", "path": "go"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(index.select(None).unwrap().benchmark_id, "chess");
        assert_eq!(index.select(Some("go")).unwrap().name, "Go");
        assert!(index.select(Some("poker")).is_none());
    }

    #[test]
    fn test_leaderboard_select_falls_back_to_first() {
        let board: Leaderboard = serde_json::from_str(
            r#"{"sets": [
                {"id": "overall", "label": "Overall", "entries": []},
                {"id": "blitz", "entries": []}
            ]}"#,
        )
        .unwrap();

        assert_eq!(board.select(Some("blitz")).unwrap().tab_label(), "blitz");
        assert_eq!(board.select(Some("missing")).unwrap().id, "overall");
        assert_eq!(board.select(None).unwrap().tab_label(), "Overall");
    }

    #[test]
    fn test_empty_leaderboard() {
        let board: Leaderboard = serde_json::from_str("{}").unwrap();
        assert!(board.select(None).is_none());
    }

    #[test]
    fn test_meta_tolerates_missing_fields() {
        let meta: BenchmarkMeta =
            serde_json::from_str(r#"{"name": "Chess", "schema_version": 2}"#).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Chess"));
        assert!(meta.run_types.is_empty());
        assert!(meta.generated_at.is_none());
    }
}
