//! Run index entries from `runs.jsonl`.

use serde::{Deserialize, Serialize};

use super::RunParticipant;

/// One entry of a benchmark's run list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,

    #[serde(default)]
    pub participants: Vec<RunParticipant>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub match_type: Option<String>,

    /// ISO-8601 timestamp; runs are ordered newest first by this string
    #[serde(default)]
    pub created_at: Option<String>,

    /// Artifact path relative to the benchmark directory
    #[serde(default)]
    pub artifacts_ref: Option<String>,
}

impl RunRecord {
    /// "A vs B", or "Run <id>" when the run lists no participants.
    pub fn title(&self) -> String {
        let names: Vec<&str> = self
            .participants
            .iter()
            .map(|p| p.display_name.as_str())
            .collect();
        let joined = names.join(" vs ");
        if joined.is_empty() {
            format!("Run {}", self.run_id)
        } else {
            joined
        }
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn match_type_label(&self) -> String {
        self.match_type
            .as_deref()
            .map(|t| t.to_uppercase())
            .unwrap_or_else(|| "RUN".to_string())
    }

    pub fn artifact_path(&self) -> Option<&str> {
        self.artifacts_ref.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// Completed runs with an artifact are the input to statistics.
    pub fn is_stats_eligible(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
            && self.artifact_path().is_some()
    }

    /// Case-insensitive substring match against any participant's
    /// `provider/model_name`.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.participants
            .iter()
            .any(|p| p.qualified_name().to_lowercase().contains(&query))
    }
}

/// Sort runs newest first by `created_at`.
pub fn sort_newest_first(runs: &mut [RunRecord]) {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, created_at: &str, models: &[(&str, &str)]) -> RunRecord {
        RunRecord {
            run_id: id.to_string(),
            participants: models
                .iter()
                .map(|(provider, model)| RunParticipant {
                    provider: provider.to_string(),
                    model_name: model.to_string(),
                    display_name: model.to_string(),
                })
                .collect(),
            status: Some("completed".to_string()),
            match_type: Some("bo3".to_string()),
            created_at: Some(created_at.to_string()),
            artifacts_ref: Some(format!("runs/{}.json", id)),
        }
    }

    #[test]
    fn test_title() {
        let r = run("1", "2025-01-01T00:00:00Z", &[("a", "x"), ("b", "y")]);
        assert_eq!(r.title(), "x vs y");

        let empty = run("9", "2025-01-01T00:00:00Z", &[]);
        assert_eq!(empty.title(), "Run 9");
    }

    #[test]
    fn test_labels() {
        let mut r = run("1", "2025-01-01T00:00:00Z", &[]);
        assert_eq!(r.match_type_label(), "BO3");
        r.match_type = None;
        r.status = None;
        assert_eq!(r.match_type_label(), "RUN");
        assert_eq!(r.status_label(), "unknown");
    }

    #[test]
    fn test_matches_search() {
        let r = run("1", "2025-01-01T00:00:00Z", &[("OpenAI", "gpt-4o")]);
        assert!(r.matches_search("openai/GPT"));
        assert!(r.matches_search("  "));
        assert!(!r.matches_search("anthropic"));
    }

    #[test]
    fn test_stats_eligibility() {
        let mut r = run("1", "2025-01-01T00:00:00Z", &[]);
        assert!(r.is_stats_eligible());

        r.status = Some("Running".to_string());
        assert!(!r.is_stats_eligible());

        r.status = Some("COMPLETED".to_string());
        r.artifacts_ref = Some("  ".to_string());
        assert!(!r.is_stats_eligible());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut runs = vec![
            run("old", "2025-01-01T00:00:00Z", &[]),
            run("new", "2025-03-01T00:00:00Z", &[]),
            run("mid", "2025-02-01T00:00:00Z", &[]),
        ];
        sort_newest_first(&mut runs);
        let ids: Vec<_> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }
}
