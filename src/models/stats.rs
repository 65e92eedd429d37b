//! Derived statistics models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running per-model counts built by the accumulation pass.
///
/// Keyed by display name: distinct participants that share a display name
/// are merged into a single accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAccumulator {
    pub total_matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,

    /// Sum of round counts over matches with round data
    pub total_rounds: u32,

    /// Matches that contributed round data; denominator for `avg_rounds`
    pub rounds_matches: u32,

    /// Wins with final score 2-0
    pub sweeps_20: u32,
    pub wins_20: u32,

    /// Wins with final score 2-1
    pub wins_21: u32,

    /// Wins where the model trailed in rounds at some point
    pub comebacks: u32,

    /// Largest round deficit overcome in any comeback
    pub max_comeback_deficit: u32,
}

/// Accumulator plus the ratios derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub name: String,

    #[serde(flatten)]
    pub counts: ModelAccumulator,

    pub avg_rounds: f64,

    /// 0.0 to 1.0
    pub win_rate: f64,

    /// Share of wins that were 2-0 sweeps
    pub win_share_20: f64,

    /// Share of wins that were 2-1
    pub win_share_21: f64,
}

/// A ranked quantity, kept typed so consumers can re-format it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Count(u32),
    /// Ratio in 0.0..=1.0, shown as a percentage
    Percent(f64),
    Average(f64),
    Rounds(u32),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{}", n),
            StatValue::Percent(v) => write!(f, "{:.1}%", v * 100.0),
            StatValue::Average(v) => write!(f, "{:.2}", v),
            StatValue::Rounds(1) => write!(f, "1 round"),
            StatValue::Rounds(n) => write!(f, "{} rounds", n),
        }
    }
}

/// One row of a ranked view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: StatValue,
    /// `value` formatted for display
    pub display: String,
}

impl RankedEntry {
    pub fn new(label: impl Into<String>, value: StatValue) -> Self {
        let display = value.to_string();
        Self {
            label: label.into(),
            value,
            display,
        }
    }
}

/// The ten ranked views over a stats computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatView {
    MostAverageRounds,
    LeastAverageRounds,
    LongestGames,
    MostSweeps,
    WinShare20,
    WinShare21,
    MostComebacks,
    BestWinRate,
    WorstWinRate,
    MostMatches,
}

impl StatView {
    pub const ALL: [StatView; 10] = [
        StatView::MostAverageRounds,
        StatView::LeastAverageRounds,
        StatView::LongestGames,
        StatView::MostSweeps,
        StatView::WinShare20,
        StatView::WinShare21,
        StatView::MostComebacks,
        StatView::BestWinRate,
        StatView::WorstWinRate,
        StatView::MostMatches,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StatView::MostAverageRounds => "Most average rounds",
            StatView::LeastAverageRounds => "Least average rounds",
            StatView::LongestGames => "Longest games",
            StatView::MostSweeps => "Most clean 2-0 sweeps",
            StatView::WinShare20 => "Wins that are 2-0",
            StatView::WinShare21 => "Wins that are 2-1",
            StatView::MostComebacks => "Most comebacks",
            StatView::BestWinRate => "Best win rate",
            StatView::WorstWinRate => "Worst win rate",
            StatView::MostMatches => "Most matches played",
        }
    }
}

impl fmt::Display for StatView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result of one ranked view; "no data" is reported explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "entries", rename_all = "snake_case")]
pub enum Ranking {
    NoData,
    Ranked(Vec<RankedEntry>),
}

impl Ranking {
    pub fn from_entries(entries: Vec<RankedEntry>) -> Self {
        if entries.is_empty() {
            Ranking::NoData
        } else {
            Ranking::Ranked(entries)
        }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        match self {
            Ranking::NoData => &[],
            Ranking::Ranked(entries) => entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Ranking::NoData)
    }

    pub fn top(&self) -> Option<&RankedEntry> {
        self.entries().first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedView {
    pub view: StatView,
    pub title: String,
    pub ranking: Ranking,
}

/// Full output of a stats computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// Benchmark the input came from, if known
    pub benchmark_id: Option<String>,

    pub computed_at: DateTime<Utc>,

    /// Matches with both participants present
    pub total_matches: u32,

    /// Per-model stats ordered by name
    pub models: Vec<ModelStats>,

    pub views: Vec<RankedView>,
}

impl StatsReport {
    pub fn view(&self, view: StatView) -> Option<&Ranking> {
        self.views.iter().find(|v| v.view == view).map(|v| &v.ranking)
    }

    pub fn model(&self, name: &str) -> Option<&ModelStats> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn with_benchmark(mut self, benchmark_id: impl Into<String>) -> Self {
        self.benchmark_id = Some(benchmark_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_value_display() {
        assert_eq!(StatValue::Count(3).to_string(), "3");
        assert_eq!(StatValue::Percent(0.5).to_string(), "50.0%");
        assert_eq!(StatValue::Percent(2.0 / 3.0).to_string(), "66.7%");
        assert_eq!(StatValue::Average(2.5).to_string(), "2.50");
        assert_eq!(StatValue::Rounds(1).to_string(), "1 round");
        assert_eq!(StatValue::Rounds(5).to_string(), "5 rounds");
    }

    #[test]
    fn test_ranking_from_entries() {
        assert!(Ranking::from_entries(vec![]).is_empty());

        let ranking = Ranking::from_entries(vec![RankedEntry::new("A", StatValue::Count(1))]);
        assert!(!ranking.is_empty());
        assert_eq!(ranking.top().unwrap().display, "1");
    }

    #[test]
    fn test_ranking_serialization() {
        let json = serde_json::to_value(Ranking::NoData).unwrap();
        assert_eq!(json["state"], "no_data");

        let ranked = Ranking::Ranked(vec![RankedEntry::new("A", StatValue::Percent(0.25))]);
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["state"], "ranked");
        assert_eq!(json["entries"][0]["label"], "A");
        assert_eq!(json["entries"][0]["value"]["kind"], "percent");
        assert_eq!(json["entries"][0]["display"], "25.0%");
    }

    #[test]
    fn test_view_titles_unique() {
        let titles: std::collections::HashSet<_> =
            StatView::ALL.iter().map(|v| v.title()).collect();
        assert_eq!(titles.len(), StatView::ALL.len());
    }
}
