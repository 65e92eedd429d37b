//! Statistics calculation engine.
//!
//! Computes derived match statistics from a snapshot of match records:
//! - Per-model accumulation keyed by display name
//! - Score classification (2-0 sweeps, 2-1 wins)
//! - Comeback detection from round order
//! - Top-N rankings across ten views
//!
//! Every call is a full re-derivation; nothing is cached between calls.

mod accumulate;
mod comeback;
mod ranking;

pub use accumulate::{accumulate, Accumulation};
pub use comeback::detect_comeback;
pub use ranking::{rank_view, rank_views, TOP_N};

use chrono::Utc;
use tracing::debug;

use crate::models::{MatchRecord, ModelAccumulator, ModelStats, StatsReport};

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Calculate win rate from wins and total matches played.
pub fn calculate_win_rate(wins: u32, total_matches: u32) -> f64 {
    ratio(wins, total_matches)
}

/// Attach derived ratios to an accumulator.
pub fn derive_model_stats(name: &str, counts: ModelAccumulator) -> ModelStats {
    ModelStats {
        name: name.to_string(),
        avg_rounds: ratio(counts.total_rounds, counts.rounds_matches),
        win_rate: calculate_win_rate(counts.wins, counts.total_matches),
        win_share_20: ratio(counts.wins_20, counts.wins),
        win_share_21: ratio(counts.wins_21, counts.wins),
        counts,
    }
}

/// Run the full pipeline: accumulate, derive, rank.
pub fn compute_stats(matches: &[MatchRecord]) -> StatsReport {
    let acc = accumulate(matches);

    let models: Vec<ModelStats> = acc
        .models
        .into_iter()
        .map(|(name, counts)| derive_model_stats(&name, counts))
        .collect();
    let views = rank_views(&models, &acc.round_matches);

    debug!(
        "Computed stats for {} models over {} matches",
        models.len(),
        acc.total_matches
    );

    StatsReport {
        benchmark_id: None,
        computed_at: Utc::now(),
        total_matches: acc.total_matches,
        models,
        views,
    }
}
