//! Accumulation pass: one walk over the matches, building per-model counts.

use std::collections::BTreeMap;

use tracing::debug;

use super::comeback::detect_comeback;
use crate::models::{MatchRecord, ModelAccumulator, Side};

/// Output of the accumulation pass.
#[derive(Debug, Default)]
pub struct Accumulation<'a> {
    /// Matches with both participants present
    pub total_matches: u32,

    /// Matches dropped for missing a participant
    pub skipped: u32,

    /// Keyed by aggregation key (normalized display name)
    pub models: BTreeMap<String, ModelAccumulator>,

    /// Matches that carry round data, in input order
    pub round_matches: Vec<&'a MatchRecord>,
}

/// Build per-model accumulators from `matches`.
///
/// Matches missing either participant are skipped without error. The counts
/// do not depend on the order of `matches`.
pub fn accumulate(matches: &[MatchRecord]) -> Accumulation<'_> {
    let mut acc = Accumulation::default();

    for record in matches {
        let Some((p1, p2)) = record.participants() else {
            acc.skipped += 1;
            continue;
        };
        acc.total_matches += 1;

        let keys = [p1.aggregation_key(), p2.aggregation_key()];
        let has_rounds = record.has_round_data();
        let round_count = record.rounds.len() as u32;

        for key in &keys {
            let entry = acc.models.entry(key.clone()).or_default();
            entry.total_matches += 1;
            if has_rounds {
                entry.total_rounds += round_count;
                entry.rounds_matches += 1;
            }
        }
        if has_rounds {
            acc.round_matches.push(record);
        }

        let Some(winner) = record.winning_side() else {
            for key in &keys {
                acc.models.entry(key.clone()).or_default().draws += 1;
            }
            continue;
        };

        let (winner_key, loser_key) = match winner {
            Side::Player1 => (&keys[0], &keys[1]),
            Side::Player2 => (&keys[1], &keys[0]),
        };
        acc.models.entry(loser_key.clone()).or_default().losses += 1;

        let entry = acc.models.entry(winner_key.clone()).or_default();
        entry.wins += 1;

        match (record.score(winner), record.score(winner.opponent())) {
            (Some(2), Some(0)) => {
                entry.sweeps_20 += 1;
                entry.wins_20 += 1;
            }
            (Some(2), Some(1)) => entry.wins_21 += 1,
            _ => {}
        }

        if has_rounds {
            if let Some(deficit) = detect_comeback(record, winner) {
                entry.comebacks += 1;
                entry.max_comeback_deficit = entry.max_comeback_deficit.max(deficit);
            }
        }
    }

    debug!(
        "Accumulated {} matches into {} models ({} skipped)",
        acc.total_matches,
        acc.models.len(),
        acc.skipped
    );
    acc
}
