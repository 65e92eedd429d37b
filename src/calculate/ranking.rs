//! Top-N extraction over derived model stats.
//!
//! Ties on the sort key are broken by model name ascending (longest games:
//! by pairing label, then input order), so a view never depends on the
//! order the matches arrived in.

use std::cmp::Ordering;

use crate::models::{
    MatchRecord, ModelStats, RankedEntry, RankedView, Ranking, StatValue, StatView,
};

/// Entries kept per view.
pub const TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Ascending,
    Descending,
}

/// Compute every view in [`StatView::ALL`].
pub fn rank_views(models: &[ModelStats], round_matches: &[&MatchRecord]) -> Vec<RankedView> {
    StatView::ALL
        .iter()
        .map(|&view| RankedView {
            view,
            title: view.title().to_string(),
            ranking: rank_view(view, models, round_matches),
        })
        .collect()
}

/// Compute a single ranked view.
pub fn rank_view(
    view: StatView,
    models: &[ModelStats],
    round_matches: &[&MatchRecord],
) -> Ranking {
    match view {
        StatView::MostAverageRounds => top_models(
            models,
            |m| m.counts.rounds_matches > 0,
            |m| m.avg_rounds,
            Order::Descending,
            |m| StatValue::Average(m.avg_rounds),
        ),
        StatView::LeastAverageRounds => top_models(
            models,
            |m| m.counts.rounds_matches > 0,
            |m| m.avg_rounds,
            Order::Ascending,
            |m| StatValue::Average(m.avg_rounds),
        ),
        StatView::LongestGames => longest_games(round_matches),
        StatView::MostSweeps => top_models(
            models,
            |_| true,
            |m| m.counts.sweeps_20 as f64,
            Order::Descending,
            |m| StatValue::Count(m.counts.sweeps_20),
        ),
        StatView::WinShare20 => top_models(
            models,
            |m| m.counts.wins > 0,
            |m| m.win_share_20,
            Order::Descending,
            |m| StatValue::Percent(m.win_share_20),
        ),
        StatView::WinShare21 => top_models(
            models,
            |m| m.counts.wins > 0,
            |m| m.win_share_21,
            Order::Descending,
            |m| StatValue::Percent(m.win_share_21),
        ),
        StatView::MostComebacks => top_models(
            models,
            |m| m.counts.comebacks > 0,
            |m| m.counts.comebacks as f64,
            Order::Descending,
            |m| StatValue::Count(m.counts.comebacks),
        ),
        StatView::BestWinRate => top_models(
            models,
            |m| m.counts.total_matches > 0,
            |m| m.win_rate,
            Order::Descending,
            |m| StatValue::Percent(m.win_rate),
        ),
        StatView::WorstWinRate => top_models(
            models,
            |m| m.counts.total_matches > 0,
            |m| m.win_rate,
            Order::Ascending,
            |m| StatValue::Percent(m.win_rate),
        ),
        StatView::MostMatches => top_models(
            models,
            |_| true,
            |m| m.counts.total_matches as f64,
            Order::Descending,
            |m| StatValue::Count(m.counts.total_matches),
        ),
    }
}

fn top_models(
    models: &[ModelStats],
    include: impl Fn(&ModelStats) -> bool,
    key: impl Fn(&ModelStats) -> f64,
    order: Order,
    value: impl Fn(&ModelStats) -> StatValue,
) -> Ranking {
    let mut ranked: Vec<&ModelStats> = models.iter().filter(|m| include(m)).collect();
    ranked.sort_by(|a, b| {
        directed(key(a).total_cmp(&key(b)), order).then_with(|| a.name.cmp(&b.name))
    });

    Ranking::from_entries(
        ranked
            .into_iter()
            .take(TOP_N)
            .map(|m| RankedEntry::new(m.name.clone(), value(m)))
            .collect(),
    )
}

fn longest_games(round_matches: &[&MatchRecord]) -> Ranking {
    let mut ranked: Vec<(String, u32)> = round_matches
        .iter()
        .map(|m| (m.pairing_label(), m.rounds.len() as u32))
        .collect();
    // Stable sort keeps input order for identical labels and lengths.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ranking::from_entries(
        ranked
            .into_iter()
            .take(TOP_N)
            .map(|(label, rounds)| RankedEntry::new(label, StatValue::Rounds(rounds)))
            .collect(),
    )
}

fn directed(ordering: Ordering, order: Order) -> Ordering {
    match order {
        Order::Ascending => ordering,
        Order::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::derive_model_stats;
    use crate::models::fixtures::match_between;
    use crate::models::ModelAccumulator;

    fn model(name: &str, counts: ModelAccumulator) -> ModelStats {
        derive_model_stats(name, counts)
    }

    fn labels(ranking: &Ranking) -> Vec<&str> {
        ranking.entries().iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_truncates_to_top_n() {
        let models: Vec<_> = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                model(
                    name,
                    ModelAccumulator {
                        total_matches: i as u32 + 1,
                        draws: i as u32 + 1,
                        ..Default::default()
                    },
                )
            })
            .collect();

        let ranking = rank_view(StatView::MostMatches, &models, &[]);
        assert_eq!(labels(&ranking), vec!["E", "D", "C"]);
        assert_eq!(ranking.top().unwrap().value, StatValue::Count(5));
    }

    #[test]
    fn test_ties_broken_by_name() {
        let counts = ModelAccumulator {
            total_matches: 2,
            wins: 1,
            losses: 1,
            ..Default::default()
        };
        let models = vec![
            model("Zeta", counts.clone()),
            model("Alpha", counts.clone()),
            model("Mid", counts),
        ];

        let best = rank_view(StatView::BestWinRate, &models, &[]);
        let worst = rank_view(StatView::WorstWinRate, &models, &[]);
        assert_eq!(labels(&best), vec!["Alpha", "Mid", "Zeta"]);
        assert_eq!(labels(&worst), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_win_rate_directions() {
        let models = vec![
            model(
                "Strong",
                ModelAccumulator {
                    total_matches: 4,
                    wins: 3,
                    losses: 1,
                    ..Default::default()
                },
            ),
            model(
                "Weak",
                ModelAccumulator {
                    total_matches: 4,
                    wins: 1,
                    losses: 3,
                    ..Default::default()
                },
            ),
        ];

        assert_eq!(labels(&rank_view(StatView::BestWinRate, &models, &[]))[0], "Strong");
        assert_eq!(labels(&rank_view(StatView::WorstWinRate, &models, &[]))[0], "Weak");
    }

    #[test]
    fn test_filters_produce_no_data() {
        let models = vec![model(
            "Idle",
            ModelAccumulator {
                total_matches: 1,
                draws: 1,
                ..Default::default()
            },
        )];

        assert!(rank_view(StatView::MostComebacks, &models, &[]).is_empty());
        assert!(rank_view(StatView::WinShare20, &models, &[]).is_empty());
        assert!(rank_view(StatView::MostAverageRounds, &models, &[]).is_empty());
        assert!(rank_view(StatView::LongestGames, &models, &[]).is_empty());
        // Unfiltered views still list the model with a zero count.
        assert_eq!(
            rank_view(StatView::MostSweeps, &models, &[]).top().unwrap().value,
            StatValue::Count(0)
        );
    }

    #[test]
    fn test_average_rounds_directions() {
        let models = vec![
            model(
                "Long",
                ModelAccumulator {
                    total_matches: 1,
                    draws: 1,
                    total_rounds: 5,
                    rounds_matches: 1,
                    ..Default::default()
                },
            ),
            model(
                "Short",
                ModelAccumulator {
                    total_matches: 2,
                    draws: 2,
                    total_rounds: 4,
                    rounds_matches: 2,
                    ..Default::default()
                },
            ),
        ];

        let most = rank_view(StatView::MostAverageRounds, &models, &[]);
        let least = rank_view(StatView::LeastAverageRounds, &models, &[]);
        assert_eq!(labels(&most), vec!["Long", "Short"]);
        assert_eq!(labels(&least), vec!["Short", "Long"]);
        assert_eq!(least.top().unwrap().display, "2.00");
    }

    #[test]
    fn test_longest_games_per_match() {
        let short = match_between("A", "B", &[Some("A"), Some("A")], Some("A"), (2, 0));
        let long = match_between(
            "C",
            "D",
            &[Some("C"), None, Some("D"), Some("C")],
            Some("C"),
            (2, 1),
        );
        let mid = match_between("A", "C", &[Some("A"), Some("C"), Some("A")], Some("A"), (2, 1));
        let pool = vec![&short, &long, &mid];

        let ranking = rank_view(StatView::LongestGames, &[], &pool);
        assert_eq!(labels(&ranking), vec!["C vs D", "A vs C", "A vs B"]);
        assert_eq!(ranking.top().unwrap().display, "4 rounds");
    }

    #[test]
    fn test_rank_views_covers_all() {
        let views = rank_views(&[], &[]);
        assert_eq!(views.len(), StatView::ALL.len());
        assert!(views.iter().all(|v| v.ranking.is_empty()));
    }
}
