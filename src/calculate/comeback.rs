//! Comeback detection: was the eventual winner ever behind on rounds?

use crate::models::{MatchRecord, Side};

/// Replay the rounds of `record` from the perspective of the eventual
/// `winner` and return the largest round deficit the winner faced.
///
/// Returns `None` when the winner never trailed, when there are no rounds,
/// or when either participant lacks an id. A round won by neither
/// participant counts as drawn.
pub fn detect_comeback(record: &MatchRecord, winner: Side) -> Option<u32> {
    let winner_p = record.participant(winner)?;
    let opponent_p = record.participant(winner.opponent())?;
    if winner_p.id.is_none() || opponent_p.id.is_none() {
        return None;
    }

    let mut winner_tally: i64 = 0;
    let mut opponent_tally: i64 = 0;
    let mut max_deficit: i64 = 0;

    for round in &record.rounds {
        match &round.winner_id {
            Some(id) if winner_p.is(id) => winner_tally += 1,
            Some(id) if opponent_p.is(id) => opponent_tally += 1,
            _ => {}
        }
        max_deficit = max_deficit.max(opponent_tally - winner_tally);
    }

    (max_deficit > 0).then_some(max_deficit as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::match_between;

    #[test]
    fn test_winner_led_throughout() {
        let m = match_between("A", "B", &[Some("A"), Some("A")], Some("A"), (2, 0));
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }

    #[test]
    fn test_led_throughout_regardless_of_final_score() {
        // Recorded score disagrees with the rounds; only the rounds matter.
        let m = match_between("A", "B", &[Some("A"), Some("A")], Some("A"), (2, 1));
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }

    #[test]
    fn test_trailing_after_first_round() {
        let m = match_between(
            "A",
            "C",
            &[Some("C"), Some("A"), Some("A")],
            Some("A"),
            (2, 1),
        );
        assert_eq!(detect_comeback(&m, Side::Player1), Some(1));
    }

    #[test]
    fn test_deficit_magnitude_is_maximum() {
        let m = match_between(
            "A",
            "B",
            &[Some("B"), Some("B"), Some("A"), Some("A"), Some("A")],
            Some("A"),
            (3, 2),
        );
        assert_eq!(detect_comeback(&m, Side::Player1), Some(2));
    }

    #[test]
    fn test_player2_perspective() {
        let m = match_between("A", "B", &[Some("A"), Some("B"), Some("B")], Some("B"), (1, 2));
        assert_eq!(detect_comeback(&m, Side::Player2), Some(1));
    }

    #[test]
    fn test_tied_is_not_behind() {
        let m = match_between("A", "B", &[None, Some("A"), Some("B"), Some("A")], Some("A"), (2, 1));
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }

    #[test]
    fn test_unknown_round_winner_is_a_draw() {
        let m = match_between("A", "B", &[Some("Z"), Some("A")], Some("A"), (1, 0));
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }

    #[test]
    fn test_missing_participant_id_skips_detection() {
        let mut m = match_between("A", "B", &[Some("B"), Some("A"), Some("A")], Some("A"), (2, 1));
        if let Some(p2) = m.player2.as_mut() {
            p2.id = None;
        }
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }

    #[test]
    fn test_no_rounds() {
        let m = match_between("A", "B", &[], Some("A"), (2, 0));
        assert_eq!(detect_comeback(&m, Side::Player1), None);
    }
}
