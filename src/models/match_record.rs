//! Match record model: one completed contest between two participants.

use serde::{Deserialize, Serialize};

use super::{Participant, ParticipantId};

/// One sub-game within a match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    /// Absent for a drawn round
    #[serde(default)]
    pub winner_id: Option<ParticipantId>,
}

/// Which side of a match a participant played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

/// A completed match as stored in a run artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub player1: Option<Participant>,

    #[serde(default)]
    pub player2: Option<Participant>,

    /// Chronological; index order is play order
    #[serde(default)]
    pub rounds: Vec<Round>,

    /// Absent for an overall draw
    #[serde(default)]
    pub winner_id: Option<ParticipantId>,

    /// Embedded winner, written by older artifacts instead of `winner_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Participant>,

    /// Final tallies; not necessarily derivable from `rounds`
    #[serde(default)]
    pub player1_score: Option<u32>,

    #[serde(default)]
    pub player2_score: Option<u32>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub completed_at: Option<String>,
}

impl MatchRecord {
    /// Both participants, if the record names them.
    pub fn participants(&self) -> Option<(&Participant, &Participant)> {
        Some((self.player1.as_ref()?, self.player2.as_ref()?))
    }

    pub fn participant(&self, side: Side) -> Option<&Participant> {
        match side {
            Side::Player1 => self.player1.as_ref(),
            Side::Player2 => self.player2.as_ref(),
        }
    }

    pub fn score(&self, side: Side) -> Option<u32> {
        match side {
            Side::Player1 => self.player1_score,
            Side::Player2 => self.player2_score,
        }
    }

    /// Overall winner id, preferring `winner_id` over an embedded winner.
    pub fn resolved_winner_id(&self) -> Option<&ParticipantId> {
        self.winner_id
            .as_ref()
            .or_else(|| self.winner.as_ref().and_then(|w| w.id.as_ref()))
    }

    /// Side that won the match.
    ///
    /// `None` covers both a declared draw and a winner id that matches
    /// neither participant.
    pub fn winning_side(&self) -> Option<Side> {
        let winner = self.resolved_winner_id()?;
        let (p1, p2) = self.participants()?;
        if p1.is(winner) {
            Some(Side::Player1)
        } else if p2.is(winner) {
            Some(Side::Player2)
        } else {
            None
        }
    }

    /// Display label of the winner, or "Draw".
    pub fn winner_label(&self) -> String {
        match self.winning_side().and_then(|side| self.participant(side)) {
            Some(p) => p.display_name.clone(),
            None => match &self.winner {
                Some(w) if !w.display_name.is_empty() => w.display_name.clone(),
                _ => "Draw".to_string(),
            },
        }
    }

    /// Whether per-round results were recorded; matches without them are left
    /// out of round counts and comeback detection.
    pub fn has_round_data(&self) -> bool {
        !self.rounds.is_empty()
    }

    /// "A vs B" label used for per-match rankings.
    pub fn pairing_label(&self) -> String {
        let name = |p: Option<&Participant>| {
            p.map(|p| p.display_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".to_string())
        };
        format!(
            "{} vs {}",
            name(self.player1.as_ref()),
            name(self.player2.as_ref())
        )
    }
}

/// A run artifact file; the match lives under the `match` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifact {
    #[serde(rename = "match", default)]
    pub match_record: Option<MatchRecord>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::match_between;
    use super::*;

    #[test]
    fn test_winning_side() {
        let m = match_between("A", "B", &[], Some("B"), (1, 2));
        assert_eq!(m.winning_side(), Some(Side::Player2));

        let draw = match_between("A", "B", &[], None, (1, 1));
        assert_eq!(draw.winning_side(), None);

        let stray = match_between("A", "B", &[], Some("Z"), (2, 0));
        assert_eq!(stray.winning_side(), None);
    }

    #[test]
    fn test_embedded_winner_fallback() {
        let mut m = match_between("A", "B", &[], None, (2, 0));
        m.winner = Some(Participant::new("A", "A"));
        assert_eq!(m.winning_side(), Some(Side::Player1));
        assert_eq!(m.winner_label(), "A");
    }

    #[test]
    fn test_winner_label_draw() {
        let m = match_between("A", "B", &[], None, (1, 1));
        assert_eq!(m.winner_label(), "Draw");
    }

    #[test]
    fn test_pairing_label_missing_player() {
        let mut m = match_between("A", "B", &[], None, (0, 0));
        m.player2 = None;
        assert_eq!(m.pairing_label(), "A vs -");
        assert!(m.participants().is_none());
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{
            "match": {
                "player1": {"id": 1, "display_name": "Alpha"},
                "player2": {"id": 2, "display_name": "Beta"},
                "rounds": [{"winner_id": 1}, {"winner_id": null}, {"winner_id": 1}],
                "winner_id": 1,
                "player1_score": 2,
                "player2_score": 0,
                "status": "completed"
            }
        }"#;

        let artifact: RunArtifact = serde_json::from_str(json).unwrap();
        let m = artifact.match_record.unwrap();
        assert_eq!(m.rounds.len(), 3);
        assert!(m.rounds[1].winner_id.is_none());
        assert_eq!(m.winning_side(), Some(Side::Player1));
        assert_eq!(m.score(Side::Player1), Some(2));
    }

    #[test]
    fn test_artifact_without_match() {
        let artifact: RunArtifact = serde_json::from_str("{}").unwrap();
        assert!(artifact.match_record.is_none());
    }
}
