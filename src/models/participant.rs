//! Match participants and their identifiers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Participant identifier, unique within a benchmark.
///
/// Artifacts written by different harness versions carry either numeric or
/// string ids, so both are accepted and normalized to a string.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
            RawId::Str(s) => Self(s),
        })
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One side of a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<ParticipantId>,

    /// Human label; statistics are grouped by this, not by `id`
    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            display_name: display_name.into(),
            provider: None,
            model_name: None,
        }
    }

    /// Aggregation key for this participant.
    ///
    /// Internal whitespace is collapsed and the ends trimmed; case is kept.
    /// Two distinct participants sharing a display name produce the same key
    /// and are merged into one set of statistics.
    ///
    /// A blank display name would merge every unnamed participant into one
    /// row, so the id is used instead, and "Unknown" when there is no id
    /// either.
    pub fn aggregation_key(&self) -> String {
        let key = self.display_name.split_whitespace().collect::<Vec<_>>().join(" ");
        if key.is_empty() {
            self.id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "Unknown".to_string())
        } else {
            key
        }
    }

    /// Whether `id` refers to this participant.
    pub fn is(&self, id: &ParticipantId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Participant entry as listed on a run in `runs.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParticipant {
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub model_name: String,

    #[serde(default)]
    pub display_name: String,
}

impl RunParticipant {
    /// `provider/model_name`, the string run search matches against.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.provider, self.model_name)
    }
}
