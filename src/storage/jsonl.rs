//! JSONL (JSON Lines) parsing.
//!
//! Run lists are published as JSONL: each non-blank line is one JSON object.
//! A line that fails to parse is logged and skipped so one bad record does
//! not hide the rest of the file.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Entities parsed from a JSONL document.
#[derive(Debug, Clone)]
pub struct JsonlParse<T> {
    pub items: Vec<T>,
    /// Non-blank lines that failed to parse
    pub skipped: usize,
}

/// Parse JSONL `text`. `origin` names the source in log messages.
pub fn parse_jsonl<T: DeserializeOwned>(text: &str, origin: &str) -> JsonlParse<T> {
    let mut items = Vec::new();
    let mut skipped = 0;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str(line) {
            Ok(entity) => items.push(entity),
            Err(e) => {
                warn!("Failed to parse line {} in {}: {}", idx + 1, origin, e);
                skipped += 1;
            }
        }
    }

    debug!("Read {} entities from {}", items.len(), origin);
    JsonlParse { items, skipped }
}
