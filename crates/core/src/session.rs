//! Per-client conversational state.
//!
//! A session holds a rolling history, a compacted summary of older turns,
//! and the last delivered reply. History and summary are never both full:
//! once history grows past the threshold it is folded into the summary and
//! cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::message::{Role, Turn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub history: Vec<Turn>,
    pub summary: String,
    pub last_reply: String,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: Vec::new(),
            summary: String::new(),
            last_reply: String::new(),
            updated_at: now,
        }
    }

    /// Append one completed exchange and remember the delivered reply.
    pub fn record_turn(&mut self, utterance: &str, reply: &str, now: DateTime<Utc>) {
        self.history.push(Turn::new(Role::User, utterance, now));
        self.history.push(Turn::new(Role::Assistant, reply, now));
        self.last_reply = reply.to_string();
        self.updated_at = now;
    }

    /// Whether history has grown past `threshold` turns.
    pub fn needs_compaction(&self, threshold: usize) -> bool {
        self.history.len() > threshold
    }

    /// Replace the summary and drop the raw history in one step.
    pub fn compact(&mut self, summary: String, now: DateTime<Utc>) {
        self.summary = summary;
        self.history.clear();
        self.updated_at = now;
    }

    /// History rendered one turn per line.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary followed by the raw history, the full memory of this client.
    pub fn context(&self) -> String {
        match (self.summary.is_empty(), self.history.is_empty()) {
            (true, _) => self.transcript(),
            (false, true) => self.summary.clone(),
            (false, false) => format!("{}\n{}", self.summary, self.transcript()),
        }
    }
}

/// Keep at most the last `max_chars` characters of `text`.
pub fn clamp_tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

/// Keep at most the first `max_chars` characters of `text`.
pub fn clamp_head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
