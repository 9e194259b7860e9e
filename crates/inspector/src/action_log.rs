//! Append-only action history.
//!
//! The log is the panel's source of truth for what happened: one entry
//! per processed `newAction` event, in arrival order, each carrying the
//! full before/after state snapshots. Entries are immutable once
//! appended; a later reconstruction failure never rewrites history.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::event::{Action, EntryId};

/// One processed action: id, wall-clock time, the action itself, and the
/// state before and after it was applied.
///
/// When the action's diff failed to apply, `previous_state` and `state`
/// are equal: the entry records that the action arrived but moved
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub time: String,
    pub action: Action,
    #[serde(rename = "previousState")]
    pub previous_state: Value,
    pub state: Value,
}

/// Scannable table projection of a [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: EntryId,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Ordered, append-only collection of [`LogEntry`].
///
/// Arrival order is the only order; a `HashMap` side index makes lookup
/// by id O(1). Ids are source-assigned and assumed unique, but the input
/// is untrusted: a duplicate id still appends (the log records arrivals
/// and never deduplicates) and [`ActionLog::find`] keeps returning the
/// first occurrence.
#[derive(Debug, Default, Clone)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
    by_id: HashMap<EntryId, usize>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end. Never fails.
    pub fn append(&mut self, entry: LogEntry) {
        self.by_id.entry(entry.id.clone()).or_insert(self.entries.len());
        self.entries.push(entry);
    }

    /// Look up an entry by id; first occurrence wins on duplicates.
    pub fn find(&self, id: &EntryId) -> Option<&LogEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// Empty the log. The current state and any selection are owned
    /// elsewhere and deliberately untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_id.clear();
    }

    /// All entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table rows in arrival order.
    pub fn rows(&self) -> Vec<Row> {
        self.entries
            .iter()
            .map(|e| Row {
                id: e.id.clone(),
                time: e.time.clone(),
                kind: e.action.kind.clone(),
            })
            .collect()
    }

    /// Rebuild from a persisted entry list (arrival order preserved).
    pub(crate) fn from_entries(entries: Vec<LogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.append(entry);
        }
        log
    }
}
