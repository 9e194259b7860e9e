//! Session persistence surface.
//!
//! The host application may persist the panel's state across reconnects
//! and reloads. The snapshot is plain serde data so the mechanism that
//! stores it stays external; the controller only promises that a
//! restored snapshot reads coherently even before the next live event
//! arrives.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action_log::LogEntry;
use crate::event::EntryId;

/// Everything the panel persists: log entries in arrival order, the
/// selection (which may dangle after restore), the filter path, and the
/// last reconstructed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub entries: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_path: Option<String>,
    pub state: Value,
}
