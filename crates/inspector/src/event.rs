//! Inbound event model.
//!
//! The transport delivers two methods from the instrumented application:
//! `initStore` (a full state snapshot) and `newAction` (a dispatched
//! action plus an optional diff string). [`InboundEvent::decode`] turns a
//! `(method, params)` pair into a typed event; every shape defect is a
//! typed [`EventDecodeError`], never a panic, because the wire is
//! untrusted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A dispatched action: a type tag plus an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

/// Source-assigned log entry identifier.
///
/// The instrumented application may number entries or name them; both
/// forms are accepted and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Num(i64),
    Str(String),
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryId::Num(n) => write!(f, "{n}"),
            EntryId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        EntryId::Num(n)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId::Str(s.to_string())
    }
}

/// `initStore` — the application announced a fresh full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitStoreEvent {
    pub id: EntryId,
    pub time: String,
    pub action: Action,
    pub state: Value,
}

/// `newAction` — the application dispatched an action; `diff` carries the
/// state delta as a JSON Patch wire string, or is absent when the action
/// produced no state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub id: EntryId,
    pub time: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    InitStore(InitStoreEvent),
    NewAction(ActionEvent),
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("malformed {method} params: {source}")]
    BadParams {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl InboundEvent {
    /// Decode a `(method, params)` pair from the transport.
    pub fn decode(method: &str, params: Value) -> Result<InboundEvent, EventDecodeError> {
        match method {
            "initStore" => serde_json::from_value(params)
                .map(InboundEvent::InitStore)
                .map_err(|source| EventDecodeError::BadParams {
                    method: "initStore",
                    source,
                }),
            "newAction" => serde_json::from_value(params)
                .map(InboundEvent::NewAction)
                .map_err(|source| EventDecodeError::BadParams {
                    method: "newAction",
                    source,
                }),
            other => Err(EventDecodeError::UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_init_store() {
        let params = json!({
            "id": 0,
            "time": "10:00:00",
            "action": {"type": "@@INIT", "payload": {}},
            "state": {"count": 0},
        });
        let event = InboundEvent::decode("initStore", params).unwrap();
        match event {
            InboundEvent::InitStore(e) => {
                assert_eq!(e.id, EntryId::Num(0));
                assert_eq!(e.action.kind, "@@INIT");
                assert_eq!(e.state, json!({"count": 0}));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decode_new_action_with_diff() {
        let params = json!({
            "id": "a1",
            "time": "10:00:01",
            "action": {"type": "INC", "payload": [1]},
            "diff": "[{\"op\": \"replace\", \"path\": \"/count\", \"value\": 1}]",
        });
        let event = InboundEvent::decode("newAction", params).unwrap();
        match event {
            InboundEvent::NewAction(e) => {
                assert_eq!(e.id, EntryId::Str("a1".to_string()));
                assert!(e.diff.is_some());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decode_new_action_without_diff() {
        let params = json!({
            "id": 3,
            "time": "10:00:02",
            "action": {"type": "NOOP"},
        });
        let event = InboundEvent::decode("newAction", params).unwrap();
        match event {
            InboundEvent::NewAction(e) => {
                assert_eq!(e.diff, None);
                // Missing payload defaults to null.
                assert_eq!(e.action.payload, Value::Null);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_unknown_method() {
        let err = InboundEvent::decode("teardown", json!({})).unwrap_err();
        assert!(matches!(err, EventDecodeError::UnknownMethod(_)));
    }

    #[test]
    fn decode_rejects_malformed_params() {
        let err = InboundEvent::decode("newAction", json!({"id": 1})).unwrap_err();
        assert!(matches!(err, EventDecodeError::BadParams { method: "newAction", .. }));
    }

    #[test]
    fn entry_id_roundtrips_both_forms() {
        let num: EntryId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(num, EntryId::Num(7));
        let s: EntryId = serde_json::from_value(json!("seven")).unwrap();
        assert_eq!(s, EntryId::Str("seven".to_string()));
        assert_eq!(serde_json::to_value(&num).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(&s).unwrap(), json!("seven"));
    }
}
