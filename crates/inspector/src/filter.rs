//! Dotted-path state filtering.
//!
//! The operator narrows the displayed state with a dotted path such as
//! `todos.0.title`. Resolution fails soft: partial paths are expected
//! while the operator is still typing, so a missing step yields a null
//! terminal instead of an error.
//!
//! A trailing `*` segment stops the descent one step early and the
//! result keeps the operator's literal path text (including the `*`) as
//! its label. A `*` anywhere else is an ordinary key lookup. The result is always a single-key `{ label: value }`
//! mapping so the presentation layer renders one stable shape whether or
//! not a path is set.

use serde_json::{Map, Value};
use thiserror::Error;

/// Upper bound on filter path depth. Lookups fail soft, so the only way
/// a filter string hard-fails is by being pathological; persisted
/// sessions can replay such strings into a fresh panel.
pub const MAX_PATH_SEGMENTS: usize = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("filter path has {0} segments (max {MAX_PATH_SEGMENTS})")]
    PathTooDeep(usize),
}

/// The scoped view of the state: the operator's path label mapped to
/// whatever it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredState {
    pub label: String,
    pub value: Value,
}

impl FilteredState {
    /// The `{ label: value }` wrapping handed to the presentation layer.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.label.clone(), self.value.clone());
        Value::Object(map)
    }
}

/// One key/index lookup; `None` when the step does not resolve.
fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(arr) => segment.parse::<usize>().ok().and_then(|idx| arr.get(idx)),
        _ => None,
    }
}

/// Resolve `path` against `value`.
///
/// Absent or empty path is the identity view under the empty label. A
/// missing or non-traversable step resolves to a null terminal under the
/// original label, never an error.
pub fn resolve(value: &Value, path: Option<&str>) -> FilteredState {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => {
            return FilteredState {
                label: String::new(),
                value: value.clone(),
            }
        }
    };

    let mut current = Some(value);
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        // Wildcard in the final position: stop descending, return what
        // we reached. Anywhere else `*` is a plain key.
        if segment == "*" && segments.peek().is_none() {
            break;
        }
        current = current.and_then(|v| step(v, segment));
    }

    FilteredState {
        label: path.to_string(),
        value: current.cloned().unwrap_or(Value::Null),
    }
}

/// [`resolve`], but rejecting pathological paths instead of walking them.
///
/// The controller falls back to the unfiltered state and reports a
/// diagnostic when this fails.
pub fn resolve_checked(value: &Value, path: Option<&str>) -> Result<FilteredState, FilterError> {
    if let Some(p) = path {
        let segments = p.split('.').count();
        if segments > MAX_PATH_SEGMENTS {
            return Err(FilterError::PathTooDeep(segments));
        }
    }
    Ok(resolve(value, path))
}
