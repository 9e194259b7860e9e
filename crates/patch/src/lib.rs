//! JSON Patch (RFC 6902) support for the store inspector.
//!
//! The instrumented application ships each state transition as a diff: a
//! JSON string holding an array of RFC 6902 operations. This crate owns
//! the three stages of turning that wire text into a new state snapshot:
//!
//! 1. [`parse_patch`] — wire string into typed [`Op`]s,
//! 2. [`apply`] — ops applied to a *clone* of the base document,
//! 3. typed failures ([`PatchError`], [`ApplyError`]) for everything a
//!    hostile or stale diff can do wrong.
//!
//! The base document handed to [`apply`] is never mutated, whether the
//! patch succeeds or fails. Callers that keep the base around as a
//! history snapshot can rely on it staying bit-identical.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use store_inspector_patch::{parse_patch, apply};
//!
//! let base = json!({"count": 0});
//! let ops = parse_patch(r#"[{"op": "replace", "path": "/count", "value": 1}]"#).unwrap();
//! let next = apply(&base, &ops).unwrap();
//! assert_eq!(next, json!({"count": 1}));
//! assert_eq!(base, json!({"count": 0}));
//! ```

pub mod apply;
pub mod codec;
pub mod pointer;
pub mod types;

pub use apply::apply;
pub use codec::{op_from_value, op_to_value, parse_patch};
pub use types::{ApplyError, Op, PatchError};
