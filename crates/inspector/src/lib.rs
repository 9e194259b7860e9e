//! State reconstruction and action-log engine for a Redux-store
//! inspector panel.
//!
//! An instrumented application streams dispatched actions and state
//! diffs over a transport; this crate rebuilds full state snapshots from
//! those diffs, keeps an ordered log of `(action, previous state, new
//! state)` entries, scopes the displayed state to a dotted filter path,
//! and injects synthetic actions back into the running application.
//!
//! The entry point is [`Inspector`]: construct it over a [`Transport`],
//! feed it [`InboundEvent`]s, and read the reconstructed state, log rows,
//! and selection from its accessor surface. Malformed or inapplicable
//! diffs never corrupt the log: the state falls back to its previous
//! value and a [`Diagnostic`] is reported instead.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use store_inspector::{Action, EntryId, Inspector, NullTransport};
//!
//! let mut inspector = Inspector::new(NullTransport::default());
//! inspector.on_init_store(json!({"count": 0}));
//! inspector.on_new_action(
//!     EntryId::Num(1),
//!     "12:00:00".to_string(),
//!     Action { kind: "INC".to_string(), payload: json!({}) },
//!     Some(r#"[{"op": "replace", "path": "/count", "value": 1}]"#.to_string()),
//! );
//! assert_eq!(inspector.state(), &json!({"count": 1}));
//! assert_eq!(inspector.log().len(), 1);
//! ```

pub mod action_log;
pub mod controller;
pub mod event;
pub mod filter;
pub mod session;
pub mod store;
pub mod transport;

pub use action_log::{ActionLog, LogEntry, Row};
pub use controller::{
    Change, Diagnostic, Inspector, InspectorConfig, PayloadFallback, SubscriptionId,
};
pub use event::{Action, ActionEvent, EntryId, EventDecodeError, InboundEvent, InitStoreEvent};
pub use filter::{resolve, resolve_checked, FilterError, FilteredState};
pub use session::SessionSnapshot;
pub use store::StateStore;
pub use transport::{NullTransport, Transport, TransportError};
