//! The reconstruction controller.
//!
//! [`Inspector`] owns every piece of panel state (the reconstructed
//! store value, the action log, the selection, and the filter) and
//! drives them together from inbound transport events. Each `newAction`
//! event runs one atomic pipeline pass: snapshot the base, apply the
//! diff (or fall back on failure), publish the new state, recompute the
//! filtered view, and append the log entry. `&mut self` makes
//! interleaved pipeline runs unrepresentable, which is the whole
//! single-threaded discipline the log's `previousState` snapshots rely
//! on.
//!
//! No failure escapes this module: bad patches, unusable filter paths,
//! unparsable dispatch payloads, and transport faults all degrade to a
//! fallback value plus a [`Diagnostic`] (mirrored to the `log` facade).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use store_inspector_patch::{apply, parse_patch};

use crate::action_log::{ActionLog, LogEntry, Row};
use crate::event::{Action, EntryId, InboundEvent};
use crate::filter::{resolve, resolve_checked, FilteredState};
use crate::session::SessionSnapshot;
use crate::store::StateStore;
use crate::transport::Transport;

/// What to substitute when the operator's dispatch payload text is not
/// valid JSON.
///
/// Two revisions of the historical panel disagreed here: the earlier one
/// substituted an empty object, the later one the raw text. The policy
/// is explicit so the two are never mixed silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFallback {
    /// Send the raw text as a JSON string (later revision; default).
    #[default]
    RawString,
    /// Send `{}` (earlier revision).
    EmptyObject,
}

/// Behavioral knobs for the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    #[serde(default)]
    pub payload_fallback: PayloadFallback,
}

/// Which piece of panel state an operation moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    State,
    Log,
    Selection,
    Filter,
}

/// An operator-visible recovered failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A diff could not be applied; the state did not advance and the
    /// log entry was frozen at the previous snapshot.
    PatchFailed { action_kind: String, reason: String },
    /// A filter path could not be resolved; the view fell back to the
    /// unfiltered state.
    FilterFailed { path: String, reason: String },
}

type Observer = Box<dyn Fn(&Change)>;
type DiagnosticSink = Box<dyn Fn(&Diagnostic)>;

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

/// The inspector panel's core: state reconstruction, action log,
/// selection, filter, and outbound dispatch over an injected transport.
pub struct Inspector<T: Transport> {
    transport: T,
    config: InspectorConfig,
    store: StateStore,
    log: ActionLog,
    selection: Option<EntryId>,
    filter_path: Option<String>,
    filtered: FilteredState,
    observers: Vec<(usize, Observer)>,
    next_observer: usize,
    diagnostics: Option<DiagnosticSink>,
}

impl<T: Transport> Inspector<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, InspectorConfig::default())
    }

    pub fn with_config(transport: T, config: InspectorConfig) -> Self {
        let store = StateStore::new();
        let filtered = resolve(store.get(), None);
        Self {
            transport,
            config,
            store,
            log: ActionLog::new(),
            selection: None,
            filter_path: None,
            filtered,
            observers: Vec::new(),
            next_observer: 0,
            diagnostics: None,
        }
    }

    // ── Read surface ──────────────────────────────────────────────────

    /// The live reconstructed state.
    pub fn state(&self) -> &Value {
        self.store.get()
    }

    /// The state scoped to the current filter path.
    pub fn filtered(&self) -> &FilteredState {
        &self.filtered
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    /// Table rows for the log, in arrival order.
    pub fn rows(&self) -> Vec<Row> {
        self.log.rows()
    }

    pub fn selection(&self) -> Option<&EntryId> {
        self.selection.as_ref()
    }

    pub fn filter_path(&self) -> Option<&str> {
        self.filter_path.as_deref()
    }

    /// The selected log entry, if the selection still resolves.
    ///
    /// A selection can dangle (picked before a clear, or restored from
    /// a persisted session) and then this is simply `None`: the detail
    /// panel renders nothing, it does not error.
    pub fn selected_entry(&self) -> Option<&LogEntry> {
        self.selection.as_ref().and_then(|id| self.log.find(id))
    }

    // ── Change notification ───────────────────────────────────────────

    /// Register an observer called after every completed mutation.
    pub fn subscribe(&mut self, f: impl Fn(&Change) + 'static) -> SubscriptionId {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.push((id, Box::new(f)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(oid, _)| *oid != id.0);
    }

    /// Install the diagnostic sink. Diagnostics are additionally
    /// mirrored to `log::warn!` regardless of the sink.
    pub fn set_diagnostics(&mut self, sink: impl Fn(&Diagnostic) + 'static) {
        self.diagnostics = Some(Box::new(sink));
    }

    fn notify(&self, change: Change) {
        for (_, observer) in &self.observers {
            observer(&change);
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::PatchFailed { action_kind, reason } => {
                log::warn!("patch for action '{action_kind}' not applied: {reason}");
            }
            Diagnostic::FilterFailed { path, reason } => {
                log::warn!("filter path '{path}' not resolved: {reason}");
            }
        }
        if let Some(sink) = &self.diagnostics {
            sink(&diagnostic);
        }
    }

    // ── Inbound events ────────────────────────────────────────────────

    /// Route a decoded transport event.
    pub fn on_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::InitStore(e) => self.on_init_store(e.state),
            InboundEvent::NewAction(e) => self.on_new_action(e.id, e.time, e.action, e.diff),
        }
    }

    /// `initStore`: unconditionally replace the current state. The log,
    /// selection, and filter path are untouched; the filtered view is
    /// recomputed because the state it derives from moved.
    pub fn on_init_store(&mut self, state: Value) {
        self.store.set(state);
        self.recompute_filtered();
        self.notify(Change::State);
    }

    /// `newAction`: one atomic pipeline pass.
    ///
    /// The base snapshot taken here is what the log entry records as
    /// `previousState`; a failed diff freezes the entry at that snapshot
    /// (`previous_state == state`) instead of desynchronizing the
    /// reconstruction.
    pub fn on_new_action(
        &mut self,
        id: EntryId,
        time: String,
        action: Action,
        diff: Option<String>,
    ) {
        let base = self.store.snapshot();

        let new_state = match &diff {
            None => base.clone(),
            Some(wire) => {
                let attempt = parse_patch(wire)
                    .map_err(|e| e.to_string())
                    .and_then(|ops| apply(&base, &ops).map_err(|e| e.to_string()));
                match attempt {
                    Ok(next) => next,
                    Err(reason) => {
                        self.report(Diagnostic::PatchFailed {
                            action_kind: action.kind.clone(),
                            reason,
                        });
                        base.clone()
                    }
                }
            }
        };

        self.store.set(new_state.clone());
        self.recompute_filtered();
        self.log.append(LogEntry {
            id,
            time,
            action,
            previous_state: base,
            state: new_state,
        });
        self.notify(Change::State);
        self.notify(Change::Log);
    }

    // ── Operator input ────────────────────────────────────────────────

    /// Replace the selection. `None` clears it. Not validated against
    /// the log; see [`Inspector::selected_entry`] for dangling behavior.
    pub fn select(&mut self, id: Option<EntryId>) {
        self.selection = id;
        self.notify(Change::Selection);
    }

    /// Replace the filter path and recompute the filtered view from the
    /// *current* state, so editing the filter updates the panel without
    /// waiting for the next event.
    pub fn set_filter_path(&mut self, path: Option<String>) {
        self.filter_path = path.filter(|p| !p.is_empty());
        self.recompute_filtered();
        self.notify(Change::Filter);
    }

    /// Empty the log. The current state and selection are deliberately
    /// untouched: this is "clear history", not "reset session".
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.notify(Change::Log);
    }

    /// Send a synthetic action to the instrumented application.
    ///
    /// Best-effort fire-and-forget: a disconnected transport makes this
    /// a no-op, and a send failure is swallowed with a debug log. The
    /// payload text is parsed as JSON; trimmed-empty text becomes `[]`
    /// and unparsable text degrades per [`PayloadFallback`].
    pub fn dispatch(&mut self, type_text: &str, payload_text: &str) {
        if !self.transport.is_connected() {
            return;
        }
        let payload = if payload_text.trim().is_empty() {
            json!([])
        } else {
            match serde_json::from_str(payload_text) {
                Ok(value) => value,
                Err(_) => match self.config.payload_fallback {
                    PayloadFallback::RawString => Value::String(payload_text.to_string()),
                    PayloadFallback::EmptyObject => json!({}),
                },
            }
        };
        let params = json!({ "type": type_text, "payload": payload });
        if let Err(e) = self.transport.send("dispatchAction", params) {
            log::debug!("dispatchAction send failed: {e}");
        }
    }

    // ── Session persistence ───────────────────────────────────────────

    /// Snapshot the persistable surface: log entries, selection, filter
    /// path, and the current state.
    pub fn save_session(&self) -> SessionSnapshot {
        SessionSnapshot {
            entries: self.log.iter().cloned().collect(),
            selection: self.selection.clone(),
            filter_path: self.filter_path.clone(),
            state: self.store.snapshot(),
        }
    }

    /// Restore a persisted session wholesale.
    ///
    /// The restored log may dangle against the restored state until the
    /// next `initStore`/`newAction` arrives; everything still reads
    /// coherently in the meantime.
    pub fn restore_session(&mut self, snapshot: SessionSnapshot) {
        self.log = ActionLog::from_entries(snapshot.entries);
        self.selection = snapshot.selection;
        self.filter_path = snapshot.filter_path.filter(|p| !p.is_empty());
        self.store.set(snapshot.state);
        self.recompute_filtered();
        self.notify(Change::State);
        self.notify(Change::Log);
        self.notify(Change::Selection);
        self.notify(Change::Filter);
    }

    fn recompute_filtered(&mut self) {
        match resolve_checked(self.store.get(), self.filter_path.as_deref()) {
            Ok(filtered) => self.filtered = filtered,
            Err(e) => {
                let path = self.filter_path.clone().unwrap_or_default();
                self.report(Diagnostic::FilterFailed {
                    path,
                    reason: e.to_string(),
                });
                // Never leave the view stale: fall back to unfiltered.
                self.filtered = resolve(self.store.get(), None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{NullTransport, TransportError};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every send; connectivity is switchable.
    #[derive(Default, Clone)]
    struct RecordingTransport {
        connected: bool,
        sent: Rc<RefCell<Vec<(String, Value)>>>,
        fail_sends: bool,
    }

    impl Transport for RecordingTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn send(&self, method: &str, params: Value) -> Result<(), TransportError> {
            if self.fail_sends {
                return Err(TransportError::SendFailed("boom".into()));
            }
            self.sent.borrow_mut().push((method.to_string(), params));
            Ok(())
        }
    }

    fn action(kind: &str) -> Action {
        Action {
            kind: kind.to_string(),
            payload: json!({}),
        }
    }

    fn inspector() -> Inspector<NullTransport> {
        Inspector::new(NullTransport)
    }

    #[test]
    fn init_store_replaces_state_only() {
        let mut insp = inspector();
        insp.on_new_action(EntryId::Num(1), "t1".into(), action("A"), None);
        insp.select(Some(EntryId::Num(1)));
        insp.on_init_store(json!({"fresh": true}));
        assert_eq!(insp.state(), &json!({"fresh": true}));
        assert_eq!(insp.log().len(), 1);
        assert_eq!(insp.selection(), Some(&EntryId::Num(1)));
    }

    #[test]
    fn absent_diff_is_noop_with_entry() {
        let mut insp = inspector();
        insp.on_init_store(json!({"count": 0}));
        insp.on_new_action(EntryId::Num(1), "t1".into(), action("NOOP"), None);
        assert_eq!(insp.state(), &json!({"count": 0}));
        let entry = insp.log().find(&EntryId::Num(1)).unwrap();
        assert_eq!(entry.previous_state, entry.state);
    }

    #[test]
    fn good_diff_advances_state() {
        let mut insp = inspector();
        insp.on_init_store(json!({"count": 0}));
        insp.on_new_action(
            EntryId::Num(1),
            "t1".into(),
            action("INC"),
            Some(r#"[{"op": "replace", "path": "/count", "value": 1}]"#.into()),
        );
        assert_eq!(insp.state(), &json!({"count": 1}));
        let entry = insp.log().find(&EntryId::Num(1)).unwrap();
        assert_eq!(entry.previous_state, json!({"count": 0}));
        assert_eq!(entry.state, json!({"count": 1}));
    }

    #[test]
    fn bad_patch_falls_back_and_reports() {
        let diagnostics = Rc::new(RefCell::new(Vec::new()));
        let seen = diagnostics.clone();
        let mut insp = inspector();
        insp.set_diagnostics(move |d| seen.borrow_mut().push(d.clone()));
        insp.on_init_store(json!({"a": 1}));
        insp.on_new_action(
            EntryId::Num(1),
            "t1".into(),
            action("BROKEN"),
            Some(r#"[{"op": "replace", "path": "/b/c", "value": 2}]"#.into()),
        );
        assert_eq!(insp.state(), &json!({"a": 1}));
        let entry = insp.log().find(&EntryId::Num(1)).unwrap();
        assert_eq!(entry.previous_state, json!({"a": 1}));
        assert_eq!(entry.state, json!({"a": 1}));
        let recorded = diagnostics.borrow();
        assert_eq!(recorded.len(), 1);
        assert!(matches!(
            &recorded[0],
            Diagnostic::PatchFailed { action_kind, .. } if action_kind == "BROKEN"
        ));
    }

    #[test]
    fn garbage_diff_text_is_a_patch_failure_not_a_panic() {
        let mut insp = inspector();
        insp.on_init_store(json!({"a": 1}));
        insp.on_new_action(
            EntryId::Num(1),
            "t1".into(),
            action("GARBAGE"),
            Some("not json".into()),
        );
        assert_eq!(insp.state(), &json!({"a": 1}));
        assert_eq!(insp.log().len(), 1);
    }

    #[test]
    fn filter_edit_recomputes_without_new_events() {
        let mut insp = inspector();
        insp.on_init_store(json!({"x": {"y": {"z": 1}}}));
        insp.set_filter_path(Some("x.y.*".into()));
        assert_eq!(insp.filtered().to_value(), json!({"x.y.*": {"z": 1}}));
        insp.set_filter_path(None);
        assert_eq!(insp.filtered().label, "");
    }

    #[test]
    fn filtered_view_tracks_state_changes() {
        let mut insp = inspector();
        insp.on_init_store(json!({"count": 0}));
        insp.set_filter_path(Some("count".into()));
        insp.on_new_action(
            EntryId::Num(1),
            "t1".into(),
            action("INC"),
            Some(r#"[{"op": "replace", "path": "/count", "value": 1}]"#.into()),
        );
        assert_eq!(insp.filtered().to_value(), json!({"count": 1}));
    }

    #[test]
    fn pathological_filter_falls_back_to_unfiltered() {
        let diagnostics = Rc::new(RefCell::new(Vec::new()));
        let seen = diagnostics.clone();
        let mut insp = inspector();
        insp.set_diagnostics(move |d| seen.borrow_mut().push(d.clone()));
        insp.on_init_store(json!({"a": 1}));
        let deep = vec!["a"; 65].join(".");
        insp.set_filter_path(Some(deep));
        assert_eq!(insp.filtered().label, "");
        assert_eq!(insp.filtered().value, json!({"a": 1}));
        assert!(matches!(
            diagnostics.borrow()[0],
            Diagnostic::FilterFailed { .. }
        ));
    }

    #[test]
    fn clear_log_preserves_state_and_selection() {
        let mut insp = inspector();
        insp.on_init_store(json!({"a": 1}));
        insp.on_new_action(EntryId::Num(5), "t1".into(), action("A"), None);
        insp.select(Some(EntryId::Num(5)));
        insp.clear_log();
        assert!(insp.log().is_empty());
        assert_eq!(insp.state(), &json!({"a": 1}));
        assert_eq!(insp.selection(), Some(&EntryId::Num(5)));
        // Dangling selection renders as no detail, without error.
        assert!(insp.selected_entry().is_none());
        assert!(insp.log().find(&EntryId::Num(5)).is_none());
    }

    #[test]
    fn select_none_clears() {
        let mut insp = inspector();
        insp.select(Some(EntryId::Num(1)));
        insp.select(None);
        assert_eq!(insp.selection(), None);
    }

    #[test]
    fn dispatch_is_noop_when_disconnected() {
        let transport = RecordingTransport::default();
        let sent = transport.sent.clone();
        let mut insp = Inspector::new(transport);
        insp.dispatch("PING", "{}");
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn dispatch_sends_parsed_payload() {
        let transport = RecordingTransport { connected: true, ..Default::default() };
        let sent = transport.sent.clone();
        let mut insp = Inspector::new(transport);
        insp.dispatch("SET", r#"{"n": 1}"#);
        let calls = sent.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "dispatchAction");
        assert_eq!(calls[0].1, json!({"type": "SET", "payload": {"n": 1}}));
    }

    #[test]
    fn dispatch_empty_payload_becomes_array() {
        let transport = RecordingTransport { connected: true, ..Default::default() };
        let sent = transport.sent.clone();
        let mut insp = Inspector::new(transport);
        insp.dispatch("PING", "   ");
        assert_eq!(sent.borrow()[0].1, json!({"type": "PING", "payload": []}));
    }

    #[test]
    fn dispatch_parse_failure_uses_raw_string_by_default() {
        let transport = RecordingTransport { connected: true, ..Default::default() };
        let sent = transport.sent.clone();
        let mut insp = Inspector::new(transport);
        insp.dispatch("PING", "not json");
        assert_eq!(
            sent.borrow()[0].1,
            json!({"type": "PING", "payload": "not json"})
        );
    }

    #[test]
    fn dispatch_parse_failure_empty_object_policy() {
        let transport = RecordingTransport { connected: true, ..Default::default() };
        let sent = transport.sent.clone();
        let config = InspectorConfig {
            payload_fallback: PayloadFallback::EmptyObject,
        };
        let mut insp = Inspector::with_config(transport, config);
        insp.dispatch("PING", "not json");
        assert_eq!(sent.borrow()[0].1, json!({"type": "PING", "payload": {}}));
    }

    #[test]
    fn dispatch_swallows_send_failure() {
        let transport = RecordingTransport {
            connected: true,
            fail_sends: true,
            ..Default::default()
        };
        let mut insp = Inspector::new(transport);
        // Must not panic or surface anything.
        insp.dispatch("PING", "{}");
    }

    #[test]
    fn observers_fire_and_unsubscribe() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let seen = changes.clone();
        let mut insp = inspector();
        let sub = insp.subscribe(move |c| seen.borrow_mut().push(*c));
        insp.on_init_store(json!({}));
        insp.select(Some(EntryId::Num(1)));
        insp.clear_log();
        assert_eq!(
            *changes.borrow(),
            vec![Change::State, Change::Selection, Change::Log]
        );
        insp.unsubscribe(sub);
        insp.on_init_store(json!({}));
        assert_eq!(changes.borrow().len(), 3);
    }

    #[test]
    fn event_routing() {
        let mut insp = inspector();
        insp.on_event(InboundEvent::InitStore(crate::event::InitStoreEvent {
            id: EntryId::Num(0),
            time: "t0".into(),
            action: action("@@INIT"),
            state: json!({"count": 0}),
        }));
        insp.on_event(InboundEvent::NewAction(crate::event::ActionEvent {
            id: EntryId::Num(1),
            time: "t1".into(),
            action: action("INC"),
            diff: Some(r#"[{"op": "replace", "path": "/count", "value": 1}]"#.into()),
        }));
        assert_eq!(insp.state(), &json!({"count": 1}));
        assert_eq!(insp.log().len(), 1);
    }
}
