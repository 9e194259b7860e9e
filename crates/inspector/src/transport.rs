//! The transport seam.
//!
//! The session layer that talks to the instrumented application lives
//! outside this crate; the controller only needs to know whether the
//! peer is connected and how to send it a method call. Injecting the
//! trait at construction keeps the core free of ambient globals and
//! makes the pipeline testable against [`NullTransport`] and recording
//! doubles.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport disconnected")]
    Disconnected,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Outbound channel to the instrumented application.
pub trait Transport {
    /// Whether the peer currently reports itself connected.
    fn is_connected(&self) -> bool;

    /// Fire a method call at the peer. Best-effort: the caller decides
    /// whether a failure is surfaced or swallowed.
    fn send(&self, method: &str, params: Value) -> Result<(), TransportError>;
}

/// A transport with no peer: never connected, sends fail.
///
/// Useful for replay tooling and tests that exercise the reconstruction
/// pipeline without a live session.
#[derive(Debug, Default, Clone)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn is_connected(&self) -> bool {
        false
    }

    fn send(&self, _method: &str, _params: Value) -> Result<(), TransportError> {
        Err(TransportError::Disconnected)
    }
}
