//! Operation model and error types.

use serde_json::Value;
use thiserror::Error;

/// A parsed JSON Pointer: one string per path step.
pub type Path = Vec<String>;

/// Reasons a single operation cannot be decoded or applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// A path step names a member or index that does not exist.
    #[error("path not found")]
    NotFound,
    /// An array step is not a valid index for the target array.
    #[error("invalid array index")]
    InvalidIndex,
    /// The parent of the target path is not an object or array.
    #[error("target is not a container")]
    InvalidTarget,
    /// A `test` operation did not match.
    #[error("test failed")]
    TestFailed,
    /// A `move` destination lies inside the moved subtree.
    #[error("cannot move into own children")]
    MoveIntoChildren,
    /// The operation object itself is malformed.
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    /// The patch wire text is not a JSON array of operations.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
}

/// An RFC 6902 operation.
///
/// Paths are pre-parsed pointer segments; see [`crate::pointer`] for the
/// escaping rules.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl Op {
    /// The operation name as it appears on the wire.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Copy { .. } => "copy",
            Op::Move { .. } => "move",
            Op::Test { .. } => "test",
        }
    }

    /// The target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. } => path,
            Op::Remove { path } => path,
            Op::Replace { path, .. } => path,
            Op::Copy { path, .. } => path,
            Op::Move { path, .. } => path,
            Op::Test { path, .. } => path,
        }
    }
}

/// Failure of a whole-patch application.
///
/// Carries enough context to tell the operator which operation broke and
/// why; the base document the caller passed in is untouched.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("op {index} ({op_name}) failed: {source}")]
pub struct ApplyError {
    /// Zero-based index of the failing operation within the patch.
    pub index: usize,
    /// Wire name of the failing operation.
    pub op_name: &'static str,
    #[source]
    pub source: PatchError,
}
