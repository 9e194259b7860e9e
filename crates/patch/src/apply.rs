//! Patch application.
//!
//! [`apply`] clones the base document once, then runs each operation
//! against the working copy in encoded order. Any failing operation
//! aborts the whole patch; because only the clone was ever touched, the
//! caller's base stays valid as the pre-patch snapshot.

use serde_json::Value;

use crate::pointer::{format_pointer, is_valid_index};
use crate::types::{ApplyError, Op, PatchError};

/// Immutable navigation to the value at `path`.
fn get_at<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    doc.pointer(&format_pointer(path))
}

/// Mutable navigation to the value at `path` (must exist).
fn get_mut_at<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    let ptr = format_pointer(path);
    doc.pointer_mut(&ptr).ok_or(PatchError::NotFound)
}

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent_path, key) = path.split_at(path.len() - 1);
    let key = &key[0];
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                Ok(())
            } else {
                if !is_valid_index(key) {
                    return Err(PatchError::InvalidIndex);
                }
                let idx: usize = key.parse().map_err(|_| PatchError::InvalidIndex)?;
                if idx > arr.len() {
                    return Err(PatchError::InvalidIndex);
                }
                arr.insert(idx, value);
                Ok(())
            }
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidTarget);
    }
    let (parent_path, key) = path.split_at(path.len() - 1);
    let key = &key[0];
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => map.shift_remove(key).ok_or(PatchError::NotFound),
        Value::Array(arr) => {
            if !is_valid_index(key) {
                return Err(PatchError::InvalidIndex);
            }
            let idx: usize = key.parse().map_err(|_| PatchError::InvalidIndex)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let target = get_mut_at(doc, path)?;
    *target = value;
    Ok(())
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let src = get_at(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    if path.len() > from.len() && path[..from.len()] == from[..] {
        return Err(PatchError::MoveIntoChildren);
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get_at(doc, path).ok_or(PatchError::NotFound)?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::TestFailed)
    }
}

/// Apply a single operation to the document in place.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path).map(|_| ()),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => apply_test(doc, path, value),
    }
}

/// Apply a patch to `base`, producing the next document.
///
/// `base` is cloned up front and never mutated. Operations run in encoded
/// order; the first failure aborts with an [`ApplyError`] naming the
/// offending op, and no partial result escapes.
pub fn apply(base: &Value, ops: &[Op]) -> Result<Value, ApplyError> {
    let mut working = base.clone();
    for (index, op) in ops.iter().enumerate() {
        apply_op(&mut working, op).map_err(|source| ApplyError {
            index,
            op_name: op.op_name(),
            source,
        })?;
    }
    Ok(working)
}
