//! Wire codec for patches.
//!
//! The inspector receives each diff as a *string* whose content is a JSON
//! array of RFC 6902 operation objects. [`parse_patch`] owns the outer
//! parse; [`op_from_value`]/[`op_to_value`] convert the individual
//! operation objects. Every malformed shape maps to a typed error; the
//! diff is untrusted input and must never panic the decoder.

use serde_json::{json, Map, Value};

use crate::pointer::{format_pointer, parse_pointer};
use crate::types::{Op, PatchError};

fn decode_path(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, PatchError> {
    let v = obj
        .get(key)
        .ok_or_else(|| PatchError::InvalidOp(format!("missing '{key}' field")))?;
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("'{key}' must be a string")))?;
    if !s.is_empty() && !s.starts_with('/') {
        return Err(PatchError::InvalidOp(format!(
            "'{key}' must be empty or start with '/'"
        )));
    }
    Ok(parse_pointer(s))
}

fn decode_value(obj: &Map<String, Value>, op_name: &str) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp(format!("{op_name} requires 'value'")))
}

/// Decode a single operation object.
pub fn op_from_value(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;

    let path = decode_path(obj, "path")?;

    match op_str {
        "add" => Ok(Op::Add {
            path,
            value: decode_value(obj, "add")?,
        }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace {
            path,
            value: decode_value(obj, "replace")?,
        }),
        "copy" => Ok(Op::Copy {
            path,
            from: decode_path(obj, "from")?,
        }),
        "move" => Ok(Op::Move {
            path,
            from: decode_path(obj, "from")?,
        }),
        "test" => Ok(Op::Test {
            path,
            value: decode_value(obj, "test")?,
        }),
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Encode a single operation back into its wire object.
pub fn op_to_value(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": format_pointer(path),
            "value": value,
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": format_pointer(path),
        }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": format_pointer(path),
            "value": value,
        }),
        Op::Copy { path, from } => json!({
            "op": "copy",
            "path": format_pointer(path),
            "from": format_pointer(from),
        }),
        Op::Move { path, from } => json!({
            "op": "move",
            "path": format_pointer(path),
            "from": format_pointer(from),
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": format_pointer(path),
            "value": value,
        }),
    }
}

/// Parse a wire diff string into operations.
///
/// The string must hold a JSON array of operation objects. An empty array
/// is a valid, empty patch.
pub fn parse_patch(wire: &str) -> Result<Vec<Op>, PatchError> {
    let parsed: Value = serde_json::from_str(wire)
        .map_err(|e| PatchError::InvalidPatch(format!("not valid JSON: {e}")))?;
    let arr = parsed
        .as_array()
        .ok_or_else(|| PatchError::InvalidPatch("patch must be an array".into()))?;
    arr.iter().map(op_from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_rfc6902_patch() {
        let ops = parse_patch(
            r#"[
                {"op": "add", "path": "/foo", "value": 1},
                {"op": "remove", "path": "/bar"},
                {"op": "replace", "path": "/baz", "value": "new"},
                {"op": "copy", "path": "/a", "from": "/b"},
                {"op": "move", "path": "/c", "from": "/d"},
                {"op": "test", "path": "/e", "value": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(ops.len(), 6);
        let names: Vec<_> = ops.iter().map(Op::op_name).collect();
        assert_eq!(names, ["add", "remove", "replace", "copy", "move", "test"]);
    }

    #[test]
    fn empty_patch_is_valid() {
        assert_eq!(parse_patch("[]").unwrap(), vec![]);
    }

    #[test]
    fn escaped_path_components() {
        let ops = parse_patch(r#"[{"op": "remove", "path": "/a~0b/c~1d"}]"#).unwrap();
        assert_eq!(ops[0].path(), &vec!["a~b".to_string(), "c/d".to_string()]);
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_patch(r#"{"op": "add"}"#),
            Err(PatchError::InvalidPatch(_))
        ));
    }

    #[test]
    fn rejects_garbage_text() {
        assert!(matches!(
            parse_patch("not json at all"),
            Err(PatchError::InvalidPatch(_))
        ));
    }

    #[test]
    fn rejects_unknown_op() {
        let err = parse_patch(r#"[{"op": "frobnicate", "path": "/x"}]"#).unwrap_err();
        assert!(matches!(err, PatchError::InvalidOp(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(parse_patch(r#"[{"op": "add", "path": "/x"}]"#).is_err());
        assert!(parse_patch(r#"[{"op": "move", "path": "/x"}]"#).is_err());
        assert!(parse_patch(r#"[{"op": "add", "value": 1}]"#).is_err());
        assert!(parse_patch(r#"[{"path": "/x"}]"#).is_err());
        assert!(parse_patch(r#"[42]"#).is_err());
    }

    #[test]
    fn rejects_path_without_leading_slash() {
        // Includes a multibyte first character: the decoder must reject,
        // not panic or mis-split.
        for wire in [
            r#"[{"op": "remove", "path": "foo"}]"#,
            r#"[{"op": "remove", "path": "édf"}]"#,
            r#"[{"op": "copy", "path": "/a", "from": "b"}]"#,
        ] {
            let err = parse_patch(wire).unwrap_err();
            assert!(matches!(err, PatchError::InvalidOp(_)), "{wire}");
        }
    }

    #[test]
    fn empty_path_is_the_root() {
        let ops = parse_patch(r#"[{"op": "replace", "path": "", "value": 1}]"#).unwrap();
        assert_eq!(ops[0].path(), &Vec::<String>::new());
    }

    #[test]
    fn roundtrip_through_wire_object() {
        let ops = parse_patch(
            r#"[
                {"op": "add", "path": "/a~1b", "value": {"k": [1, 2]}},
                {"op": "move", "path": "/x", "from": "/y/0"}
            ]"#,
        )
        .unwrap();
        for op in &ops {
            let rt = op_from_value(&op_to_value(op)).unwrap();
            assert_eq!(&rt, op);
        }
    }

    #[test]
    fn add_of_null_value_is_allowed() {
        let ops = parse_patch(r#"[{"op": "add", "path": "/x", "value": null}]"#).unwrap();
        assert_eq!(ops[0], Op::Add { path: vec!["x".to_string()], value: json!(null) });
    }
}
