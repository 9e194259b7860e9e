//! JSON Pointer (RFC 6901) helpers.
//!
//! Only the pieces the patch codec and applicator need: component
//! escaping, parse/format, and array index validation.

/// Unescape a pointer component: `~1` becomes `/`, `~0` becomes `~`.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escape a pointer component: `~` becomes `~0`, `/` becomes `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a pointer string into path components.
///
/// The empty string is the root (empty path); otherwise the leading `/`
/// is stripped and each component unescaped. A non-empty string without
/// a leading `/` is not a valid pointer; callers parsing wire input
/// reject it first (see the codec), and this function maps it to the
/// root rather than guess at components.
pub fn parse_pointer(pointer: &str) -> Vec<String> {
    match pointer.strip_prefix('/') {
        Some(rest) => rest.split('/').map(unescape_component).collect(),
        None => Vec::new(),
    }
}

/// Format path components back into a pointer string.
pub fn format_pointer(path: &[String]) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Whether a string is a valid non-negative array index.
///
/// Leading zeros are rejected except for `"0"` itself, per RFC 6901.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
