//! Value tree → YAML block style.
//!
//! Output is fully deterministic:
//!
//! - **Mappings**: `key: value`, nested collections indented by two spaces
//! - **Sequences**: `- item`, indented under their key; a mapping item puts
//!   its first entry on the dash line
//! - **Long keys**: 1024 chars or more use the explicit `? key` / `: value` form
//! - **Empty collections**: flow style `[]` / `{}`
//! - **Strings**: plain when unambiguous, otherwise double-quoted with escapes
//! - **Floats**: always carry a `.` so no reader mistakes them for integers

use crate::decoder::resolve_plain_yaml;
use crate::value::{Mapping, Value};

/// YAML readers stop looking for the `:` of an implicit key after 1024 chars.
const MAX_IMPLICIT_KEY: usize = 1024;

pub(super) fn encode(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => encode_mapping(map, 0, false, &mut out),
        Value::Sequence(items) if !items.is_empty() => encode_sequence(items, 0, false, &mut out),
        _ => {
            encode_scalar(value, &mut out);
            out.push('\n');
        }
    }
    out
}

/// Emit mapping entries at `depth`. With `inline_first`, the caller already
/// wrote the indentation for the first entry (a `- ` list marker).
fn encode_mapping(map: &Mapping, depth: usize, inline_first: bool, out: &mut String) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 || !inline_first {
            out.push_str(&make_indent(depth));
        }
        encode_key(key, depth, out);
        match value {
            Value::Mapping(child) if !child.is_empty() => {
                out.push('\n');
                encode_mapping(child, depth + 1, false, out);
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                encode_sequence(items, depth + 1, false, out);
            }
            _ => {
                out.push(' ');
                encode_scalar(value, out);
                out.push('\n');
            }
        }
    }
}

/// Write `key:`, or `? key` then `:` on its own line at `depth` when the key
/// is too long to be an implicit key. Leaves the cursor right after the `:`.
fn encode_key(key: &str, depth: usize, out: &mut String) {
    let mut text = String::with_capacity(key.len());
    encode_string(key, &mut text);
    if text.chars().count() < MAX_IMPLICIT_KEY {
        out.push_str(&text);
    } else {
        out.push_str("? ");
        out.push_str(&text);
        out.push('\n');
        out.push_str(&make_indent(depth));
    }
    out.push(':');
}

/// Emit `- item` lines at `depth`; `inline_first` as in [`encode_mapping`].
fn encode_sequence(items: &[Value], depth: usize, inline_first: bool, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            out.push_str(&make_indent(depth));
        }
        out.push_str("- ");
        match item {
            Value::Mapping(map) if !map.is_empty() => encode_mapping(map, depth + 1, true, out),
            Value::Sequence(inner) if !inner.is_empty() => {
                encode_sequence(inner, depth + 1, true, out)
            }
            _ => {
                encode_scalar(item, out);
                out.push('\n');
            }
        }
    }
}

/// Scalars and empty collections.
fn encode_scalar(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => encode_string(s, out),
        Value::Sequence(_) => out.push_str("[]"),
        Value::Mapping(_) => out.push_str("{}"),
    }
}

/// `1.0`, `-0.5`, `1.0e+16`, `.inf`, `-.inf`, `.nan`.
///
/// YAML 1.1 readers only accept an exponent after a `.` and with a sign, so
/// `{:?}` output like `1e16` is normalized.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f == f64::INFINITY {
        return ".inf".to_string();
    }
    if f == f64::NEG_INFINITY {
        return "-.inf".to_string();
    }
    let repr = format!("{:?}", f);
    let Some(idx) = repr.find('e') else {
        return repr;
    };
    let (mantissa, exponent) = (&repr[..idx], &repr[idx + 1..]);
    let mut out = String::with_capacity(repr.len() + 3);
    out.push_str(mantissa);
    if !mantissa.contains('.') {
        out.push_str(".0");
    }
    out.push('e');
    if !exponent.starts_with('-') {
        out.push('+');
    }
    out.push_str(exponent);
    out
}

fn encode_string(s: &str, out: &mut String) {
    if !needs_quoting(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if needs_escape(c) => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02X}", code));
                } else {
                    out.push_str(&format!("\\u{:04X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Characters a YAML reader would not take literally inside quotes.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}')
}

/// Determine whether a string must be quoted to decode back as the same string.
///
/// A string MUST be quoted if it:
/// - Is empty or has leading/trailing whitespace
/// - Would resolve to null, a boolean or a number as a plain scalar
/// - Starts like a number (`1.2.3`, `2024-01-01`, `12:30`) that other YAML 1.1
///   readers turn into dates or base-60 integers
/// - Is a one-letter boolean (`y`, `N`) in YAML 1.1 or the merge key `<<`
/// - Starts with an indicator character or a document marker
/// - Contains `: `, ` #`, a trailing colon, flow indicators or control chars
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    if resolve_plain_yaml(s).is_some() {
        return true;
    }
    if matches!(s, "y" | "Y" | "n" | "N" | "<<" | "=") {
        return true;
    }
    if looks_numeric(s) {
        return true;
    }
    let first = s.chars().next().unwrap_or(' ');
    if matches!(
        first,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>'
            | '\'' | '"' | '%' | '@' | '`'
    ) {
        return true;
    }
    if s.starts_with("...") {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    s.chars()
        .any(|c| matches!(c, '[' | ']' | '{' | '}' | ',') || c == '\t' || needs_escape(c))
}

/// Starts with a digit, or with a sign/dot followed by a digit.
fn looks_numeric(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+' | '-' | '.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Generate a 2-space-per-level indentation string.
fn make_indent(depth: usize) -> String {
    "  ".repeat(depth)
}
