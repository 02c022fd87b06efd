//! Value tree → TOML.
//!
//! TOML is the one lossy target: it has no null and a document is always a
//! table. Both are checked up front and reported with the offending location
//! instead of dropping or coercing anything.
//!
//! Layout keeps mapping order intact. Within a table, plain `key = value`
//! lines come first and `[table]` / `[[array]]` sections follow; a nested
//! table that appears *before* a plain value in the mapping is therefore
//! written inline (`key = { ... }`) so re-decoding sees the same order.

use crate::error::{EncodeError, EncodeResult};
use crate::format::Format;
use crate::value::{Mapping, Path, Value};

pub(super) fn encode(value: &Value) -> EncodeResult<String> {
    let Value::Mapping(root) = value else {
        return Err(EncodeError::NonMappingRoot {
            format: Format::Toml,
            found: value.kind(),
        });
    };
    if let Some((path, _)) = value.find(Value::is_null) {
        return Err(EncodeError::UnsupportedNull {
            format: Format::Toml,
            path,
        });
    }

    let mut out = String::new();
    let mut header = Vec::new();
    encode_table(root, &mut header, &mut out)?;
    Ok(out)
}

/// How a mapping entry is laid out inside its table.
enum Layout {
    /// `key = value` in the table body.
    Inline,
    /// `[path.key]` section after the body.
    Table,
    /// `[[path.key]]` sections after the body.
    ArrayOfTables,
}

fn natural_layout(value: &Value) -> Layout {
    match value {
        Value::Mapping(_) => Layout::Table,
        Value::Sequence(items)
            if !items.is_empty() && items.iter().all(|item| item.as_mapping().is_some()) =>
        {
            Layout::ArrayOfTables
        }
        _ => Layout::Inline,
    }
}

/// Emit the body of `table`, then its sections, under the key path `header`.
fn encode_table(table: &Mapping, header: &mut Vec<String>, out: &mut String) -> EncodeResult<()> {
    // Sections may only follow the last plain value; earlier ones go inline.
    let last_inline = table
        .values()
        .enumerate()
        .filter(|(_, v)| matches!(natural_layout(v), Layout::Inline))
        .map(|(i, _)| i)
        .last();

    let mut sections = Vec::new();
    for (i, (key, value)) in table.iter().enumerate() {
        let layout = match last_inline {
            Some(last) if i < last => Layout::Inline,
            _ => natural_layout(value),
        };
        match layout {
            Layout::Inline => {
                out.push_str(&encode_key(key));
                out.push_str(" = ");
                encode_inline(value, out)?;
                out.push('\n');
            }
            Layout::Table | Layout::ArrayOfTables => sections.push((key, value, layout)),
        }
    }

    for (key, value, layout) in sections {
        header.push(key.clone());
        match (layout, value) {
            (Layout::Table, Value::Mapping(map)) => {
                // `[a]` with no plain values of its own is implied by `[a.b]`.
                let has_body = map
                    .values()
                    .any(|v| matches!(natural_layout(v), Layout::Inline));
                if has_body || map.is_empty() {
                    start_section(out);
                    out.push('[');
                    out.push_str(&encode_header(header));
                    out.push_str("]\n");
                }
                encode_table(map, header, out)?;
            }
            (_, Value::Sequence(items)) => {
                for item in items {
                    if let Value::Mapping(map) = item {
                        start_section(out);
                        out.push_str("[[");
                        out.push_str(&encode_header(header));
                        out.push_str("]]\n");
                        encode_table(map, header, out)?;
                    }
                }
            }
            _ => {}
        }
        header.pop();
    }
    Ok(())
}

/// Blank line between sections, none at the top of the document.
fn start_section(out: &mut String) {
    if !out.is_empty() {
        out.push('\n');
    }
}

fn encode_inline(value: &Value, out: &mut String) -> EncodeResult<()> {
    match value {
        Value::Null => {
            return Err(EncodeError::UnsupportedNull {
                format: Format::Toml,
                path: Path::root(),
            })
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => encode_string(s, out),
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                encode_inline(item, out)?;
            }
            out.push(']');
        }
        Value::Mapping(map) if map.is_empty() => out.push_str("{}"),
        Value::Mapping(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&encode_key(key));
                out.push_str(" = ");
                encode_inline(item, out)?;
            }
            out.push_str(" }");
        }
    }
    Ok(())
}

/// TOML floats need a fraction or an exponent; `{:?}` always provides one.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

/// Bare keys are `[A-Za-z0-9_-]+`; everything else is a basic string.
fn encode_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        let mut out = String::with_capacity(key.len() + 2);
        encode_string(key, &mut out);
        out
    }
}

fn encode_header(path: &[String]) -> String {
    path.iter()
        .map(|key| encode_key(key))
        .collect::<Vec<_>>()
        .join(".")
}

fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
