//! JSON → value tree, on top of `serde_json` with `preserve_order`.

use crate::error::{DecodeError, DecodeResult};
use crate::format::Format;
use crate::value::{Mapping, Value};

pub(super) fn decode(text: &str) -> DecodeResult<Value> {
    let parsed: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        let err = DecodeError::new(Format::Json, describe(&e));
        if e.line() > 0 {
            err.at(e.line(), e.column())
        } else {
            err
        }
    })?;
    Ok(from_json(parsed))
}

/// `serde_json` appends " at line X column Y" to its messages; the position is
/// carried separately so strip it here.
fn describe(e: &serde_json::Error) -> String {
    let full = e.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

/// Numbers without fraction or exponent that fit in `i64` become integers,
/// everything else (including `u64` beyond `i64::MAX`) becomes a float.
fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key, from_json(item));
            }
            Value::Mapping(out)
        }
    }
}
