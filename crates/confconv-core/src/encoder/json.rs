//! Value tree → JSON through `serde_json`.
//!
//! Integers are written as integers and floats keep their fraction or
//! exponent (`2.0`, `1e300`), so re-decoding restores the same variants.

use crate::error::{EncodeError, EncodeResult};
use crate::format::Format;
use crate::value::Value;

pub(super) fn encode(value: &Value, pretty: bool) -> EncodeResult<String> {
    // serde_json would quietly print `null` for these.
    if let Some((path, found)) = value.find(|v| matches!(v, Value::Float(f) if !f.is_finite())) {
        let value = match found {
            Value::Float(f) => *f,
            _ => f64::NAN,
        };
        return Err(EncodeError::NonFiniteFloat {
            format: Format::Json,
            path,
            value,
        });
    }

    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| EncodeError::Serialize {
        format: Format::Json,
        message: e.to_string(),
    })
}
