//! Encoders: [`Value`] tree → text in a declared format.
//!
//! Each encoder checks the tree against what its format can express before
//! writing anything, so a failed encode never yields partial output:
//!
//! - **JSON** rejects NaN and infinities.
//! - **TOML** rejects a non-mapping root and any null in the tree.
//! - **YAML** accepts every value.
//!
//! # Example
//! ```
//! use confconv_core::{encode, Format, Mapping, Value};
//!
//! let mut map = Mapping::new();
//! map.insert("b", Value::Integer(1));
//! map.insert("a", Value::Float(2.0));
//! let json = encode(&Value::Mapping(map), Format::Json).unwrap();
//! assert_eq!(json, r#"{"b":1,"a":2.0}"#);
//! ```

mod json;
mod toml;
mod yaml;

use crate::error::EncodeResult;
use crate::format::Format;
use crate::value::Value;

/// Knobs that only affect layout, never content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indent JSON output by two spaces instead of writing it on one line.
    pub pretty_json: bool,
}

/// Encode `value` as `format` with default options.
pub fn encode(value: &Value, format: Format) -> EncodeResult<String> {
    encode_with_options(value, format, EncodeOptions::default())
}

/// Encode `value` as `format`.
pub fn encode_with_options(
    value: &Value,
    format: Format,
    options: EncodeOptions,
) -> EncodeResult<String> {
    let out = match format {
        Format::Json => json::encode(value, options.pretty_json)?,
        Format::Yaml => yaml::encode(value),
        Format::Toml => toml::encode(value)?,
    };
    tracing::debug!(%format, bytes = out.len(), "encoded document");
    Ok(out)
}
