//! Decoders: raw bytes in a declared format → [`Value`] tree.
//!
//! Every decoder shares the same front door: the input must be UTF-8 and an
//! optional byte-order mark is dropped. After that each format has its own
//! module, and [`decode`] picks one with an exhaustive match on [`Format`].
//!
//! # Example
//! ```
//! use confconv_core::{decode, Format, Value};
//!
//! let value = decode(b"port: 8080\n", Format::Yaml).unwrap();
//! assert_eq!(value.get("port"), Some(&Value::Integer(8080)));
//! ```

mod json;
mod toml;
mod yaml;

use crate::error::{DecodeError, DecodeResult};
use crate::format::Format;
use crate::value::Value;

pub use self::yaml::MAX_ALIAS_NODES;
pub(crate) use self::yaml::resolve_plain as resolve_plain_yaml;

const UTF8_BOM: &str = "\u{feff}";

/// Decode `input` as a document in `format`.
pub fn decode(input: &[u8], format: Format) -> DecodeResult<Value> {
    let text = std::str::from_utf8(input).map_err(|e| {
        DecodeError::new(format, format!("input is not valid UTF-8: {}", e))
    })?;
    decode_str(text, format)
}

/// Decode already-validated text as a document in `format`.
pub fn decode_str(text: &str, format: Format) -> DecodeResult<Value> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let value = match format {
        Format::Json => json::decode(text)?,
        Format::Yaml => yaml::decode(text)?,
        Format::Toml => toml::decode(text)?,
    };
    tracing::debug!(%format, root = value.kind(), "decoded document");
    Ok(value)
}

/// Translate a byte offset into 1-based line and column (columns count chars).
pub(crate) fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
