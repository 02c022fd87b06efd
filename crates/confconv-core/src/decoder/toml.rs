//! TOML → value tree.
//!
//! TOML has no null, so a missing key is simply absent from the mapping.
//! Datetimes have no counterpart in the value model and are kept as their
//! RFC 3339 text.

use super::line_col;
use crate::error::{DecodeError, DecodeResult};
use crate::format::Format;
use crate::value::{Mapping, Value};

pub(super) fn decode(text: &str) -> DecodeResult<Value> {
    let table: ::toml::Table = text.parse().map_err(|e: ::toml::de::Error| {
        let err = DecodeError::new(Format::Toml, e.message().trim_end().to_string());
        match e.span() {
            Some(span) => {
                let (line, column) = line_col(text, span.start);
                err.at(line, column)
            }
            None => err,
        }
    })?;
    Ok(Value::Mapping(from_table(table)))
}

fn from_table(table: ::toml::Table) -> Mapping {
    let mut out = Mapping::with_capacity(table.len());
    for (key, item) in table {
        out.insert(key, from_toml(item));
    }
    out
}

fn from_toml(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::Integer(i),
        ::toml::Value::Float(f) => Value::Float(f),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_toml).collect())
        }
        ::toml::Value::Table(table) => Value::Mapping(from_table(table)),
    }
}
