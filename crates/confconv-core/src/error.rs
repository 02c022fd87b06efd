//! Error types for decoding, encoding and whole conversions.

use crate::format::Format;
use crate::value::Path;
use thiserror::Error;

/// The input could not be parsed, or used a construct the value tree cannot
/// represent. Line and column are 1-based when the parser reports them.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {format} input{}: {message}", location_suffix(.line, .column))]
pub struct DecodeError {
    pub format: Format,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl DecodeError {
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at line {}, column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

/// The value tree holds something the target format cannot express.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// TOML has no null; the first offending node is reported.
    #[error("unsupported null at {path}: {format} has no null value")]
    UnsupportedNull { format: Format, path: Path },

    /// TOML documents are always tables.
    #[error("non-mapping root: a {format} document must be a table, found {found}")]
    NonMappingRoot { format: Format, found: &'static str },

    /// NaN and infinities have no JSON spelling.
    #[error("non-finite float {value} at {path}: not representable in {format}")]
    NonFiniteFloat {
        format: Format,
        path: Path,
        value: f64,
    },

    /// The serializer backend rejected the tree.
    #[error("{format} serializer failed: {message}")]
    Serialize { format: Format, message: String },
}

impl EncodeError {
    pub fn format(&self) -> Format {
        match self {
            EncodeError::UnsupportedNull { format, .. }
            | EncodeError::NonMappingRoot { format, .. }
            | EncodeError::NonFiniteFloat { format, .. }
            | EncodeError::Serialize { format, .. } => *format,
        }
    }
}

/// Failure of a full decode-then-encode conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Convenience alias for decode results.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Convenience alias for encode results.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
