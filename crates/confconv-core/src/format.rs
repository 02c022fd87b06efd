//! The closed set of serialization formats the converter speaks.

use std::fmt;
use std::str::FromStr;

/// A textual configuration format. Decoder and encoder selection is an
/// exhaustive `match` on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Yaml, Format::Toml, Format::Json];

    pub fn name(self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// Other accepted spellings of [`Format::name`].
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yml"],
            Format::Toml | Format::Json => &[],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`Format::from_str`] for names outside `yaml`, `toml`, `json`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format '{0}' (expected one of: yaml, toml, json)")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| {
                format.name().eq_ignore_ascii_case(s)
                    || format.aliases().iter().any(|a| a.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
