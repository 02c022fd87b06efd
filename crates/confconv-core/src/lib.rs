//! # confconv-core
//!
//! Conversion of configuration documents between **YAML**, **TOML** and
//! **JSON** through one canonical value tree.
//!
//! Every conversion is a straight pipeline: a decoder turns text in the
//! declared source format into a [`Value`], an encoder turns that [`Value`]
//! into text in the declared target format. Nothing is sniffed or guessed;
//! the caller names both formats.
//!
//! ## Quick start
//!
//! ```rust
//! use confconv_core::{convert, EncodeOptions, Format};
//!
//! let yaml = b"name: svc\nport: 8080\ntags: [a, b]\n";
//! let json = convert(yaml, Format::Yaml, Format::Json, EncodeOptions::default()).unwrap();
//! assert_eq!(json, r#"{"name":"svc","port":8080,"tags":["a","b"]}"#);
//! ```
//!
//! ## Lossy edges
//!
//! The value tree is the intersection of what the formats agree on. Where a
//! target cannot express something the conversion fails instead of guessing:
//! TOML has no null and needs a table at the root, JSON has no NaN or
//! infinity. On the decode side, TOML datetimes become strings and YAML
//! aliases become copies.
//!
//! ## Modules
//!
//! - [`value`] — `Value` / `Mapping` tree and `Path` locations
//! - [`format`] — the `Format` enum
//! - [`decoder`] — text → `Value`
//! - [`encoder`] — `Value` → text
//! - [`convert`](mod@convert) — decode + encode in one call
//! - [`error`] — `DecodeError`, `EncodeError`, `ConvertError`

pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod value;

pub use convert::convert;
pub use decoder::{decode, decode_str};
pub use encoder::{encode, encode_with_options, EncodeOptions};
pub use error::{ConvertError, DecodeError, EncodeError};
pub use format::{Format, UnknownFormat};
pub use value::{Mapping, Path, Value};
