//! The whole pipeline in one call: decode, then encode.

use crate::decoder::decode;
use crate::encoder::{encode_with_options, EncodeOptions};
use crate::error::ConvertError;
use crate::format::Format;

/// Decode `input` as `from` and re-encode it as `to`.
///
/// Nothing is produced unless both stages succeed, so callers can write the
/// returned text without worrying about partial documents.
pub fn convert(
    input: &[u8],
    from: Format,
    to: Format,
    options: EncodeOptions,
) -> Result<String, ConvertError> {
    tracing::debug!(%from, %to, bytes = input.len(), "converting document");
    let value = decode(input, from)?;
    let out = encode_with_options(&value, to, options)?;
    Ok(out)
}
