//! Byte-order-mark sniffing and text decoding.
//!
//! The hint comes from the first two bytes only. Decoding under the hint is a
//! separate, fallible step: strict decoding reports malformed input instead of
//! substituting replacement characters.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::types::{EncodingHint, ExtractionFailure};

pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Guess the text encoding of `bytes` from its byte-order mark.
///
/// Defaults to UTF-8 when no UTF-16 BOM is present.
pub fn detect_encoding(bytes: &[u8]) -> EncodingHint {
    if bytes.starts_with(&UTF16_LE_BOM) {
        EncodingHint::Utf16Le
    } else if bytes.starts_with(&UTF16_BE_BOM) {
        EncodingHint::Utf16Be
    } else {
        EncodingHint::Utf8
    }
}

/// Returns true when the buffer starts with either UTF-16 byte-order mark.
pub fn has_utf16_bom(bytes: &[u8]) -> bool {
    detect_encoding(bytes) != EncodingHint::Utf8
}

/// Decode `bytes` strictly under `hint`, dropping a leading BOM.
///
/// # Errors
///
/// Returns `ExtractionFailure::Decode` when the bytes contain a sequence that
/// is invalid in the hinted encoding (including a dangling odd byte in UTF-16).
pub fn decode_text(bytes: &[u8], hint: EncodingHint) -> Result<Cow<'_, str>, ExtractionFailure> {
    encoding_for(hint)
        .decode_without_bom_handling_and_without_replacement(strip_bom(bytes, hint))
        .ok_or(ExtractionFailure::Decode { encoding: hint })
}

/// Decode `bytes` under `hint`, replacing invalid sequences.
///
/// Used for bounded probes where a truncated trailing character must not
/// turn into a false negative.
pub fn decode_lossy(bytes: &[u8], hint: EncodingHint) -> Cow<'_, str> {
    let (text, _had_errors) = encoding_for(hint).decode_without_bom_handling(strip_bom(bytes, hint));
    text
}

fn strip_bom(bytes: &[u8], hint: EncodingHint) -> &[u8] {
    let bom: &[u8] = match hint {
        EncodingHint::Utf8 => &UTF8_BOM,
        EncodingHint::Utf16Le => &UTF16_LE_BOM,
        EncodingHint::Utf16Be => &UTF16_BE_BOM,
    };
    bytes.strip_prefix(bom).unwrap_or(bytes)
}

fn encoding_for(hint: EncodingHint) -> &'static Encoding {
    match hint {
        EncodingHint::Utf8 => UTF_8,
        EncodingHint::Utf16Le => UTF_16LE,
        EncodingHint::Utf16Be => UTF_16BE,
    }
}
