//! Content-based format detection.
//!
//! Devices mislabel or omit extensions, so the format of a payload is decided
//! from its bytes alone. [`classify`] applies signature rules in a fixed order
//! (first match wins) and falls back to [`FormatTag::Binary`], so it never
//! fails. Every rule inspects a bounded prefix only; cost does not grow with
//! payload size.

use memchr::memmem;

use crate::core::encoding::{decode_lossy, detect_encoding, has_utf16_bom};
use crate::types::FormatTag;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const XML_MIME_TYPE: &str = "application/xml";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const BINARY_MIME_TYPE: &str = "application/octet-stream";

/// Payloads shorter than this are always `Binary`: the length of the shortest signature.
pub const MIN_CLASSIFIABLE_LEN: usize = 4;

/// Bytes decoded when probing a UTF-16 payload for XML markers.
pub const UTF16_PROBE_LEN: usize = 200;

/// Bytes searched for HTML markers.
pub const HTML_PROBE_LEN: usize = 1000;

/// Bytes inspected for a leading JSON bracket.
pub const JSON_PROBE_LEN: usize = 100;

pub const PDF_SIGNATURE: &[u8] = b"%PDF";
pub const XML_DECLARATION: &[u8] = b"<?xml";

/// Root tags emitted by recorders that send UTF-16 XML without a declaration.
pub const DEVICE_ROOT_MARKERS: &[&str] = &["<restingecgdata"];

const HTML_MARKERS: &[&[u8]] = &[b"<html", b"<!doctype"];

/// Classify a payload by its content.
///
/// Rules, in order:
/// 1. `%PDF` signature
/// 2. `<?xml` declaration
/// 3. UTF-16 BOM whose decoded prefix holds `<?xml` or a device root marker
/// 4. `<html` or `<!doctype` anywhere in the first 1000 bytes (case-insensitive)
/// 5. `{` or `[` after trimming the first 100 bytes decoded as lossy UTF-8
/// 6. `Binary`
///
/// # Example
///
/// ```rust
/// use ecg_ingest::{FormatTag, classify};
///
/// assert_eq!(classify(b"%PDF-1.4 ..."), FormatTag::Pdf);
/// assert_eq!(classify(br#"{"lead": "II"}"#), FormatTag::Json);
/// assert_eq!(classify(&[0x00, 0x01, 0x02]), FormatTag::Binary);
/// ```
pub fn classify(bytes: &[u8]) -> FormatTag {
    if bytes.len() < MIN_CLASSIFIABLE_LEN {
        tracing::debug!(len = bytes.len(), "payload below minimum length, classified as binary");
        return FormatTag::Binary;
    }

    let tag = if bytes.starts_with(PDF_SIGNATURE) {
        FormatTag::Pdf
    } else if bytes.starts_with(XML_DECLARATION) {
        FormatTag::Xml
    } else if is_utf16_xml(bytes) {
        FormatTag::Xml
    } else if is_html(bytes) {
        FormatTag::Html
    } else if is_json(bytes) {
        FormatTag::Json
    } else {
        FormatTag::Binary
    };

    tracing::debug!(len = bytes.len(), format = %tag, "classified payload");
    tag
}

fn prefix(bytes: &[u8], len: usize) -> &[u8] {
    &bytes[..bytes.len().min(len)]
}

fn is_utf16_xml(bytes: &[u8]) -> bool {
    if !has_utf16_bom(bytes) {
        return false;
    }

    let text = decode_lossy(prefix(bytes, UTF16_PROBE_LEN), detect_encoding(bytes));
    text.contains("<?xml") || DEVICE_ROOT_MARKERS.iter().any(|marker| text.contains(marker))
}

fn is_html(bytes: &[u8]) -> bool {
    let lowered = prefix(bytes, HTML_PROBE_LEN).to_ascii_lowercase();
    HTML_MARKERS
        .iter()
        .any(|marker| memmem::find(&lowered, marker).is_some())
}

fn is_json(bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(prefix(bytes, JSON_PROBE_LEN));
    let trimmed = text.trim();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}
