//! Embedded PDF extraction from ECG XML exports.
//!
//! Recorders ship the rendered report as base64 text inside a `StudyData`
//! element. Extraction decodes the XML under its BOM hint, parses it with
//! `roxmltree`, locates the first `StudyData` element at any depth (matched by
//! local name, so namespaces do not matter) and decodes its content.
//!
//! A document is only returned after the decoded bytes have been checked for
//! the `%PDF` signature. Every other outcome is an [`ExtractionFailure`] the
//! caller may log; none of them is fatal to ingestion.
//!
//! # Example
//!
//! ```rust
//! use base64::prelude::*;
//! use ecg_ingest::extraction::xml::extract_embedded_document;
//!
//! let pdf = b"%PDF-1.4 report";
//! let xml = format!(
//!     "<?xml version=\"1.0\"?><Root><StudyData>{}</StudyData></Root>",
//!     BASE64_STANDARD.encode(pdf)
//! );
//!
//! let document = extract_embedded_document(xml.as_bytes()).unwrap();
//! assert_eq!(document.bytes(), pdf);
//! ```

use std::borrow::Cow;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use crate::core::encoding::{decode_text, detect_encoding};
use crate::types::{ExtractedDocument, ExtractionFailure};

/// Element that carries the base64 encoded report.
pub const CARRIER_ELEMENT: &str = "StudyData";

/// Base64 encoding of the ASCII bytes `%PDF`.
pub const BASE64_PDF_PREFIX: &str = "JVBERi";

const CARRIER_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Extract the PDF embedded in an XML payload.
///
/// # Errors
///
/// Returns the first failed step as an [`ExtractionFailure`]: text decode,
/// XML parse, missing or empty carrier, prefix mismatch, base64 decode, or
/// PDF signature check.
pub fn extract_embedded_document(bytes: &[u8]) -> Result<ExtractedDocument, ExtractionFailure> {
    let hint = detect_encoding(bytes);
    let xml = decode_text(bytes, hint)?;
    let carrier = carrier_text(&xml)?;

    tracing::debug!(chars = carrier.len(), "found {} element", CARRIER_ELEMENT);

    let document = decode_carrier(&carrier)?;
    tracing::debug!(bytes = document.len(), "decoded embedded PDF");
    Ok(document)
}

/// Like [`extract_embedded_document`], logging the failure reason and returning `None`.
pub fn extract_embedded_pdf(bytes: &[u8]) -> Option<ExtractedDocument> {
    extract_embedded_document(bytes)
        .inspect_err(|failure| {
            tracing::debug!(kind = failure.kind(), reason = %failure, "no embedded PDF extracted");
        })
        .ok()
}

fn carrier_text(xml: &str) -> Result<String, ExtractionFailure> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };

    let doc = roxmltree::Document::parse_with_options(xml, options).map_err(|e| ExtractionFailure::Parse {
        message: e.to_string(),
    })?;

    let carrier = doc
        .descendants()
        .find(|n| n.has_tag_name(CARRIER_ELEMENT))
        .ok_or(ExtractionFailure::CarrierMissing)?;

    carrier
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
        .ok_or(ExtractionFailure::CarrierEmpty)
}

fn decode_carrier(text: &str) -> Result<ExtractedDocument, ExtractionFailure> {
    if !text.starts_with(BASE64_PDF_PREFIX) {
        return Err(ExtractionFailure::NotBase64Pdf);
    }

    // Devices wrap long base64 lines.
    let compact: Cow<'_, str> = if text.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(text.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(text)
    };

    let decoded = CARRIER_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| ExtractionFailure::Base64 { message: e.to_string() })?;

    ExtractedDocument::from_pdf_bytes(decoded).ok_or(ExtractionFailure::NotPdf)
}
