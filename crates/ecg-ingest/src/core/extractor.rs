//! Ingestion entry points.
//!
//! [`process`] runs the classifier once and, for XML payloads, the embedded
//! document extractor once. It performs no I/O and keeps no state, so it is
//! safe to call concurrently and repeatedly on the same payload.
//!
//! # Example
//!
//! ```rust
//! use ecg_ingest::{FormatTag, Payload, process};
//!
//! let payload = Payload::from(br#"{"device": "ECG-1200"}"#.to_vec());
//! let result = process(&payload);
//!
//! assert_eq!(result.format, FormatTag::Json);
//! assert!(result.extraction.is_none());
//! ```

use crate::core::encoding::detect_encoding;
use crate::core::mime::classify;
use crate::extraction::xml::extract_embedded_document;
use crate::types::{ClassificationResult, FormatTag, Payload};

/// Classify a payload and extract its embedded PDF when it is XML.
pub fn process(payload: &Payload) -> ClassificationResult {
    process_bytes(payload.as_bytes())
}

/// Same as [`process`] for a borrowed buffer.
#[tracing::instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn process_bytes(bytes: &[u8]) -> ClassificationResult {
    let format = classify(bytes);

    if format != FormatTag::Xml {
        return ClassificationResult {
            format,
            encoding: None,
            extraction: None,
        };
    }

    let encoding = detect_encoding(bytes);
    let extraction = extract_embedded_document(bytes);

    match &extraction {
        Ok(document) => tracing::debug!(bytes = document.len(), "XML payload carries an embedded PDF"),
        Err(failure) => tracing::debug!(kind = failure.kind(), reason = %failure, "XML payload has no embedded PDF"),
    }

    ClassificationResult {
        format,
        encoding: Some(encoding),
        extraction: Some(extraction),
    }
}

/// Process several payloads, preserving order.
pub fn process_batch<'a, I>(payloads: I) -> Vec<ClassificationResult>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    payloads.into_iter().map(process_bytes).collect()
}
