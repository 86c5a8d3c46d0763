use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::core::mime::{
    BINARY_MIME_TYPE, HTML_MIME_TYPE, JSON_MIME_TYPE, PDF_MIME_TYPE, PDF_SIGNATURE, XML_MIME_TYPE,
};

/// Raw bytes received from a device.
///
/// Immutable once constructed; clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(Arc<[u8]>);

impl Payload {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Payload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

/// Text encoding guessed from the byte-order mark.
///
/// Advisory only: it selects a decode strategy, decoding may still fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingHint {
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "UTF-16-LE")]
    Utf16Le,
    #[serde(rename = "UTF-16-BE")]
    Utf16Be,
}

impl EncodingHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingHint::Utf8 => "UTF-8",
            EncodingHint::Utf16Le => "UTF-16-LE",
            EncodingHint::Utf16Be => "UTF-16-BE",
        }
    }
}

impl fmt::Display for EncodingHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content format assigned to a payload by the classifier.
///
/// `Binary` is the universal fallback; every payload gets exactly one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    Pdf,
    Xml,
    Html,
    Json,
    Binary,
}

impl FormatTag {
    /// File extension (with leading dot) used when persisting a payload of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatTag::Pdf => ".pdf",
            FormatTag::Xml => ".xml",
            FormatTag::Html => ".html",
            FormatTag::Json => ".json",
            FormatTag::Binary => ".bin",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatTag::Pdf => PDF_MIME_TYPE,
            FormatTag::Xml => XML_MIME_TYPE,
            FormatTag::Html => HTML_MIME_TYPE,
            FormatTag::Json => JSON_MIME_TYPE,
            FormatTag::Binary => BINARY_MIME_TYPE,
        }
    }

    /// Human readable label for upload logs.
    pub fn label(&self) -> &'static str {
        match self {
            FormatTag::Pdf => "PDF",
            FormatTag::Xml => "XML (ECG Data)",
            FormatTag::Html => "HTML",
            FormatTag::Json => "JSON",
            FormatTag::Binary => "Unknown",
        }
    }

    /// Reverse lookup from a file extension, with or without the leading dot.
    ///
    /// Only meant for interpreting names; classification never looks at names.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FormatTag::Pdf),
            "xml" => Some(FormatTag::Xml),
            "html" | "htm" => Some(FormatTag::Html),
            "json" => Some(FormatTag::Json),
            "bin" => Some(FormatTag::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatTag::Pdf => "PDF",
            FormatTag::Xml => "XML",
            FormatTag::Html => "HTML",
            FormatTag::Json => "JSON",
            FormatTag::Binary => "Binary",
        };
        f.write_str(name)
    }
}

/// PDF document recovered from the carrier element of an XML payload.
///
/// Can only be built from bytes that start with the PDF signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ExtractedDocument {
    bytes: Vec<u8>,
}

impl ExtractedDocument {
    /// Wrap decoded bytes, returning `None` unless they begin with `%PDF`.
    pub fn from_pdf_bytes(bytes: Vec<u8>) -> Option<Self> {
        bytes.starts_with(PDF_SIGNATURE).then_some(Self { bytes })
    }

    pub fn format(&self) -> FormatTag {
        FormatTag::Pdf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ExtractedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedDocument")
            .field("format", &self.format())
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Why an XML payload yielded no embedded document.
///
/// None of these abort ingestion; the parent payload is still classified and kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionFailure {
    #[error("payload is not valid {encoding} text")]
    Decode { encoding: EncodingHint },

    #[error("malformed XML: {message}")]
    Parse { message: String },

    #[error("no <StudyData> element found")]
    CarrierMissing,

    #[error("<StudyData> element is empty")]
    CarrierEmpty,

    #[error("StudyData doesn't contain base64 PDF data")]
    NotBase64Pdf,

    #[error("invalid base64 in StudyData: {message}")]
    Base64 { message: String },

    #[error("decoded StudyData is not a valid PDF")]
    NotPdf,
}

impl ExtractionFailure {
    /// Coarse category used in reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionFailure::Decode { .. } => "decode",
            ExtractionFailure::Parse { .. } => "parse",
            ExtractionFailure::CarrierMissing | ExtractionFailure::CarrierEmpty => "absent",
            ExtractionFailure::NotBase64Pdf | ExtractionFailure::Base64 { .. } | ExtractionFailure::NotPdf => {
                "validation"
            }
        }
    }
}

/// Outcome of running the ingestion coordinator over one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub format: FormatTag,

    /// Encoding used to decode the payload as text, when it was decoded.
    pub encoding: Option<EncodingHint>,

    /// Extraction outcome; `None` when the payload is not XML.
    pub extraction: Option<std::result::Result<ExtractedDocument, ExtractionFailure>>,
}

impl ClassificationResult {
    pub fn extracted_document(&self) -> Option<&ExtractedDocument> {
        self.extraction.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    pub fn extraction_failure(&self) -> Option<&ExtractionFailure> {
        self.extraction.as_ref().and_then(|outcome| outcome.as_ref().err())
    }

    pub fn into_extracted_document(self) -> Option<ExtractedDocument> {
        self.extraction.and_then(|outcome| outcome.ok())
    }

    pub fn report(&self) -> ClassificationReport {
        ClassificationReport {
            format: self.format,
            extension: self.format.extension().to_string(),
            mime_type: self.format.mime_type().to_string(),
            encoding: self.encoding,
            extracted_pdf_bytes: self.extracted_document().map(ExtractedDocument::len),
            extraction_failure: self.extraction_failure().map(ToString::to_string),
            extraction_failure_kind: self.extraction_failure().map(|f| f.kind().to_string()),
        }
    }
}

/// Serializable summary of a [`ClassificationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub format: FormatTag,
    pub extension: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<EncodingHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_pdf_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_failure_kind: Option<String>,
}
