//! Embedded-document extraction.
//!
//! Only one carrier format exists today: a base64 PDF inside the `StudyData`
//! element of an XML export.

pub mod xml;

pub use xml::{BASE64_PDF_PREFIX, CARRIER_ELEMENT, extract_embedded_document, extract_embedded_pdf};
