//! ecg-ingest - content identification for files pushed by ECG recorders
//!
//! Recorders upload studies as PDF reports, XML exports (often UTF-16 with a
//! base64 PDF inside a `StudyData` element), HTML, JSON or opaque binaries,
//! and frequently send misleading names. This crate decides the format from
//! the bytes, recovers the embedded PDF from XML exports, and provides the
//! storage and HTTP plumbing to receive uploads.
//!
//! # Quick Start
//!
//! ```rust
//! use base64::prelude::*;
//! use ecg_ingest::{FormatTag, Payload, process};
//!
//! let xml = format!(
//!     "<?xml version=\"1.0\"?><restingecgdata><StudyData>{}</StudyData></restingecgdata>",
//!     BASE64_STANDARD.encode(b"%PDF-1.4 ...")
//! );
//!
//! let result = process(&Payload::from(xml.into_bytes()));
//! assert_eq!(result.format, FormatTag::Xml);
//! assert!(result.extracted_document().is_some());
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): encoding detection, format classification, the
//!   `process` entry point, configuration and file helpers
//! - **Extraction** (`extraction`): embedded PDF recovery from XML
//! - **Storage** (`storage`): file naming and artifact persistence
//! - **API** (`api`, feature `api`): HTTP upload endpoint built on axum
//!
//! Classification and extraction are pure functions over bytes: no I/O, no
//! shared state, safe to call from any number of threads.

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod storage;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{IngestError, Result};
pub use types::*;

pub use core::config::{BasicAuthConfig, IngestConfig, ServerConfig, StorageConfig, UploadLimits};
pub use core::encoding::{decode_text, detect_encoding};
pub use core::extractor::{process, process_batch, process_bytes};
pub use core::mime::{
    BINARY_MIME_TYPE, HTML_MIME_TYPE, JSON_MIME_TYPE, PDF_MIME_TYPE, XML_MIME_TYPE, classify,
};
pub use extraction::{extract_embedded_document, extract_embedded_pdf};
pub use storage::{ArtifactStore, StoredArtifacts};
