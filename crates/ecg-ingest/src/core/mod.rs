//! Core classification and ingestion module.
//!
//! # Architecture
//!
//! - **Entry points**: [`process`] and [`process_bytes`] in `extractor`
//! - **Encoding**: byte-order-mark sniffing and strict decoding
//! - **MIME detection**: content-based format classification
//! - **Configuration**: settings for the upload endpoint and storage
//! - **I/O**: file reading and listing utilities
//!
//! The classification path (`encoding`, `mime`, `extractor`) performs no I/O.

pub mod config;
pub mod encoding;
pub mod extractor;
pub mod io;
pub mod mime;

pub use config::{BasicAuthConfig, IngestConfig, ServerConfig, StorageConfig, UploadLimits};
pub use encoding::{decode_text, detect_encoding};
pub use extractor::{process, process_batch, process_bytes};
pub use mime::classify;
