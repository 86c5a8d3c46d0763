//! Error types for ecg-ingest.
//!
//! `IngestError` covers the outer layers of the crate: configuration loading,
//! artifact storage and the HTTP endpoint. The classification core never
//! returns it. Extraction problems are reported as data through
//! [`ExtractionFailure`](crate::types::ExtractionFailure) so that a bad
//! upload can never abort classification.
//!
//! # Error Handling Philosophy
//!
//! **System errors MUST always bubble up unchanged:**
//! - `IngestError::Io` (from `std::io::Error`) - File system errors, permission errors
//!
//! **Application errors are wrapped with context:**
//! - `Validation` - Invalid configuration or parameters
//! - `Serialization` - Config files that do not parse
//! - `Storage` - Artifact persistence failures
//!
//! # Example
//!
//! ```rust
//! use ecg_ingest::{IngestError, Result};
//!
//! fn read_upload(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!
//!     if bytes.is_empty() {
//!         return Err(IngestError::validation(format!("Upload is empty: {}", path)));
//!     }
//!
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `IngestError`.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for the configuration, storage and transport layers.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(String),
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl IngestError {
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
    error_constructor!(storage, Storage);
}
