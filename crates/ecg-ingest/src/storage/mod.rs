//! Persistence of received payloads and extracted documents.
//!
//! The primary payload is always written under its classified extension. An
//! XML payload that carried a PDF additionally gets a `{base}_extracted.pdf`
//! sibling in the same directory.

pub mod naming;

use std::path::{Path, PathBuf};

use crate::types::ClassificationResult;
use crate::{IngestError, Result};

pub use naming::{
    base_name, default_base_name, extracted_file_name, hinted_format, primary_file_name, sanitize_suggested_name,
};

/// Paths and sizes of the files written for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifacts {
    pub primary: PathBuf,
    pub primary_bytes: usize,
    pub extracted: Option<PathBuf>,
    pub extracted_bytes: Option<usize>,
}

/// Directory where artifacts are stored.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory (and parents) if missing.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            IngestError::storage_with_source(format!("Failed to create {}", self.root.display()), e)
        })
    }

    /// Write `payload` as `{base}{ext}` and, when extraction succeeded, the
    /// document as `{base}_extracted.pdf`.
    ///
    /// Existing files with the same name are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Storage` when the directory or a file cannot be written.
    pub fn persist(&self, payload: &[u8], result: &ClassificationResult, base: &str) -> Result<StoredArtifacts> {
        self.ensure_root()?;

        let primary = self.root.join(naming::primary_file_name(base, result.format));
        write_artifact(&primary, payload)?;
        tracing::info!(
            path = %primary.display(),
            format = result.format.label(),
            bytes = payload.len(),
            "stored payload"
        );

        let mut artifacts = StoredArtifacts {
            primary,
            primary_bytes: payload.len(),
            extracted: None,
            extracted_bytes: None,
        };

        if let Some(document) = result.extracted_document() {
            let extracted = self.root.join(naming::extracted_file_name(base));
            write_artifact(&extracted, document.bytes())?;
            tracing::info!(path = %extracted.display(), bytes = document.len(), "stored extracted PDF");

            artifacts.extracted = Some(extracted);
            artifacts.extracted_bytes = Some(document.len());
        }

        Ok(artifacts)
    }
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if path.exists() {
        tracing::warn!(path = %path.display(), "overwriting existing file");
    }

    std::fs::write(path, bytes)
        .map_err(|e| IngestError::storage_with_source(format!("Failed to write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::process_bytes;
    use base64::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn test_persist_pdf_payload() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("ftp_data"));
        let payload = b"%PDF-1.4 report";

        let artifacts = store.persist(payload, &process_bytes(payload), "ecg").unwrap();

        assert_eq!(artifacts.primary, dir.path().join("ftp_data").join("ecg.pdf"));
        assert_eq!(std::fs::read(&artifacts.primary).unwrap(), payload);
        assert_eq!(artifacts.primary_bytes, payload.len());
        assert!(artifacts.extracted.is_none());
    }

    #[test]
    fn test_persist_xml_with_sibling() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let xml = format!(
            "<?xml version=\"1.0\"?><Root><StudyData>{}</StudyData></Root>",
            BASE64_STANDARD.encode(b"%PDF-1.4 inner")
        );

        let artifacts = store.persist(xml.as_bytes(), &process_bytes(xml.as_bytes()), "study").unwrap();

        assert_eq!(artifacts.primary, dir.path().join("study.xml"));
        let extracted = artifacts.extracted.unwrap();
        assert_eq!(extracted, dir.path().join("study_extracted.pdf"));
        assert_eq!(std::fs::read(extracted).unwrap(), b"%PDF-1.4 inner");
        assert_eq!(artifacts.extracted_bytes, Some(14));
    }

    #[test]
    fn test_persist_xml_without_carrier_writes_primary_only() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let xml = b"<?xml version=\"1.0\"?><Root/>";

        let artifacts = store.persist(xml, &process_bytes(xml), "plain").unwrap();

        assert!(artifacts.extracted.is_none());
        assert!(!dir.path().join("plain_extracted.pdf").exists());
    }

    #[test]
    fn test_persist_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.persist(b"{\"v\": 1}", &process_bytes(b"{\"v\": 1}"), "same").unwrap();
        store.persist(b"{\"v\": 2}", &process_bytes(b"{\"v\": 2}"), "same").unwrap();

        assert_eq!(std::fs::read(dir.path().join("same.json")).unwrap(), b"{\"v\": 2}");
    }

    #[test]
    fn test_persist_into_unwritable_root_is_storage_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = ArtifactStore::new(&blocker);
        let err = store.persist(b"%PDF-1.4", &process_bytes(b"%PDF-1.4"), "x").unwrap_err();
        assert!(matches!(err, IngestError::Storage { .. }));
    }
}
