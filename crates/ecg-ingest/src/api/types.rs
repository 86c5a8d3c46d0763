//! API state and response types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::IngestConfig;
use crate::storage::ArtifactStore;

/// `Server` header on upload responses. Many recorders expect an Apache server.
pub const UPLOAD_SERVER_HEADER: &str = "Apache/2.4.0";

/// `Server` header on authentication challenges.
pub const AUTH_SERVER_HEADER: &str = "ECG-Upload-Server/1.0";

/// Realm announced in the `WWW-Authenticate` challenge.
pub const AUTH_REALM: &str = "ECG Upload Server";

pub const UPLOAD_SUCCESS_BODY: &str = "File uploaded successfully";
pub const UPLOAD_FAILED_BODY: &str = "Upload failed";
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";
pub const NO_CONTENT_BODY: &str = "No content";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub config: Arc<IngestConfig>,
    pub store: Arc<ArtifactStore>,
}

impl ApiState {
    pub fn new(config: IngestConfig) -> Self {
        let store = ArtifactStore::new(config.storage.directory.clone());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server information response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub version: String,
    /// Directory where uploads are stored
    pub upload_directory: String,
    /// Whether uploads require HTTP Basic credentials
    pub auth_enabled: bool,
}
