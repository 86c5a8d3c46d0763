//! Configuration loading and management.
//!
//! Configuration belongs to the outer layers only (upload endpoint, artifact
//! storage). Classification and extraction never read it.
//!
//! Sources, in increasing precedence: defaults, a TOML/YAML/JSON file
//! (explicit or discovered as `ecg-ingest.toml`), then `ECG_INGEST_*`
//! environment variables.

use crate::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`IngestConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ecg-ingest.toml";

/// Main ingestion configuration.
///
/// # Example
///
/// ```rust
/// use ecg_ingest::IngestConfig;
///
/// let config: IngestConfig = toml::from_str(r#"
///     [server]
///     port = 9090
///
///     [auth]
///     username = "ecg"
///     password = "s3cret"
/// "#).unwrap();
///
/// assert_eq!(config.server.port, 9090);
/// assert_eq!(config.server.host, "0.0.0.0");
/// assert!(config.auth.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP Basic credentials expected from the device (None = uploads are not authenticated)
    #[serde(default)]
    pub auth: Option<BasicAuthConfig>,

    #[serde(default)]
    pub limits: UploadLimits,
}

/// Listener address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where received payloads and extracted documents are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: default_storage_dir(),
        }
    }
}

/// HTTP Basic credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request size limits for the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Maximum accepted request body in bytes. Default: 100 MB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("ftp_data")
}
fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

impl IngestConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            IngestError::serialization_with_source(format!("Invalid TOML in {}: {}", path.as_ref().display(), e), e)
        })
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content).map_err(|e| {
            IngestError::serialization_with_source(format!("Invalid YAML in {}: {}", path.as_ref().display(), e), e)
        })
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            IngestError::serialization_with_source(format!("Invalid JSON in {}: {}", path.as_ref().display(), e), e)
        })
    }

    /// Load configuration, choosing the parser from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Validation` for unknown extensions and
    /// `IngestError::Serialization` for content that does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(IngestError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `ecg-ingest.toml` in current directory and parent directories.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(IngestError::Io)?;
        Self::discover_from(&current)
    }

    /// Like [`discover`](Self::discover), starting from `start` instead of the working directory.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!("Loading config from {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }

        Ok(None)
    }

    /// Override fields from `ECG_INGEST_*` environment variables.
    ///
    /// Recognized: `ECG_INGEST_HOST`, `ECG_INGEST_PORT`, `ECG_INGEST_STORAGE_DIR`,
    /// `ECG_INGEST_USERNAME` + `ECG_INGEST_PASSWORD` (both required),
    /// `ECG_INGEST_MAX_UPLOAD_BYTES`. Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ECG_INGEST_HOST") {
            self.server.host = host;
        }

        if let Ok(value) = std::env::var("ECG_INGEST_PORT") {
            match value.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Failed to parse ECG_INGEST_PORT='{}', must be a valid port", value),
            }
        }

        if let Ok(dir) = std::env::var("ECG_INGEST_STORAGE_DIR") {
            self.storage.directory = PathBuf::from(dir);
        }

        match (std::env::var("ECG_INGEST_USERNAME"), std::env::var("ECG_INGEST_PASSWORD")) {
            (Ok(username), Ok(password)) => self.auth = Some(BasicAuthConfig { username, password }),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                tracing::warn!("ECG_INGEST_USERNAME and ECG_INGEST_PASSWORD must be set together, ignoring")
            }
            (Err(_), Err(_)) => {}
        }

        if let Ok(value) = std::env::var("ECG_INGEST_MAX_UPLOAD_BYTES") {
            match value.parse::<usize>() {
                Ok(bytes) if bytes > 0 => self.limits.max_upload_bytes = bytes,
                _ => tracing::warn!(
                    "Failed to parse ECG_INGEST_MAX_UPLOAD_BYTES='{}', must be a positive integer",
                    value
                ),
            }
        }
    }

    /// Resolve the effective configuration: explicit file or discovery, then env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::discover()?.unwrap_or_default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(IngestError::validation("server.host must not be empty"));
        }

        if self.server.port == 0 {
            return Err(IngestError::validation("server.port must be non-zero"));
        }

        if self.storage.directory.as_os_str().is_empty() {
            return Err(IngestError::validation("storage.directory must not be empty"));
        }

        if let Some(auth) = &self.auth
            && (auth.username.is_empty() || auth.password.is_empty())
        {
            return Err(IngestError::validation("auth.username and auth.password must not be empty"));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err(IngestError::validation("limits.max_upload_bytes must be positive"));
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| IngestError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
