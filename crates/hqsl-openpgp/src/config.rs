//! Verifier configuration with validation.
//!
//! ```toml
//! key_servers = ["https://hqsl.net", "hkps://keys.openpgp.org"]
//! timeout_ms = 1000
//! trusted_keys = ["/etc/hqsl/root.asc"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::url::normalize_url;
use crate::domain::{DirectoryError, KeySource, OpenPgpError, PublicKey};

/// Key server used when none is configured.
pub const DEFAULT_KEY_SERVER: &str = "https://hqsl.net";

/// Per-request key server timeout, milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Verifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HqslConfig {
    /// Key servers, tried in order; empty means [`DEFAULT_KEY_SERVER`]
    pub key_servers: Vec<String>,
    /// Per-request key server timeout in milliseconds
    pub timeout_ms: u64,
    /// Files holding trusted root keys, armored or binary
    pub trusted_keys: Vec<PathBuf>,
}

impl Default for HqslConfig {
    fn default() -> Self {
        Self {
            key_servers: vec![DEFAULT_KEY_SERVER.to_string()],
            timeout_ms: DEFAULT_TIMEOUT_MS,
            trusted_keys: Vec::new(),
        }
    }
}

impl HqslConfig {
    /// Short timeouts against a local key server.
    pub fn for_testing() -> Self {
        Self {
            key_servers: vec!["http://127.0.0.1:11371".to_string()],
            timeout_ms: 200,
            trusted_keys: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// * `ConfigError::Io` - the file cannot be read
    /// * `ConfigError::Parse` - the file is not valid configuration TOML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("timeout_ms cannot be 0".into()));
        }
        for server in &self.key_servers {
            normalize_url(server)?;
        }
        Ok(())
    }

    /// Configured key servers, or the default one.
    pub fn effective_key_servers(&self) -> Vec<String> {
        if self.key_servers.is_empty() {
            vec![DEFAULT_KEY_SERVER.to_string()]
        } else {
            self.key_servers.clone()
        }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read and parse every trusted key file.
    ///
    /// # Errors
    /// * `ConfigError::Io` - a file cannot be read
    /// * `ConfigError::TrustedKey` - a file holds no usable key
    pub fn load_trusted_keys(&self) -> Result<Vec<PublicKey>, ConfigError> {
        let mut keys = Vec::new();
        for path in &self.trusted_keys {
            let bytes = fs::read(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
            let parsed = KeySource::Binary(bytes)
                .into_keys()
                .map_err(|source| ConfigError::TrustedKey {
                    path: path.display().to_string(),
                    source,
                })?;
            keys.extend(parsed);
        }
        Ok(keys)
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("Failed to read {path}: {error}")]
    Io {
        /// File path
        path: String,
        /// I/O error message
        error: String,
    },

    /// Malformed configuration TOML.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    /// A key server URL is unusable.
    #[error(transparent)]
    KeyServer(#[from] DirectoryError),

    /// A trusted key could not be parsed.
    #[error("Failed to load trusted key {path}: {source}")]
    TrustedKey {
        /// File path
        path: String,
        /// Parse failure
        source: OpenPgpError,
    },

    /// A trusted key given inline could not be parsed.
    #[error("Invalid trusted key: {0}")]
    Key(#[from] OpenPgpError),
}
