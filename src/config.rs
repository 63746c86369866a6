//! Job configuration
//!
//! The job is configured from a YAML file plus optional CLI overrides.
//! Storage credentials travel in an explicit [`StorageCredentials`] object
//! handed to the store builder; the process environment is read once at
//! load time and never mutated.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Environment variable holding the access key id
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the secret access key
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

// ============================================================================
// Job Config
// ============================================================================

/// Complete job configuration loaded from YAML
///
/// ```yaml
/// input_root: s3://udacity-dend/
/// output_root: s3://my-lake/
/// credentials:
///   access_key_id: AKIA...
///   secret_access_key: "..."
/// region: us-west-2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Root under which `song_data/` and `log_data/` live
    pub input_root: String,

    /// Root under which the five output table directories are written
    pub output_root: String,

    /// Storage credentials (may also come from the environment)
    #[serde(default)]
    pub credentials: Option<StorageCredentials>,

    /// AWS region for S3 roots
    #[serde(default)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl JobConfig {
    /// Load configuration from a YAML file
    ///
    /// Credentials missing from the file are filled from
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` if both are set.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: JobConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        if config.credentials.is_none() {
            config.credentials = StorageCredentials::from_env();
        }
        Ok(config)
    }

    /// Build a config directly from roots, pulling credentials from the
    /// environment. Used when the CLI supplies both roots and no config
    /// file exists.
    pub fn from_roots(input_root: impl Into<String>, output_root: impl Into<String>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            credentials: StorageCredentials::from_env(),
            region: None,
            endpoint: None,
        }
    }

    /// Check that both roots are present and non-empty
    pub fn validate(&self) -> Result<()> {
        if self.input_root.trim().is_empty() {
            return Err(Error::missing_field("input_root"));
        }
        if self.output_root.trim().is_empty() {
            return Err(Error::missing_field("output_root"));
        }
        Ok(())
    }

    /// Whether either root points at cloud storage
    pub fn needs_credentials(&self) -> bool {
        self.input_root.starts_with("s3://") || self.output_root.starts_with("s3://")
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Object storage credentials
///
/// Never logged and never serialized back out; the `Debug` impl masks the
/// secret.
#[derive(Clone, Deserialize)]
pub struct StorageCredentials {
    /// Access key id
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,
}

impl StorageCredentials {
    /// Create credentials from explicit values
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Read credentials from the environment, if both variables are set
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var(ENV_ACCESS_KEY_ID).ok()?;
        let secret_access_key = std::env::var(ENV_SECRET_ACCESS_KEY).ok()?;
        Some(Self {
            access_key_id,
            secret_access_key,
        })
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}
