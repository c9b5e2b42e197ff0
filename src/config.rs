//! Pipeline configuration
//!
//! A run needs four values: the AWS access key id and secret, and the input
//! and output storage roots. They come from an optional YAML file and are
//! overridden by environment variables.
//!
//! ```yaml
//! aws:
//!   access_key_id: AKIA...
//!   secret_access_key: ...
//! storage:
//!   input_root: s3://udacity-dend/
//!   output_root: s3://my-lake/
//! ```

use crate::error::{Error, Result};
use crate::types::CompressionCodec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "SONGPLAY_ETL_CONFIG";

/// Config file read when `SONGPLAY_ETL_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "dl.yaml";

const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const ENV_REGION: &str = "AWS_REGION";
const ENV_INPUT_ROOT: &str = "SONGPLAY_ETL_INPUT_ROOT";
const ENV_OUTPUT_ROOT: &str = "SONGPLAY_ETL_OUTPUT_ROOT";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// AWS credentials
    #[serde(default)]
    pub aws: AwsCredentials,

    /// Input and output roots
    #[serde(default)]
    pub storage: StorageConfig,

    /// Parquet writer settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Maximum number of input objects fetched concurrently
    #[serde(default = "default_read_concurrency")]
    pub read_concurrency: usize,
}

fn default_read_concurrency() -> usize {
    16
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aws: AwsCredentials::default(),
            storage: StorageConfig::default(),
            sink: SinkConfig::default(),
            read_concurrency: default_read_concurrency(),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// AWS credentials used for `s3://` roots
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AwsCredentials {
    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Region override (object_store falls back to the AWS default)
    #[serde(default)]
    pub region: Option<String>,
}

impl AwsCredentials {
    /// Create credentials from a key pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            region: None,
        }
    }

    /// Whether both halves of the key pair are present and non-empty
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.access_key_id) && present(&self.secret_access_key)
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "****");
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &mask(&self.access_key_id))
            .field("secret_access_key", &mask(&self.secret_access_key))
            .field("region", &self.region)
            .finish()
    }
}

// ============================================================================
// Storage / Sink
// ============================================================================

/// Storage roots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root holding `song_data/` and `log_data/`
    #[serde(default)]
    pub input_root: Option<String>,

    /// Root the five tables are written under
    #[serde(default)]
    pub output_root: Option<String>,
}

/// Parquet writer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Dictionary-encode columns
    #[serde(default = "default_true")]
    pub dictionary: bool,

    /// Write column statistics
    #[serde(default = "default_true")]
    pub statistics: bool,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
            dictionary: true,
            statistics: true,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl PipelineConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Load the config the binary runs with
    ///
    /// Reads the file named by `SONGPLAY_ETL_CONFIG` (or `dl.yaml` when it
    /// exists), applies environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let mut config = match explicit.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override values with those returned by `lookup`
    ///
    /// Empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_ACCESS_KEY_ID) {
            self.aws.access_key_id = Some(v);
        }
        if let Some(v) = get(ENV_SECRET_ACCESS_KEY) {
            self.aws.secret_access_key = Some(v);
        }
        if let Some(v) = get(ENV_REGION) {
            self.aws.region = Some(v);
        }
        if let Some(v) = get(ENV_INPUT_ROOT) {
            self.storage.input_root = Some(v);
        }
        if let Some(v) = get(ENV_OUTPUT_ROOT) {
            self.storage.output_root = Some(v);
        }
    }

    /// Check that the config can drive a run
    pub fn validate(&self) -> Result<()> {
        let input = self.input_root()?;
        let output = self.output_root()?;

        if (is_remote(input) || is_remote(output)) && !self.aws.is_complete() {
            return Err(Error::config(
                "AWS credentials (access_key_id, secret_access_key) are required for s3:// roots",
            ));
        }

        if self.read_concurrency == 0 {
            return Err(Error::invalid_value(
                "read_concurrency",
                "must be at least 1",
            ));
        }

        if self.sink.row_group_size == 0 {
            return Err(Error::invalid_value(
                "sink.row_group_size",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Input root
    pub fn input_root(&self) -> Result<&str> {
        non_empty(self.storage.input_root.as_deref(), "storage.input_root")
    }

    /// Output root
    pub fn output_root(&self) -> Result<&str> {
        non_empty(self.storage.output_root.as_deref(), "storage.output_root")
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing_field(field)),
    }
}

/// Whether a storage root points at S3
pub fn is_remote(root: &str) -> bool {
    root.starts_with("s3://") || root.starts_with("s3a://")
}
