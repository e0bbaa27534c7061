//! `load_config` module: reads the YAML deploy config and maps it into typed
//! [`FrontupConfig`].
//!
//! ```yaml
//! CloudFrontDistributionId: E2EXAMPLE
//! S3BucketName: my-site-bucket
//! Files:
//!   index.html: dist/index.html
//!   assets/: { path: dist/assets, exclude: ["\\.map$"] }
//! ```
//!
//! # Responsibilities
//! - Parse the YAML file; `Files` keeps the order it was written in.
//! - Keep each loosely typed `Files` value as a [`FileMapping`]; sources are
//!   parsed while planning so every bad entry gets reported.
//! - Require at least one target: a distribution id or a bucket name.
//!
//! # Errors
//! All errors are `anyhow::Error` with the config path in context, surfaced
//! at the CLI boundary.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use frontup_core::deploy::FileMapping;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "frontup.config.yml";

#[derive(Debug, Clone)]
pub struct FrontupConfig {
    /// CloudFront distribution to resolve origins from and invalidate.
    pub distribution_id: Option<String>,
    /// When set, every key is written to this bucket.
    pub bucket: Option<String>,
    pub files: Vec<FileMapping>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "CloudFrontDistributionId", default)]
    distribution_id: Option<String>,
    #[serde(rename = "S3BucketName", default)]
    bucket: Option<String>,
    #[serde(rename = "Files")]
    files: Map<String, Value>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FrontupConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow!("Failed to read config file {}: {e}", path_ref.display())
    })?;

    let raw: RawConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow!("Failed to parse config YAML {}: {e}", path_ref.display())
    })?;

    let config = FrontupConfig::try_from(raw)
        .with_context(|| format!("Invalid config file {}", path_ref.display()))?;
    info!(
        config_path = ?path_ref,
        files = config.files.len(),
        distribution = config.distribution_id.is_some(),
        bucket = config.bucket.is_some(),
        "Parsed config YAML successfully"
    );
    Ok(config)
}

impl TryFrom<RawConfig> for FrontupConfig {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let distribution_id = raw.distribution_id.filter(|s| !s.is_empty());
        let bucket = raw.bucket.filter(|s| !s.is_empty());
        if distribution_id.is_none() && bucket.is_none() {
            bail!("either CloudFrontDistributionId or S3BucketName must be set");
        }

        let files = raw
            .files
            .into_iter()
            .map(|(destination, source)| FileMapping::new(destination, source))
            .collect();

        Ok(FrontupConfig {
            distribution_id,
            bucket,
            files,
        })
    }
}
