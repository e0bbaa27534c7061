//! Error types for planning and publishing.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by collaborator implementations (SDK clients, mocks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of a [`PlanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration is malformed. Never retried.
    Configuration,
    /// A source path or a matching bucket does not exist.
    NotFound,
    /// The filesystem failed while reading or listing.
    Io,
}

/// Errors raised while turning a source specifier into upload instructions.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A directory source was mapped to a single object key.
    #[error("destination must be a folder with a trailing slash: {destination} (source directory {})", .source_dir.display())]
    NotAFolder {
        destination: String,
        source_dir: PathBuf,
    },

    #[error("specifying files to be uploaded by an object must have a 'path' property: {spec}")]
    MissingPath { spec: String },

    #[error("'exclude' must be a string or an array of strings: {spec}")]
    InvalidExclude { spec: String },

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("a source must be a path, an array or an object with 'path': {spec}")]
    InvalidSource { spec: String },

    #[error("neither a bucket name nor a distribution id is configured")]
    NoTarget,

    #[error("source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("no bucket found for key {key}")]
    BucketNotFound { key: String },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::NotAFolder { .. }
            | PlanError::MissingPath { .. }
            | PlanError::InvalidExclude { .. }
            | PlanError::InvalidPattern { .. }
            | PlanError::InvalidSource { .. }
            | PlanError::NoTarget => ErrorKind::Configuration,
            PlanError::SourceNotFound { .. } | PlanError::BucketNotFound { .. } => {
                ErrorKind::NotFound
            }
            PlanError::Io { .. } | PlanError::Walk { .. } => ErrorKind::Io,
        }
    }
}

/// Errors raised by the deploy pipeline.
#[derive(Debug, Error)]
pub enum DeployError {
    /// One or more destination keys could not be planned. Nothing was uploaded.
    #[error("{}", join_messages(.0))]
    Planning(Vec<PlanError>),

    #[error("failed to describe distribution origins: {0}")]
    Origins(#[source] BoxError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("invalidation failed: {0}")]
    Invalidation(#[source] BoxError),
}

fn join_messages(errors: &[PlanError]) -> String {
    errors
        .iter()
        .map(|e| format!("Error: {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
