//! # contract: interfaces to the outside world
//!
//! The planner and the deploy pipeline never talk to a filesystem, an object
//! store or a CDN directly. They go through the traits defined here:
//!
//! - [`FileSystem`]: stat a path and list the regular files below a directory.
//! - [`ObjectStore`]: write one object (S3 `PutObject`).
//! - [`Distribution`]: describe a CDN distribution's origins and manage
//!   cache invalidations (CloudFront).
//!
//! ## Mocking & Testing
//! - The async traits are annotated for `mockall` so tests can script
//!   deterministic responses (`MockObjectStore`, `MockDistribution`).
//! - Filesystem behaviour is tested against real temporary directories.
//!
//! ## Adding New Destinations
//! - Implement the trait for your destination in the CLI crate.
//! - Convert upstream SDK errors into a [`BoxError`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use walkdir::WalkDir;

pub use crate::error::BoxError;
use crate::error::PlanError;

/// What a path on disk turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// Exists but is neither a regular file nor a directory (fifo, socket, ...).
    Other,
}

/// Read-only view of the filesystem used while planning.
pub trait FileSystem: Send + Sync {
    /// Classify `path`. A missing path is [`PlanError::SourceNotFound`].
    fn stat(&self, path: &Path) -> Result<PathKind, PlanError>;

    /// Every regular file below `dir`, at any depth, in a stable order.
    ///
    /// The iterator is finite; calling `list_files` again starts a fresh walk.
    fn list_files<'a>(
        &'a self,
        dir: &Path,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, PlanError>> + 'a>;
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn stat(&self, path: &Path) -> Result<PathKind, PlanError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(PathKind::File),
            Ok(meta) if meta.is_dir() => Ok(PathKind::Directory),
            Ok(_) => Ok(PathKind::Other),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PlanError::SourceNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(PlanError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn list_files<'a>(
        &'a self,
        dir: &Path,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, PlanError>> + 'a> {
        let root = dir.to_path_buf();
        let walk = WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(PlanError::Walk {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                    source: e,
                })),
            });
        Box::new(walk)
    }
}

/// Body of an object, decided from its content type when the file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// `text/*` content, decoded as UTF-8 (invalid sequences replaced).
    Text(String),
    Binary(Vec<u8>),
}

impl ObjectBody {
    pub fn from_bytes(bytes: Vec<u8>, is_text: bool) -> Self {
        if is_text {
            match String::from_utf8(bytes) {
                Ok(text) => ObjectBody::Text(text),
                Err(e) => ObjectBody::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            }
        } else {
            ObjectBody::Binary(bytes)
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ObjectBody::Text(text) => text.into_bytes(),
            ObjectBody::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ObjectBody::Text(text) => text.len(),
            ObjectBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to write a single object.
pub struct PutObject<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub body: ObjectBody,
    /// `None` when the content type could not be determined from the extension.
    pub content_type: Option<&'a str>,
    pub cache_control: &'a str,
}

/// Trait for writing objects into a bucket.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload one object, overwriting whatever is stored under the key.
    async fn put_object<'a>(&self, req: PutObject<'a>) -> Result<(), BoxError>;
}

/// A cache invalidation as returned by the CDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub id: String,
    pub status: InvalidationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationStatus {
    InProgress,
    Completed,
}

impl From<&str> for InvalidationStatus {
    fn from(s: &str) -> Self {
        match s {
            "Completed" => InvalidationStatus::Completed,
            _ => InvalidationStatus::InProgress,
        }
    }
}

/// Trait for the CDN distribution in front of the buckets.
///
/// One instance is bound to one distribution id.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Distribution: Send + Sync {
    /// The distribution's S3 origins. Non-S3 origins are left out.
    async fn origins(&self) -> Result<Vec<crate::origin::OriginSpec>, BoxError>;

    /// Start invalidating the given path patterns (e.g. `/*`).
    async fn create_invalidation(&self, paths: Vec<String>) -> Result<Invalidation, BoxError>;

    /// Current status of a previously created invalidation.
    async fn invalidation_status(&self, id: String) -> Result<InvalidationStatus, BoxError>;
}
