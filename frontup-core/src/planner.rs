//! Expansion of a [`SourceSpec`] into concrete upload instructions.
//!
//! A destination key ending in `/` is a folder: any number of objects may be
//! written below it. Any other key names exactly one object, so its source
//! must be a single file.
//!
//! | source          | destination `a/b/`        | destination `a/b`   |
//! |-----------------|---------------------------|---------------------|
//! | file `x/f.txt`  | `a/b/f.txt`               | `a/b`               |
//! | dir `x/` (`x/c/d.txt`) | `a/b/c/d.txt`      | error: not a folder |

use std::path::{Component, Path, PathBuf};

use mime::Mime;
use tracing::{debug, warn};

use crate::content_type;
use crate::contract::{FileSystem, LocalFileSystem, PathKind};
use crate::error::PlanError;
use crate::source::SourceSpec;

/// One local file paired with the key it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInstruction {
    pub source_path: PathBuf,
    pub destination_key: String,
    pub content_type: Option<Mime>,
}

impl UploadInstruction {
    fn new(source_path: PathBuf, destination_key: String) -> Self {
        let content_type = content_type::lookup(&source_path);
        Self {
            source_path,
            destination_key,
            content_type,
        }
    }

    /// Whether the body is sent as text rather than raw bytes.
    pub fn is_text(&self) -> bool {
        self.content_type.as_ref().is_some_and(content_type::is_text)
    }

    /// The source path with `/` separators, as exclude patterns see it.
    pub fn source_str(&self) -> String {
        slash_path(&self.source_path)
    }
}

/// Plans uploads against a [`FileSystem`].
#[derive(Debug, Clone, Default)]
pub struct UploadPlanner<F = LocalFileSystem> {
    fs: F,
}

impl UploadPlanner<LocalFileSystem> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem> UploadPlanner<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// Expand `source` into instructions below `destination_root`.
    ///
    /// The result preserves list order; directory contents come in file-name
    /// order, so planning an unchanged tree twice gives the same list.
    pub fn plan(
        &self,
        destination_root: &str,
        source: &SourceSpec,
    ) -> Result<Vec<UploadInstruction>, PlanError> {
        match source {
            SourceSpec::Single(path) => self.plan_path(destination_root, path),
            SourceSpec::List(items) => {
                let mut all = Vec::new();
                for item in items {
                    all.extend(self.plan(destination_root, item)?);
                }
                Ok(all)
            }
            SourceSpec::WithExclude { path, exclude } => {
                let planned = self.plan(destination_root, path)?;
                let before = planned.len();
                let kept: Vec<_> = planned
                    .into_iter()
                    .filter(|ins| {
                        let source = ins.source_str();
                        !exclude.iter().any(|re| re.is_match(&source))
                    })
                    .collect();
                debug!(
                    destination = destination_root,
                    excluded = before - kept.len(),
                    kept = kept.len(),
                    "Applied exclude patterns"
                );
                Ok(kept)
            }
        }
    }

    fn plan_path(
        &self,
        destination_root: &str,
        path: &Path,
    ) -> Result<Vec<UploadInstruction>, PlanError> {
        let folder = destination_root.strip_suffix('/');

        match self.fs.stat(path)? {
            PathKind::File => {
                let key = match folder {
                    None => destination_root.to_string(),
                    Some(folder) => {
                        let base = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        format!("{folder}/{base}")
                    }
                };
                debug!(source = %path.display(), key = %key, "Planned file");
                Ok(vec![UploadInstruction::new(path.to_path_buf(), key)])
            }
            PathKind::Directory => {
                let Some(folder) = folder else {
                    return Err(PlanError::NotAFolder {
                        destination: destination_root.to_string(),
                        source_dir: path.to_path_buf(),
                    });
                };
                let mut planned = Vec::new();
                for file in self.fs.list_files(path) {
                    let file = file?;
                    let relative = file.strip_prefix(path).unwrap_or(&file);
                    let key = join_key(folder, &slash_path(relative));
                    debug!(source = %file.display(), key = %key, "Planned file");
                    planned.push(UploadInstruction::new(file, key));
                }
                debug!(
                    source = %path.display(),
                    destination = destination_root,
                    count = planned.len(),
                    "Planned directory"
                );
                Ok(planned)
            }
            PathKind::Other => {
                warn!(source = %path.display(), "Skipping source that is neither a file nor a directory");
                Ok(Vec::new())
            }
        }
    }
}

/// Plan against the local filesystem.
pub fn plan(
    destination_root: &str,
    source: &SourceSpec,
) -> Result<Vec<UploadInstruction>, PlanError> {
    UploadPlanner::new().plan(destination_root, source)
}

/// Key for a file listed below a directory source. Listings into the bucket
/// root get no leading `/`.
fn join_key(folder: &str, rest: &str) -> String {
    if folder.is_empty() {
        rest.to_string()
    } else {
        format!("{folder}/{rest}")
    }
}

/// Render a path with `/` separators regardless of platform.
fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy(),
            other => other.as_os_str().to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_path() {
        assert_eq!(slash_path(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(slash_path(Path::new("/tmp/x/y")), "/tmp/x/y");
        assert_eq!(slash_path(Path::new("a/b/")), "a/b");
    }

    #[test]
    fn test_join_key_for_listings_at_bucket_root() {
        assert_eq!(join_key("", "index.html"), "index.html");
        assert_eq!(join_key("site", "index.html"), "site/index.html");
    }
}
