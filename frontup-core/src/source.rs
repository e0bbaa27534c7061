//! Source specifiers: which local files go under one destination key.
//!
//! In the config file a source is loosely typed:
//!
//! ```yaml
//! Files:
//!   index.html: dist/index.html                  # a single path
//!   docs/: [dist/guide, dist/api]                # a list of sources
//!   assets/: { path: dist/assets, exclude: "\\.map$" }   # path + exclude
//! ```
//!
//! [`SourceSpec::from_value`] turns that shape into the typed [`SourceSpec`].

use std::path::PathBuf;

use regex::Regex;
use serde_json::Value;

use crate::error::PlanError;

#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// A file or a directory.
    Single(PathBuf),
    /// Several sources planned against the same destination, in order.
    List(Vec<SourceSpec>),
    /// A source with files removed by pattern.
    ///
    /// Patterns are searched for anywhere in the source pathname.
    WithExclude {
        path: Box<SourceSpec>,
        exclude: Vec<Regex>,
    },
}

impl SourceSpec {
    /// Convenience constructor for [`SourceSpec::WithExclude`] from raw patterns.
    pub fn with_exclude<I, S>(path: SourceSpec, patterns: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclude = patterns
            .into_iter()
            .map(|p| compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourceSpec::WithExclude {
            path: Box::new(path),
            exclude,
        })
    }

    /// Parse the config form of a source.
    pub fn from_value(value: &Value) -> Result<Self, PlanError> {
        match value {
            Value::String(path) => Ok(SourceSpec::Single(PathBuf::from(path))),
            Value::Array(items) => items
                .iter()
                .map(SourceSpec::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(SourceSpec::List),
            Value::Object(map) => {
                let path = map.get("path").ok_or_else(|| PlanError::MissingPath {
                    spec: pretty(value),
                })?;
                let path = SourceSpec::from_value(path)?;
                match map.get("exclude") {
                    None => Ok(path),
                    Some(Value::String(pattern)) => SourceSpec::with_exclude(path, [pattern]),
                    Some(Value::Array(patterns)) => {
                        let patterns = patterns
                            .iter()
                            .map(|p| {
                                p.as_str().ok_or_else(|| PlanError::InvalidExclude {
                                    spec: pretty(value),
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        SourceSpec::with_exclude(path, patterns)
                    }
                    Some(_) => Err(PlanError::InvalidExclude {
                        spec: pretty(value),
                    }),
                }
            }
            _ => Err(PlanError::InvalidSource {
                spec: pretty(value),
            }),
        }
    }
}

impl From<&str> for SourceSpec {
    fn from(path: &str) -> Self {
        SourceSpec::Single(PathBuf::from(path))
    }
}

impl From<PathBuf> for SourceSpec {
    fn from(path: PathBuf) -> Self {
        SourceSpec::Single(path)
    }
}

fn compile(pattern: &str) -> Result<Regex, PlanError> {
    Regex::new(pattern).map_err(|source| PlanError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
