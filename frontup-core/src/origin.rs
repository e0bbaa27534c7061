//! Bucket selection among a distribution's S3 origins.

use tracing::debug;

use crate::error::PlanError;

const S3_DOMAIN_SUFFIX: &str = ".s3.amazonaws.com";

/// An S3 origin of a CDN distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginSpec {
    pub bucket_name: String,
    /// Empty, or a path beginning with `/`.
    pub origin_path: String,
}

impl OriginSpec {
    pub fn new(bucket_name: impl Into<String>, origin_path: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            origin_path: origin_path.into(),
        }
    }

    /// Build from a distribution origin entry.
    ///
    /// Only origins whose domain is `<bucket>.s3.amazonaws.com` are S3 origins;
    /// anything else yields `None`.
    pub fn from_domain_name(domain_name: &str, origin_path: Option<&str>) -> Option<Self> {
        let bucket = domain_name.strip_suffix(S3_DOMAIN_SUFFIX)?;
        if bucket.is_empty() {
            return None;
        }
        Some(Self::new(bucket, origin_path.unwrap_or_default()))
    }

    /// Whether an object stored under `key` is served through this origin.
    pub fn is_key_match(&self, key: &str) -> bool {
        format!("/{key}").starts_with(&self.origin_path)
    }
}

/// Pick the bucket whose origin path is the longest prefix of `/key`.
///
/// Equal-length matches keep the origin that comes first in `origins`.
pub fn resolve_bucket<'a>(origins: &'a [OriginSpec], key: &str) -> Result<&'a str, PlanError> {
    let mut best: Option<&OriginSpec> = None;
    for origin in origins.iter().filter(|o| o.is_key_match(key)) {
        match best {
            Some(current) if current.origin_path.len() >= origin.origin_path.len() => {}
            _ => best = Some(origin),
        }
    }

    match best {
        Some(origin) => {
            debug!(key, bucket = %origin.bucket_name, origin_path = %origin.origin_path, "Resolved origin bucket");
            Ok(&origin.bucket_name)
        }
        None => Err(PlanError::BucketNotFound {
            key: key.to_string(),
        }),
    }
}
