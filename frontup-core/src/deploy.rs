//! High-level pipeline: plan every destination key, upload, invalidate.
//!
//! This module orchestrates a full deploy as described by the loaded config:
//!   - Picks the bucket for each destination key (explicit bucket, or the
//!     distribution origin with the longest matching path)
//!   - Plans every `Files` entry into upload instructions
//!   - Uploads each file via [`ObjectStore`] with `Cache-Control: no-cache`
//!   - Invalidates `/*` on the [`Distribution`] and waits for completion
//!
//! # Error Handling
//! Planning errors are collected across all destination keys and reported
//! together; nothing is uploaded unless every key planned cleanly. Upload
//! and invalidation failures abort immediately.
//!
//! # Navigation
//! - Planning: [`BucketSelector`], [`plan_deployment`]
//! - Publishing: [`publish`], [`DeployOptions`], [`DeployReport`]

use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::contract::{Distribution, InvalidationStatus, ObjectBody, ObjectStore, PutObject};
use crate::error::{DeployError, PlanError};
use crate::origin::{resolve_bucket, OriginSpec};
use crate::planner::{UploadInstruction, UploadPlanner};
use crate::source::SourceSpec;

/// Cache-Control header sent with every object.
pub const CACHE_CONTROL: &str = "no-cache";

/// Path pattern invalidated after a deploy.
pub const INVALIDATE_ALL: &str = "/*";

/// One entry of the `Files` table: a destination key and what goes there.
///
/// The source is kept in its config form and parsed while planning, so a
/// malformed entry is reported next to every other planning error.
#[derive(Debug, Clone)]
pub struct FileMapping {
    pub destination: String,
    pub source: Value,
}

impl FileMapping {
    pub fn new(destination: impl Into<String>, source: impl Into<Value>) -> Self {
        Self {
            destination: destination.into(),
            source: source.into(),
        }
    }

    pub fn source_spec(&self) -> Result<SourceSpec, PlanError> {
        SourceSpec::from_value(&self.source)
    }
}

/// How the bucket for a destination key is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSelector {
    /// Every key goes to this bucket.
    Fixed(String),
    /// Each key goes to the origin with the longest matching path.
    Origins(Vec<OriginSpec>),
}

impl BucketSelector {
    /// An explicit bucket wins; otherwise the distribution's origins are fetched once.
    pub async fn resolve<D>(
        bucket: Option<&str>,
        distribution: Option<&D>,
    ) -> Result<Self, DeployError>
    where
        D: Distribution + ?Sized,
    {
        if let Some(bucket) = bucket {
            info!(bucket, "[DEPLOY] Using configured bucket for all keys");
            return Ok(BucketSelector::Fixed(bucket.to_string()));
        }
        let Some(distribution) = distribution else {
            return Err(DeployError::Planning(vec![PlanError::NoTarget]));
        };
        let origins = distribution.origins().await.map_err(|e| {
            error!(error = ?e, "[DEPLOY][ERROR] Failed to describe distribution origins");
            DeployError::Origins(e)
        })?;
        info!(origins = origins.len(), "[DEPLOY] Loaded distribution S3 origins");
        Ok(BucketSelector::Origins(origins))
    }

    pub fn bucket_for(&self, key: &str) -> Result<String, PlanError> {
        match self {
            BucketSelector::Fixed(bucket) => Ok(bucket.clone()),
            BucketSelector::Origins(origins) => resolve_bucket(origins, key).map(str::to_string),
        }
    }
}

/// An instruction bound to the bucket it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub bucket: String,
    pub instruction: UploadInstruction,
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Plan only: no upload, no invalidation.
    pub dry_run: bool,
    /// Maximum number of uploads in flight.
    pub concurrency: usize,
    /// Delay between invalidation status checks.
    pub poll_interval: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 8,
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct DeployReport {
    pub planned: Vec<PlannedUpload>,
    pub uploaded: usize,
    /// Id of the completed invalidation, when one was created.
    pub invalidation_id: Option<String>,
}

/// Plan every mapping on the local filesystem.
///
/// Errors from all mappings are collected; if any occurred the call fails with
/// [`DeployError::Planning`] carrying every one of them.
pub fn plan_deployment(
    files: &[FileMapping],
    selector: &BucketSelector,
) -> Result<Vec<PlannedUpload>, DeployError> {
    plan_deployment_with(&UploadPlanner::new(), files, selector)
}

pub fn plan_deployment_with<F>(
    planner: &UploadPlanner<F>,
    files: &[FileMapping],
    selector: &BucketSelector,
) -> Result<Vec<PlannedUpload>, DeployError>
where
    F: crate::contract::FileSystem,
{
    let mut planned = Vec::new();
    let mut errors = Vec::new();

    for mapping in files {
        let result = selector.bucket_for(&mapping.destination).and_then(|bucket| {
            let source = mapping.source_spec()?;
            planner
                .plan(&mapping.destination, &source)
                .map(|instructions| (bucket, instructions))
        });
        match result {
            Ok((bucket, instructions)) => {
                debug!(
                    destination = %mapping.destination,
                    bucket = %bucket,
                    count = instructions.len(),
                    "[DEPLOY] Planned destination"
                );
                planned.extend(instructions.into_iter().map(|instruction| PlannedUpload {
                    bucket: bucket.clone(),
                    instruction,
                }));
            }
            Err(e) => {
                error!(destination = %mapping.destination, error = %e, "[DEPLOY][ERROR] Planning failed");
                errors.push(e);
            }
        }
    }

    if !errors.is_empty() {
        return Err(DeployError::Planning(errors));
    }
    info!(count = planned.len(), "[DEPLOY] Planned uploads");
    Ok(planned)
}

/// Upload everything in `planned`, then invalidate the distribution (if any).
pub async fn publish<S, D>(
    planned: Vec<PlannedUpload>,
    store: &S,
    distribution: Option<&D>,
    options: &DeployOptions,
) -> Result<DeployReport, DeployError>
where
    S: ObjectStore + ?Sized,
    D: Distribution + ?Sized,
{
    if options.dry_run {
        info!(count = planned.len(), "[DEPLOY] Dry run, skipping upload and invalidation");
        return Ok(DeployReport {
            planned,
            uploaded: 0,
            invalidation_id: None,
        });
    }

    let uploaded = stream::iter(planned.iter())
        .map(|upload| upload_one(store, upload))
        .buffer_unordered(options.concurrency.max(1))
        .try_fold(0usize, |count, ()| async move { Ok(count + 1) })
        .await?;
    info!(uploaded, "[DEPLOY] Upload complete");

    let invalidation_id = match distribution {
        Some(distribution) => Some(invalidate(distribution, options.poll_interval).await?),
        None => {
            debug!("[DEPLOY] No distribution configured, skipping invalidation");
            None
        }
    };

    Ok(DeployReport {
        planned,
        uploaded,
        invalidation_id,
    })
}

async fn upload_one<S>(store: &S, upload: &PlannedUpload) -> Result<(), DeployError>
where
    S: ObjectStore + ?Sized,
{
    let instruction = &upload.instruction;
    let bytes = tokio::fs::read(&instruction.source_path)
        .await
        .map_err(|source| DeployError::Read {
            path: instruction.source_path.clone(),
            source,
        })?;
    let body = ObjectBody::from_bytes(bytes, instruction.is_text());
    let content_type = instruction.content_type.as_ref().map(|m| m.as_ref());

    debug!(
        bucket = %upload.bucket,
        key = %instruction.destination_key,
        size = body.len(),
        "[DEPLOY][UPLOAD] putObject"
    );
    store
        .put_object(PutObject {
            bucket: &upload.bucket,
            key: &instruction.destination_key,
            body,
            content_type,
            cache_control: CACHE_CONTROL,
        })
        .await
        .map_err(|source| {
            error!(bucket = %upload.bucket, key = %instruction.destination_key, error = ?source, "[DEPLOY][ERROR][UPLOAD] putObject failed");
            DeployError::Upload {
                bucket: upload.bucket.clone(),
                key: instruction.destination_key.clone(),
                source,
            }
        })
}

/// Invalidate everything and wait until the CDN reports completion.
pub async fn invalidate<D>(distribution: &D, poll_interval: Duration) -> Result<String, DeployError>
where
    D: Distribution + ?Sized,
{
    let invalidation = distribution
        .create_invalidation(vec![INVALIDATE_ALL.to_string()])
        .await
        .map_err(DeployError::Invalidation)?;
    info!(id = %invalidation.id, "[DEPLOY] Created invalidation");

    let mut status = invalidation.status;
    let mut polls = 0u32;
    while status != InvalidationStatus::Completed {
        tokio::time::sleep(poll_interval).await;
        polls += 1;
        status = distribution
            .invalidation_status(invalidation.id.clone())
            .await
            .map_err(DeployError::Invalidation)?;
        debug!(id = %invalidation.id, polls, ?status, "[DEPLOY] Polled invalidation");
    }
    info!(id = %invalidation.id, polls, "[DEPLOY] Invalidation completed");
    Ok(invalidation.id)
}
