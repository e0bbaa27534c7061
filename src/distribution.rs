//! # CloudFront distribution
//!
//! Bridges the core [`Distribution`] trait to `aws-sdk-cloudfront`:
//!
//! - `origins` reads the distribution config and keeps the S3 origins,
//!   deriving each bucket name from the origin's domain name.
//! - `create_invalidation` submits a batch with a fresh UUID as caller
//!   reference, so repeated deploys never collide.
//! - `invalidation_status` reads back the status of that batch.

use async_trait::async_trait;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_cloudfront::Client;
use frontup_core::contract::{BoxError, Distribution, Invalidation, InvalidationStatus};
use frontup_core::origin::OriginSpec;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::aws::AwsSdk;

pub struct CloudFrontDistribution {
    sdk: AwsSdk,
    client: OnceCell<Client>,
    distribution_id: String,
}

impl CloudFrontDistribution {
    pub fn new(sdk: AwsSdk, distribution_id: impl Into<String>) -> Self {
        Self {
            sdk,
            client: OnceCell::new(),
            distribution_id: distribution_id.into(),
        }
    }

    pub fn distribution_id(&self) -> &str {
        &self.distribution_id
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                tracing::info!(distribution_id = %self.distribution_id, "Initialized CloudFront client");
                Client::new(self.sdk.config().await)
            })
            .await
    }
}

#[async_trait]
impl Distribution for CloudFrontDistribution {
    async fn origins(&self) -> Result<Vec<OriginSpec>, BoxError> {
        let output = self
            .client()
            .await
            .get_distribution()
            .id(&self.distribution_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, distribution_id = %self.distribution_id, "GetDistribution failed");
                e
            })?;

        let origins = output
            .distribution()
            .and_then(|d| d.distribution_config())
            .and_then(|c| c.origins())
            .map(|o| o.items())
            .unwrap_or_default();

        let specs: Vec<OriginSpec> = origins
            .iter()
            .filter_map(|origin| OriginSpec::from_domain_name(origin.domain_name(), origin.origin_path()))
            .collect();
        tracing::info!(
            distribution_id = %self.distribution_id,
            total = origins.len(),
            s3 = specs.len(),
            "Fetched distribution origins"
        );
        Ok(specs)
    }

    async fn create_invalidation(&self, paths: Vec<String>) -> Result<Invalidation, BoxError> {
        let caller_reference = Uuid::new_v4().to_string();
        tracing::info!(
            distribution_id = %self.distribution_id,
            caller_reference = %caller_reference,
            ?paths,
            "Creating invalidation"
        );
        let batch = InvalidationBatch::builder()
            .paths(
                Paths::builder()
                    .quantity(paths.len() as i32)
                    .set_items(Some(paths))
                    .build()?,
            )
            .caller_reference(caller_reference)
            .build()?;

        let output = self
            .client()
            .await
            .create_invalidation()
            .distribution_id(&self.distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, distribution_id = %self.distribution_id, "CreateInvalidation failed");
                e
            })?;

        let invalidation = output
            .invalidation()
            .ok_or("CreateInvalidation returned no invalidation")?;
        Ok(Invalidation {
            id: invalidation.id().to_string(),
            status: InvalidationStatus::from(invalidation.status()),
        })
    }

    async fn invalidation_status(&self, id: String) -> Result<InvalidationStatus, BoxError> {
        let output = self
            .client()
            .await
            .get_invalidation()
            .distribution_id(&self.distribution_id)
            .id(&id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, invalidation_id = %id, "GetInvalidation failed");
                e
            })?;

        let status = output
            .invalidation()
            .map(|i| InvalidationStatus::from(i.status()))
            .ok_or("GetInvalidation returned no invalidation")?;
        tracing::debug!(invalidation_id = %id, ?status, "Fetched invalidation status");
        Ok(status)
    }
}
