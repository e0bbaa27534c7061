//! # S3 object store
//!
//! Bridges the core [`ObjectStore`] trait to `aws-sdk-s3`. Every request is
//! a single `PutObject`; the body is sent as-is, with `Cache-Control` and
//! (when known) `Content-Type` taken from the request.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use frontup_core::contract::{BoxError, ObjectStore, PutObject};
use tokio::sync::OnceCell;

use crate::aws::AwsSdk;

/// The client is built on the first upload.
pub struct S3Store {
    sdk: AwsSdk,
    client: OnceCell<Client>,
}

impl S3Store {
    pub fn new(sdk: AwsSdk) -> Self {
        Self {
            sdk,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                tracing::info!("Initialized S3 client");
                Client::new(self.sdk.config().await)
            })
            .await
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object<'a>(&self, req: PutObject<'a>) -> Result<(), BoxError> {
        tracing::debug!(
            bucket = req.bucket,
            key = req.key,
            content_type = req.content_type,
            size = req.body.len(),
            "Sending PutObject"
        );
        let result = self
            .client()
            .await
            .put_object()
            .bucket(req.bucket)
            .key(req.key)
            .cache_control(req.cache_control)
            .set_content_type(req.content_type.map(str::to_string))
            .body(ByteStream::from(req.body.into_bytes()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(error = ?e, bucket = req.bucket, key = req.key, "PutObject failed");
                Err(Box::new(e))
            }
        }
    }
}
