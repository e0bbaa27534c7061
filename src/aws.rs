//! Shared, lazily loaded AWS configuration.
//!
//! Resolving the region and credential chain may hit the network (instance
//! metadata), so it happens on the first SDK call, not at startup. A dry run
//! against an explicit bucket therefore never loads it.

use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use tokio::sync::OnceCell;

/// Cloneable handle; every clone shares the same loaded [`SdkConfig`].
#[derive(Debug, Clone, Default)]
pub struct AwsSdk {
    config: Arc<OnceCell<SdkConfig>>,
}

impl AwsSdk {
    pub async fn config(&self) -> &SdkConfig {
        self.config
            .get_or_init(|| async {
                let sdk = aws_config::load_defaults(BehaviorVersion::latest()).await;
                tracing::info!(region = ?sdk.region(), "Loaded AWS configuration");
                sdk
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.config.initialized()
    }
}
