//! [`MediaStore`] for deployments without object storage.

use async_trait::async_trait;
use biography_core::Result;
use biography_core::media::MediaStore;

/// Logs releases instead of deleting objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMediaStore;

#[async_trait]
impl MediaStore for TracingMediaStore {
    async fn release(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Ok(());
        }
        tracing::info!(url = %url, "[MediaStore] Released image");
        Ok(())
    }
}
