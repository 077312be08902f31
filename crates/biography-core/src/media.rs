//! Image storage port.

use crate::error::Result;
use async_trait::async_trait;

/// Releases stored images once no record references them.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Releases the object behind `url`. Unknown urls are ignored.
    async fn release(&self, url: &str) -> Result<()>;
}
