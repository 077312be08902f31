//! [`EventPublisher`] that writes events to the log.
//!
//! Stands in for a notification queue; downstream consumers can tail the
//! structured `event` field.

use async_trait::async_trait;
use biography_core::Result;
use biography_core::event::{BiographyEvent, EventPublisher};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: BiographyEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(event = event.name(), payload = %payload, "[EventPublisher] Published");
        Ok(())
    }
}
