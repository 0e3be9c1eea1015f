//! Analytics sink that records events as structured log lines.

use async_trait::async_trait;
use promptbar_core::error::Result;
use promptbar_core::host::{AnalyticsEvent, AnalyticsSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn track(&self, event: AnalyticsEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(
            target: "promptbar::analytics",
            event = %payload,
            "[Analytics] Event tracked"
        );
        Ok(())
    }
}
