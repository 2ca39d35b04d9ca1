//! Notification seam between the watch loop and chat platforms.

use {anyhow::Result, async_trait::async_trait};

/// Payload delivered when the watched version changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotice {
    /// Platform label, e.g. "Windows".
    pub platform: String,
    /// Newly observed platform version.
    pub version: String,
    /// Newly observed version date; becomes the watermark once the cycle
    /// completes.
    pub date: String,
}

/// Receives update notices — the chat side provides the concrete
/// implementation.
#[async_trait]
pub trait UpdateSink: Send + Sync {
    /// Deliver one notice. An error here withholds the watermark update so
    /// the next cycle re-detects the change and retries.
    async fn publish(&self, notice: &UpdateNotice) -> Result<()>;
}

/// Sink that only logs. Used for one-shot runs without a chat client.
pub struct LogSink;

#[async_trait]
impl UpdateSink for LogSink {
    async fn publish(&self, notice: &UpdateNotice) -> Result<()> {
        tracing::info!(
            platform = %notice.platform,
            version = %notice.version,
            date = %notice.date,
            "version update"
        );
        Ok(())
    }
}
