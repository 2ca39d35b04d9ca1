//! Persistence trait for the watch watermark.

use {anyhow::Result, async_trait::async_trait};

/// Durable storage for the last notified version date.
///
/// There is exactly one logical writer, the watch loop. A store holding no
/// value is the normal first-run state, not an error.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Read the current watermark. `None` means nothing was stored yet.
    async fn load(&self) -> Result<Option<String>>;

    /// Replace the watermark.
    async fn save(&self, value: &str) -> Result<()>;
}
