//! In-memory store for testing.

use std::sync::Mutex;

use {anyhow::Result, async_trait::async_trait};

use crate::store::WatermarkStore;

/// In-memory store backed by a `Mutex`. No persistence — for tests only.
pub struct InMemoryStore {
    value: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Start with a pre-existing watermark.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    /// Snapshot of the stored value, for assertions.
    pub fn current(&self) -> Option<String> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.value.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, value: &str) -> Result<()> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(value.to_string());
        Ok(())
    }
}
