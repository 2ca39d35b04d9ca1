//! Core watch loop: fetch, compare, notify, persist.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::{Result, WatchError},
    sink::{UpdateNotice, UpdateSink},
    source::{VersionRecord, fetch_version_record},
    store::WatermarkStore,
    ticker::Ticker,
};

/// What to watch and which response fields to read.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    /// Version endpoint polled for changes.
    pub endpoint: String,
    /// Platform label carried into notifications.
    pub platform: String,
    /// JSON field holding the platform version.
    pub version_field: String,
    /// JSON field holding the version date.
    pub date_field: String,
}

/// Terminal state of one watch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Remote value matches the watermark; no side effect.
    Unchanged,
    /// A change was noticed and handled; the watermark now holds this
    /// record's version date.
    Changed(VersionRecord),
}

/// The change watcher. Owns its HTTP client and handles to the watermark
/// store and the notification sink; no ambient globals.
pub struct Watcher {
    client: reqwest::Client,
    target: WatchTarget,
    store: Arc<dyn WatermarkStore>,
    sink: Arc<dyn UpdateSink>,
}

impl Watcher {
    /// The `client` should carry a bounded request timeout; an unbounded
    /// request would stall the whole loop.
    pub fn new(
        client: reqwest::Client,
        target: WatchTarget,
        store: Arc<dyn WatermarkStore>,
        sink: Arc<dyn UpdateSink>,
    ) -> Self {
        Self {
            client,
            target,
            store,
            sink,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Run one fetch-compare-notify-persist cycle.
    ///
    /// Every error leaves the watermark untouched. A delivery failure in
    /// particular withholds the watermark update, so the next cycle
    /// re-detects the same change and retries delivery; a duplicate
    /// notification after sink recovery is accepted over a silent miss.
    pub async fn cycle(&self) -> Result<CycleOutcome> {
        let record = fetch_version_record(
            &self.client,
            &self.target.endpoint,
            &self.target.version_field,
            &self.target.date_field,
        )
        .await?;

        let watermark = self
            .store
            .load()
            .await
            .map_err(|e| WatchError::store("read watermark", e))?
            // First run: nothing stored yet, so any real date counts as a
            // change.
            .unwrap_or_default();

        if record.version_date == watermark {
            debug!(date = %record.version_date, "version date unchanged");
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            platform = %self.target.platform,
            version = %record.platform_version,
            date = %record.version_date,
            previous = %watermark,
            "version change detected"
        );

        let notice = UpdateNotice {
            platform: self.target.platform.clone(),
            version: record.platform_version.clone(),
            date: record.version_date.clone(),
        };
        self.sink
            .publish(&notice)
            .await
            .map_err(WatchError::delivery)?;

        self.store
            .save(&record.version_date)
            .await
            .map_err(|e| WatchError::store("write watermark", e))?;

        Ok(CycleOutcome::Changed(record))
    }

    /// Drive cycles from `ticker` until it is exhausted.
    ///
    /// One cycle at a time: the next tick is not consumed until the current
    /// cycle finished. Cycle errors are logged and the loop keeps going;
    /// nothing short of the tick source ending stops it.
    pub async fn run(&self, mut ticker: impl Ticker) {
        while ticker.next_tick().await {
            match self.cycle().await {
                Ok(CycleOutcome::Changed(record)) => {
                    info!(
                        version = %record.platform_version,
                        date = %record.version_date,
                        "update notified"
                    );
                },
                Ok(CycleOutcome::Unchanged) => {},
                Err(e) => {
                    warn!(
                        error = %e,
                        endpoint = %self.target.endpoint,
                        "watch cycle failed; will retry on next tick"
                    );
                },
            }
        }
        debug!("tick source closed, watch loop ending");
    }
}
