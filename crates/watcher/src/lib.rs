//! Change watcher core: poll a version endpoint, compare against a
//! persisted watermark, notify on change, persist the new value.
//!
//! The loop is sequential. One cycle runs at a time; each cycle completes
//! or aborts with the watermark untouched, so a crash or a bad response
//! never corrupts change detection.

pub mod error;
pub mod sink;
pub mod source;
pub mod store;
pub mod store_file;
pub mod store_memory;
pub mod ticker;
pub mod watcher;

pub use {
    error::{Result, WatchError},
    sink::{LogSink, UpdateNotice, UpdateSink},
    source::{VersionRecord, fetch_version_record},
    store::WatermarkStore,
    store_file::FileStore,
    store_memory::InMemoryStore,
    ticker::{ChannelTicker, IntervalTicker, TickHandle, Ticker},
    watcher::{CycleOutcome, WatchTarget, Watcher},
};
