//! Tick sources driving watch cycles.

use std::time::Duration;

use {
    async_trait::async_trait,
    tokio::{
        sync::mpsc,
        time::{Interval, MissedTickBehavior},
    },
};

/// Produces the tick events that trigger watch cycles.
///
/// Decouples the cycle logic from wall-clock scheduling: production uses
/// [`IntervalTicker`], tests feed synthetic ticks through a
/// [`ChannelTicker`].
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. Returns `false` when the tick source is
    /// exhausted and the loop should end.
    async fn next_tick(&mut self) -> bool;
}

/// Wall-clock ticker with a fixed period. The first tick fires immediately.
///
/// Missed ticks are skipped: a cycle that overruns the period delays the
/// next cycle instead of causing a burst of catch-up cycles, keeping
/// at-most-one cycle in flight.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker fed through an mpsc channel, for tests and manual triggering.
pub struct ChannelTicker {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicker {
    /// Returns the ticker and the handle that injects ticks. Dropping every
    /// handle ends the loop.
    pub fn new() -> (TickHandle, Self) {
        let (tx, rx) = mpsc::channel(1);
        (TickHandle { tx }, Self { rx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Sends synthetic ticks into a [`ChannelTicker`].
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::Sender<()>,
}

impl TickHandle {
    /// Inject one tick. Waits until the previous tick was consumed.
    pub async fn tick(&self) {
        let _ = self.tx.send(()).await;
    }
}
