//! Rising-edge sources.
//!
//! The driving loop awaits edges from an [`EdgeSource`]. Two implementations
//! are provided:
//! 1. **Manual:** [`sim_clock`] returns a [`ClockDriver`] that queues edges one at a
//!    time, so a testbench controls exactly when the source advances.
//! 2. **Periodic:** [`PeriodicClock`] produces an edge every period on the tokio timer.
//!
//! An edge source reports `None` once it ends; the loop treats that as a
//! normal shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};

/// Produces numbered rising edges, starting at 1.
pub trait EdgeSource: Send {
    /// Waits for the next rising edge and returns its number, or `None` once
    /// the clock has stopped.
    fn rising_edge(&mut self) -> impl Future<Output = Option<u64>> + Send;
}

/// Creates a manually stepped clock.
///
/// Edges queued through the driver are never coalesced: every [`ClockDriver::tick`]
/// is observed once by the receiving loop. Dropping every driver stops the clock.
pub fn sim_clock() -> (ClockDriver, SimClock) {
    let (edges, receiver) = mpsc::unbounded_channel();
    (
        ClockDriver { edges },
        SimClock {
            edges: receiver,
            cycle: 0,
        },
    )
}

/// Sending half of a manually stepped clock.
#[derive(Debug, Clone)]
pub struct ClockDriver {
    edges: mpsc::UnboundedSender<()>,
}

impl ClockDriver {
    /// Queues one rising edge. Returns `false` if the clock has been dropped.
    pub fn tick(&self) -> bool {
        self.edges.send(()).is_ok()
    }

    /// Queues `count` rising edges and returns how many were accepted.
    pub fn ticks(&self, count: u64) -> u64 {
        (0..count).take_while(|_| self.tick()).count() as u64
    }
}

/// Receiving half of a manually stepped clock.
#[derive(Debug)]
pub struct SimClock {
    edges: mpsc::UnboundedReceiver<()>,
    cycle: u64,
}

impl SimClock {
    /// Returns the number of edges delivered so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }
}

impl EdgeSource for SimClock {
    async fn rising_edge(&mut self) -> Option<u64> {
        self.edges.recv().await?;
        self.cycle += 1;
        Some(self.cycle)
    }
}

/// Free-running clock on the tokio timer.
///
/// The first edge fires immediately. Late ticks are delayed rather than
/// bursted, so each edge is still observed exactly once.
#[derive(Debug)]
pub struct PeriodicClock {
    period: Duration,
    interval: Option<Interval>,
    cycle: u64,
    limit: Option<u64>,
}

impl PeriodicClock {
    /// Shortest period the timer accepts.
    pub const MIN_PERIOD: Duration = Duration::from_nanos(1);

    /// Creates a clock ticking every `period`, raised to [`Self::MIN_PERIOD`]
    /// if shorter.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Self::MIN_PERIOD),
            interval: None,
            cycle: 0,
            limit: None,
        }
    }

    /// Stops the clock after `edges` rising edges.
    #[must_use]
    pub const fn with_limit(mut self, edges: u64) -> Self {
        self.limit = Some(edges);
        self
    }

    /// Returns the clock period.
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl EdgeSource for PeriodicClock {
    async fn rising_edge(&mut self) -> Option<u64> {
        if self.limit.is_some_and(|limit| self.cycle >= limit) {
            return None;
        }
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let _instant = interval.tick().await;
        self.cycle += 1;
        Some(self.cycle)
    }
}
