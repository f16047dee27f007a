//! Source statistics collection and reporting.
//!
//! This module tracks what a transfer source did on every clock edge. It provides:
//! 1. **Edges:** Total edges and how each was spent (driving, idle, paused, reset).
//! 2. **Transfers:** Dequeued and driven counts.
//! 3. **Losses:** Transfers flushed by reset and entries discarded by `clear` or teardown.

use std::fmt;

use serde::Serialize;

/// Per-source counters, updated once per clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// Rising edges processed.
    pub edges: u64,
    /// Transfers taken off the pending queue.
    pub dequeued: u64,
    /// Transfers committed onto the bus.
    pub driven: u64,
    /// Edges with nothing queued or in flight.
    pub idle_edges: u64,
    /// Edges where a transfer was held back by the pause gate.
    pub paused_edges: u64,
    /// Edges spent with the bus held in reset.
    pub reset_edges: u64,
    /// In-flight transfers discarded by a reset.
    pub flushed: u64,
    /// Pending transfers discarded by `clear` or teardown.
    pub discarded: u64,
}

impl SourceStats {
    /// Returns the fraction of edges that committed a transfer.
    pub fn utilization(&self) -> f64 {
        if self.edges == 0 {
            0.0
        } else {
            self.driven as f64 / self.edges as f64
        }
    }
}

impl fmt::Display for SourceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "TRANSFER SOURCE STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "edges                    {}", self.edges)?;
        writeln!(
            f,
            "transfers driven         {} ({:.1}% of edges)",
            self.driven,
            self.utilization() * 100.0
        )?;
        writeln!(f, "transfers dequeued       {}", self.dequeued)?;
        writeln!(f, "idle edges               {}", self.idle_edges)?;
        writeln!(f, "paused edges             {}", self.paused_edges)?;
        writeln!(f, "reset edges              {}", self.reset_edges)?;
        writeln!(f, "flushed by reset         {}", self.flushed)?;
        write!(f, "discarded from queue     {}", self.discarded)
    }
}
