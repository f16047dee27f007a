//! Transfer source engine.
//!
//! This module turns a queue of transfers into per-edge bus activity. It includes:
//! 1. **Engine:** The synchronous per-edge state machine (`StreamSource`).
//! 2. **Handle:** A shared handle with async waiters, and the `run` loop.
//! 3. **Clocks:** Edge sources that pace the loop.

/// Rising-edge sources.
pub mod clock;

/// Per-edge driving state machine.
pub mod engine;

/// Shared handle and driving loop.
pub mod handle;

pub use clock::{ClockDriver, EdgeSource, PeriodicClock, SimClock, sim_clock};
pub use engine::{EdgeOutcome, SourceStatus, StreamSource};
pub use handle::{SourceHandle, run};
