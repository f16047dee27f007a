//! Bus-side plumbing.
//!
//! This module connects transfers to device wires. It includes:
//! 1. **Signals:** The `Signal` trait and an in-memory implementation.
//! 2. **Devices:** Name lookup for binding a view by prefix.
//! 3. **Views:** The unconstrained field-to-signal bindings a source drives.

/// Device signal lookup and the in-memory device.
pub mod dut;

/// Signal trait and in-memory signal.
pub mod signal;

/// Field-to-signal bindings and snapshots.
pub mod view;

pub use dut::{SignalLookup, SimDut};
pub use signal::{Signal, SignalHandle, SimSignal};
pub use view::{BusSnapshot, BusView};
