//! AXI-Stream transfer source library.
//!
//! This crate drives queued AXI-Stream transfers onto a device bus, one per
//! rising clock edge, with the following:
//! 1. **Transfer:** A named bundle of optional field values (`tdata` .. `tuser`).
//! 2. **Bus:** Views binding any subset of the stream fields to device signals.
//! 3. **Reset:** Merging of local and external resets with polarity and `areset` handling.
//! 4. **Source:** The queue-fed driving engine, its shared handle, and clocks.
//! 5. **Configuration:** JSON scenarios for in-memory harnesses, plus statistics.
//!
//! The bus view performs no protocol checking: `tvalid`, `tlast`, and the
//! other controls carry exactly what each transfer specifies.

/// Signals, devices, and bus views.
pub mod bus;
/// Common types (bit vectors, errors).
pub mod common;
/// Source and scenario configuration.
pub mod config;
/// Reset coordination (polarity, merging, edge detection).
pub mod reset;
/// Transfer engine, handle, and clocks.
pub mod source;
/// Source statistics collection and reporting.
pub mod stats;
/// Transfers and stream field identifiers.
pub mod transfer;

/// Fixed-width bit vector carried by transfers and signals.
pub use crate::common::Bits;
/// Field-to-signal bindings a source drives.
pub use crate::bus::BusView;
/// Shared handle to a running source; clone it into producer tasks.
pub use crate::source::SourceHandle;
/// Per-edge driving engine.
pub use crate::source::StreamSource;
/// One AXI-Stream transfer and its field identifiers.
pub use crate::transfer::{Field, Transfer};
