//! Signal handles.
//!
//! This module defines the `Signal` trait implemented by every wire the bus
//! view can drive. It provides:
//! 1. **Identification:** `name` and declared `width`.
//! 2. **Access:** Reading the current value and writing a new one.
//! 3. **Simulation:** [`SimSignal`], an in-memory wire for harnesses without a simulator.
//!
//! All implementors must be `Send + Sync` so a source can be shared between
//! producer tasks and the edge loop.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::common::Bits;

/// A single named wire with a fixed declared width.
pub trait Signal: fmt::Debug + Send + Sync {
    /// Returns the full signal name (e.g. `"s_axis_tvalid"`).
    fn name(&self) -> &str;
    /// Returns the declared width in bits.
    fn width(&self) -> usize;
    /// Reads the current value.
    fn value(&self) -> Bits;
    /// Writes a new value of the declared width.
    ///
    /// A value of any other width is rejected and the signal keeps its
    /// previous value.
    fn set_value(&self, value: Bits);
}

/// Shared handle to a bound signal.
pub type SignalHandle = Arc<dyn Signal>;

/// In-memory signal holding its last written value.
///
/// Starts at zero. Writes take effect immediately; there is no delta-cycle
/// scheduling.
#[derive(Debug)]
pub struct SimSignal {
    name: String,
    width: usize,
    value: Mutex<Bits>,
}

impl SimSignal {
    /// Creates a zero-valued signal.
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
            value: Mutex::new(Bits::zero(width)),
        }
    }

    /// Drives the least significant bit to `level` and clears the rest.
    pub fn set_bool(&self, level: bool) {
        let value = Bits::from_u64(u64::from(level), self.width)
            .unwrap_or_else(|_| Bits::zero(self.width));
        self.set_value(value);
    }

    /// Returns the least significant bit.
    pub fn get_bool(&self) -> bool {
        self.value().as_bool()
    }
}

impl Signal for SimSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        self.width
    }

    fn value(&self) -> Bits {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_value(&self, value: Bits) {
        if value.width() != self.width {
            error!(
                signal = %self.name,
                expected = self.width,
                actual = value.width(),
                "rejected write of mismatched width"
            );
            return;
        }
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}
