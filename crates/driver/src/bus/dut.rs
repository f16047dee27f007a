//! Device-under-test signal lookup.
//!
//! A bus view binds to whatever signals a device exposes under a prefix.
//! [`SignalLookup`] is the seam a harness implements to expose its wires;
//! [`SimDut`] is the in-memory implementation used by the CLI and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bus::signal::{SignalHandle, SimSignal};

/// Resolves signal names on a device.
pub trait SignalLookup {
    /// Returns the signal called `name`, or `None` if the device has no such wire.
    fn lookup(&self, name: &str) -> Option<SignalHandle>;
}

/// A set of named in-memory signals standing in for a device.
#[derive(Debug, Default, Clone)]
pub struct SimDut {
    signals: BTreeMap<String, Arc<SimSignal>>,
}

impl SimDut {
    /// Creates a device with no signals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zero-valued signal, replacing any existing signal of the same name.
    pub fn add_signal(&mut self, name: impl Into<String>, width: usize) -> Arc<SimSignal> {
        let name = name.into();
        let signal = Arc::new(SimSignal::new(name.clone(), width));
        let _previous = self.signals.insert(name, Arc::clone(&signal));
        signal
    }

    /// Returns the signal called `name`.
    pub fn signal(&self, name: &str) -> Option<Arc<SimSignal>> {
        self.signals.get(name).cloned()
    }

    /// Iterates over signal names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }
}

impl SignalLookup for SimDut {
    fn lookup(&self, name: &str) -> Option<SignalHandle> {
        self.signals
            .get(name)
            .map(|signal| Arc::clone(signal) as SignalHandle)
    }
}
