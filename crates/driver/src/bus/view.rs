//! Unconstrained AXI-Stream bus view.
//!
//! A [`BusView`] binds any subset of the eight stream fields to signals. The
//! set of bound fields is fixed once the view is built; every drive, zero, and
//! snapshot operation skips fields that are not bound.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bus::dut::SignalLookup;
use crate::bus::signal::SignalHandle;
use crate::common::{Bits, DriveError};
use crate::transfer::{Field, Transfer};

/// Named bindings from stream fields to signals.
#[derive(Debug, Clone)]
pub struct BusView {
    name: String,
    signals: [Option<SignalHandle>; Field::COUNT],
    current_transfer: Option<Arc<Transfer>>,
}

impl BusView {
    /// Creates a view with no bound fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Default::default(),
            current_transfer: None,
        }
    }

    /// Binds `field` to `signal`, replacing any earlier binding.
    #[must_use]
    pub fn with_signal(mut self, field: Field, signal: SignalHandle) -> Self {
        self.signals[field.index()] = Some(signal);
        self
    }

    /// Binds every `<prefix>_<field>` signal the device exposes (e.g.
    /// `s_axis_tvalid`). An empty prefix looks up the bare field names.
    pub fn from_prefix(device: &impl SignalLookup, prefix: &str) -> Self {
        let mut bus = Self::new(prefix);
        for field in Field::ALL {
            let name = if prefix.is_empty() {
                field.signal_name().to_owned()
            } else {
                format!("{prefix}_{}", field.signal_name())
            };
            bus.signals[field.index()] = device.lookup(&name);
        }
        bus
    }

    /// Returns the view's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if `field` is bound.
    pub fn has(&self, field: Field) -> bool {
        self.signals[field.index()].is_some()
    }

    /// Returns the signal bound to `field`.
    pub fn signal(&self, field: Field) -> Option<&SignalHandle> {
        self.signals[field.index()].as_ref()
    }

    /// Returns the declared width of the signal bound to `field`.
    pub fn width(&self, field: Field) -> Option<usize> {
        self.signal(field).map(|signal| signal.width())
    }

    /// Iterates over bound fields in signal order.
    pub fn bound(&self) -> impl Iterator<Item = (Field, &SignalHandle)> {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.signal(field).map(|signal| (field, signal)))
    }

    /// Returns the transfer most recently driven onto this view.
    pub fn current_transfer(&self) -> Option<&Arc<Transfer>> {
        self.current_transfer.as_ref()
    }

    /// Logs the width of every bound field and which fields are absent.
    pub fn log_layout(&self) {
        info!(bus = %self.name, "AXI stream signals:");
        for field in Field::ALL {
            match self.width(field) {
                Some(width) => info!(bus = %self.name, signal = %field, width, "  width: {width} bits"),
                None => info!(bus = %self.name, signal = %field, "  not present"),
            }
        }
    }

    /// Writes every field carried by `transfer` onto its bound signal.
    ///
    /// Fields missing on either side are left untouched. All widths are checked
    /// before anything is written, so a mismatch never leaves the bus half-driven.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::WidthMismatch`] if a carried field's width differs
    /// from its bound signal's declared width.
    pub fn drive(&mut self, transfer: Arc<Transfer>) -> Result<(), DriveError> {
        for (field, value) in transfer.fields() {
            if let Some(signal) = self.signal(field) {
                if signal.width() != value.width() {
                    return Err(DriveError::WidthMismatch {
                        transfer: transfer.label().to_owned(),
                        field,
                        signal: signal.name().to_owned(),
                        expected: signal.width(),
                        actual: value.width(),
                    });
                }
            }
        }

        for (field, value) in transfer.fields() {
            if let Some(signal) = self.signal(field) {
                signal.set_value(value.clone());
            }
        }
        self.current_transfer = Some(transfer);
        Ok(())
    }

    /// Writes zero to `field` if it is bound.
    pub fn deassert(&self, field: Field) {
        if let Some(signal) = self.signal(field) {
            signal.set_value(Bits::zero(signal.width()));
        }
    }

    /// Writes zero to every bound field.
    pub fn zero_all(&self) {
        for (_, signal) in self.bound() {
            signal.set_value(Bits::zero(signal.width()));
        }
    }

    /// Reads the current value of every bound field.
    pub fn snapshot(&self) -> BusSnapshot {
        BusSnapshot {
            bus: self.name.clone(),
            transfer: self
                .current_transfer
                .as_ref()
                .map(|transfer| transfer.label().to_owned()),
            signals: self
                .bound()
                .map(|(field, signal)| (field, signal.value()))
                .collect(),
        }
    }
}

/// Values of a bus view's bound fields at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusSnapshot {
    /// Name of the view.
    pub bus: String,
    /// Label of the transfer last driven, if any.
    pub transfer: Option<String>,
    /// Current value of each bound field.
    pub signals: BTreeMap<Field, Bits>,
}

impl BusSnapshot {
    /// Returns the value read for `field`, if it is bound.
    pub fn get(&self, field: Field) -> Option<&Bits> {
        self.signals.get(&field)
    }

    /// Returns the level of a single-bit field; unbound fields read low.
    pub fn level(&self, field: Field) -> bool {
        self.get(field).is_some_and(Bits::as_bool)
    }
}

impl fmt::Display for BusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transfer.as_deref().unwrap_or("-"))?;
        for (field, value) in &self.signals {
            write!(f, " {field}={value}")?;
        }
        Ok(())
    }
}
