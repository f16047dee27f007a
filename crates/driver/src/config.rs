//! Configuration for transfer sources and simulated harnesses.
//!
//! This module defines all configuration structures used to parameterize a
//! source and the in-memory device it drives. It provides:
//! 1. **Defaults:** Baseline bus widths, prefix, and run length.
//! 2. **Structures:** Source reset behavior, bus layout, and complete scenarios.
//! 3. **Loading:** JSON deserialization from strings and files.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bus::{BusView, SimDut};
use crate::common::{ConfigError, SourceError};
use crate::reset::ResetPolarity;
use crate::source::StreamSource;
use crate::transfer::{Field, Transfer};

/// Default configuration constants.
mod defaults {
    /// Signal name prefix shared by every bus field (`s_axis_tdata`, ...).
    pub const PREFIX: &str = "s_axis";

    /// Width of `tdata` in bits.
    pub const DATA_WIDTH: usize = 64;

    /// Width of `tkeep` in bits (one qualifier per data byte).
    pub const KEEP_WIDTH: usize = DATA_WIDTH / 8;

    /// Number of clock edges a scenario runs for.
    pub const CYCLES: u64 = 20;
}

/// Reset and diagnostic behavior of a transfer source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Raw level of the external reset wire that requests a reset.
    #[serde(default = "SourceConfig::default_reset_active_level")]
    pub reset_active_level: bool,

    /// Flip the reported reset state relative to the merged reset level.
    #[serde(default)]
    pub areset: bool,

    /// Log a snapshot of the bus at every edge (`trace` level).
    #[serde(default)]
    pub trace_bus: bool,
}

impl SourceConfig {
    /// Returns the default active level of the reset wire (high).
    const fn default_reset_active_level() -> bool {
        true
    }

    /// Returns the polarity of the external reset wire.
    pub const fn polarity(&self) -> ResetPolarity {
        ResetPolarity::from_active_level(self.reset_active_level)
    }

    /// Returns the raw reset wire level under which the source runs normally.
    ///
    /// With `areset` set, normal operation is the wire held at its active level.
    pub const fn idle_reset_level(&self) -> bool {
        self.areset == self.reset_active_level
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            reset_active_level: Self::default_reset_active_level(),
            areset: false,
            trace_bus: false,
        }
    }
}

/// Signal layout of a simulated stream bus.
///
/// Only fields listed in `widths` exist on the device; the rest are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Prefix joined to each field name with `_`.
    #[serde(default = "BusConfig::default_prefix")]
    pub prefix: String,

    /// Declared width of every present field.
    #[serde(default = "BusConfig::default_widths")]
    pub widths: BTreeMap<Field, usize>,

    /// Suffix of a 1-bit external reset wire (e.g. `"aresetn"`), if any.
    #[serde(default)]
    pub reset: Option<String>,
}

impl BusConfig {
    /// Returns the default signal prefix.
    fn default_prefix() -> String {
        defaults::PREFIX.to_owned()
    }

    /// Returns the default layout: data, keep, and the three control bits.
    fn default_widths() -> BTreeMap<Field, usize> {
        BTreeMap::from([
            (Field::Data, defaults::DATA_WIDTH),
            (Field::Keep, defaults::KEEP_WIDTH),
            (Field::Valid, 1),
            (Field::Ready, 1),
            (Field::Last, 1),
        ])
    }

    /// Returns the full device name of a signal with the given suffix.
    pub fn signal_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_owned()
        } else {
            format!("{}_{suffix}", self.prefix)
        }
    }

    /// Returns the full device name of the reset wire, if configured.
    pub fn reset_signal_name(&self) -> Option<String> {
        self.reset.as_deref().map(|suffix| self.signal_name(suffix))
    }

    /// Builds an in-memory device exposing the configured signals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWidthSignal`] if any width is zero.
    pub fn build_dut(&self) -> Result<SimDut, ConfigError> {
        let mut dut = SimDut::new();
        for (&field, &width) in &self.widths {
            let name = self.signal_name(field.signal_name());
            if width == 0 {
                return Err(ConfigError::ZeroWidthSignal { name });
            }
            let _signal = dut.add_signal(name, width);
        }
        if let Some(name) = self.reset_signal_name() {
            let _signal = dut.add_signal(name, 1);
        }
        Ok(dut)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
            widths: Self::default_widths(),
            reset: None,
        }
    }
}

/// Drives the raw external reset wire to `level` for edges `start..end`; the
/// wire reads `!level` outside that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPulse {
    /// First edge with the wire at `level`.
    pub start: u64,
    /// First edge after the pulse.
    pub end: u64,
    /// Raw wire level during the pulse.
    #[serde(default)]
    pub level: bool,
}

impl ResetPulse {
    /// Returns the raw wire level before edge `cycle`.
    pub const fn level_at(&self, cycle: u64) -> bool {
        if cycle >= self.start && cycle < self.end {
            self.level
        } else {
            !self.level
        }
    }
}

/// A complete simulated run: source settings, bus layout, and transfers.
///
/// # Examples
///
/// ```
/// use axis_transfer::config::Scenario;
///
/// let json = r#"{
///     "source": { "reset_active_level": true, "areset": true },
///     "bus": {
///         "prefix": "s_axis",
///         "widths": { "tdata": 8, "tvalid": 1, "tlast": 1 },
///         "reset": "aresetn"
///     },
///     "transfers": [
///         { "name": "first", "tdata": "0xa5", "tvalid": "1", "tlast": "0" },
///         { "name": "end", "tdata": { "value": 7, "width": 8 }, "tvalid": "1", "tlast": "1" }
///     ],
///     "cycles": 4,
///     "reset_pulse": { "start": 0, "end": 1, "level": false }
/// }"#;
///
/// let scenario = Scenario::from_json_str(json).unwrap();
/// assert_eq!(scenario.transfers.len(), 2);
/// assert_eq!(scenario.bus.reset_signal_name().as_deref(), Some("s_axis_aresetn"));
/// assert!(scenario.transfers[1].is_last());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Device bus layout.
    #[serde(default)]
    pub bus: BusConfig,

    /// Transfers enqueued before the first edge, in order.
    #[serde(default)]
    pub transfers: Vec<Transfer>,

    /// Number of clock edges to run.
    #[serde(default = "Scenario::default_cycles")]
    pub cycles: u64,

    /// Level held on `tready` by the simulated sink, if the bus has it.
    #[serde(default)]
    pub sink_ready: Option<bool>,

    /// Optional pulse on the external reset wire.
    #[serde(default)]
    pub reset_pulse: Option<ResetPulse>,
}

impl Scenario {
    /// Returns the default number of clock edges.
    const fn default_cycles() -> u64 {
        defaults::CYCLES
    }

    /// Parses a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents or bit literals.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Json`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Binds a source to `dut` and enqueues every transfer in order.
    ///
    /// The configured reset wire, if the device has it, is sampled by the
    /// source at the start of every edge.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] only if the source stopped while
    /// enqueueing, which a freshly built source never does.
    pub fn build_source(&self, dut: &SimDut) -> Result<StreamSource, SourceError> {
        let view = BusView::from_prefix(dut, &self.bus.prefix);
        let mut source = StreamSource::new(view, &self.source);
        if let Some(wire) = self.bus.reset_signal_name().and_then(|name| dut.signal(&name)) {
            source = source.with_reset_signal(wire);
        }
        for transfer in &self.transfers {
            source.enqueue(transfer.clone())?;
        }
        Ok(source)
    }

    /// Returns the raw reset wire level before edge `cycle`.
    ///
    /// Without a pulse the wire rests at [`SourceConfig::idle_reset_level`].
    pub fn reset_level_at(&self, cycle: u64) -> bool {
        self.reset_pulse.map_or_else(
            || self.source.idle_reset_level(),
            |pulse| pulse.level_at(cycle),
        )
    }

    /// Drives the harness-owned inputs of `dut` before edge `cycle`: the reset
    /// wire and, when `sink_ready` is set, the sink's `tready`.
    pub fn drive_inputs(&self, dut: &SimDut, cycle: u64) {
        if let Some(wire) = self.bus.reset_signal_name().and_then(|name| dut.signal(&name)) {
            wire.set_bool(self.reset_level_at(cycle));
        }
        if let Some(ready) = self.sink_ready {
            let name = self.bus.signal_name(Field::Ready.signal_name());
            if let Some(wire) = dut.signal(&name) {
                wire.set_bool(ready);
            }
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            bus: BusConfig::default(),
            transfers: Vec::new(),
            cycles: Self::default_cycles(),
            sink_ready: None,
            reset_pulse: None,
        }
    }
}
