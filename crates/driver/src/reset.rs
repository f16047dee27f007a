//! Reset coordination.
//!
//! A source can be reset from two places: its own API (a local reset request)
//! and an external reset wire sampled from the device. This module provides:
//! 1. **Polarity:** Normalizing the raw wire level into "reset requested".
//! 2. **Merging:** The effective reset is the OR of both sources.
//! 3. **Edge detection:** A state change is reported exactly once per transition.
//!
//! The state reported to the owner is the effective reset XOR'd with the
//! `areset` flag. Buses whose reset is described by its de-asserted level
//! (`aresetn` style) set `areset` so one handler serves both conventions.

use serde::{Deserialize, Serialize};

/// Level at which the external reset wire requests a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolarity {
    /// Reset is requested while the wire reads 1.
    #[default]
    ActiveHigh,
    /// Reset is requested while the wire reads 0.
    ActiveLow,
}

impl ResetPolarity {
    /// Maps a configuration "active level" flag onto a polarity.
    pub const fn from_active_level(level: bool) -> Self {
        if level { Self::ActiveHigh } else { Self::ActiveLow }
    }

    /// Returns `true` if `raw` requests a reset under this polarity.
    pub const fn is_asserted(self, raw: bool) -> bool {
        match self {
            Self::ActiveHigh => raw,
            Self::ActiveLow => !raw,
        }
    }
}

/// State reported to the owner of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetState {
    /// Normal operation.
    Normal,
    /// Bus held in reset.
    Resetting,
}

impl ResetState {
    const fn from_active(active: bool) -> Self {
        if active { Self::Resetting } else { Self::Normal }
    }
}

/// Merges local and external reset requests into one edge-detected state.
///
/// # Examples
///
/// ```
/// use axis_transfer::reset::{ResetCoordinator, ResetPolarity, ResetState};
///
/// let mut reset = ResetCoordinator::new(ResetPolarity::ActiveLow, false);
/// assert_eq!(reset.observe_external(true), None);
/// assert_eq!(reset.observe_external(false), Some(ResetState::Resetting));
/// assert_eq!(reset.observe_external(false), None);
/// assert_eq!(reset.observe_external(true), Some(ResetState::Normal));
/// ```
#[derive(Debug, Clone)]
pub struct ResetCoordinator {
    polarity: ResetPolarity,
    areset: bool,
    local: bool,
    external: bool,
    effective: bool,
    state: ResetState,
}

impl ResetCoordinator {
    /// Creates a coordinator in the [`ResetState::Normal`] state.
    ///
    /// The merged level starts at the value that maps to `Normal` (low, or high
    /// when `areset` is set), so construction never reports a transition.
    pub const fn new(polarity: ResetPolarity, areset: bool) -> Self {
        Self {
            polarity,
            areset,
            local: false,
            external: false,
            effective: areset,
            state: ResetState::Normal,
        }
    }

    /// Returns the current state.
    pub const fn state(&self) -> ResetState {
        self.state
    }

    /// Returns `true` while the owner should hold the bus in reset.
    pub fn is_resetting(&self) -> bool {
        self.state == ResetState::Resetting
    }

    /// Returns the merged reset level before the `areset` flip.
    pub const fn effective(&self) -> bool {
        self.effective
    }

    /// Returns the polarity of the external wire.
    pub const fn polarity(&self) -> ResetPolarity {
        self.polarity
    }

    /// Sets the local reset request.
    ///
    /// Returns the new state if the effective reset changed.
    pub fn set_local(&mut self, asserted: bool) -> Option<ResetState> {
        self.local = asserted;
        self.update()
    }

    /// Samples the raw level of the external reset wire.
    ///
    /// Returns the new state if the effective reset changed.
    pub fn observe_external(&mut self, raw: bool) -> Option<ResetState> {
        self.external = self.polarity.is_asserted(raw);
        self.update()
    }

    fn update(&mut self) -> Option<ResetState> {
        let effective = self.local || self.external;
        if effective == self.effective {
            return None;
        }
        self.effective = effective;
        self.state = ResetState::from_active(effective ^ self.areset);
        Some(self.state)
    }
}
