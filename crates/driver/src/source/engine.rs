//! Per-edge transfer driving state machine.
//!
//! [`StreamSource`] owns the pending queue, the bus view, and the reset
//! coordinator. Each call to [`StreamSource::on_rising_edge`] is one iteration
//! of the driving loop:
//! 1. **Dequeue:** With nothing in flight, take the oldest pending transfer.
//! 2. **Commit:** Unless paused, drive it onto the bus and clear the slot.
//! 3. **Idle framing:** Otherwise deassert `tvalid`/`tlast` and report idle when empty.
//!
//! At most one transfer is committed per edge. A reset transition zeroes the
//! bus and discards the in-flight transfer without re-enqueueing it; the lost
//! transfer is published on the status channel. Idleness is only decided on
//! an edge.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::bus::{BusSnapshot, BusView, SignalHandle};
use crate::common::{DriveError, SourceError};
use crate::config::SourceConfig;
use crate::reset::{ResetCoordinator, ResetState};
use crate::stats::SourceStats;
use crate::transfer::{Field, Transfer};

/// Result of one rising edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The transfer was committed onto the bus.
    Driven(Arc<Transfer>),
    /// A dequeued transfer is held back by the pause gate.
    Paused,
    /// Nothing was queued or in flight.
    Idle,
    /// The bus is held in reset.
    Reset,
    /// The source has been torn down and no longer drives.
    Stopped,
}

/// Source state published to waiters after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStatus {
    /// Pending transfers not yet dequeued.
    pub queued: usize,
    /// A transfer has been dequeued but not committed.
    pub in_flight: bool,
    /// A transfer is being driven.
    pub active: bool,
    /// The last edge saw an empty queue and nothing in flight.
    pub idle: bool,
    /// Total dequeue events so far.
    pub dequeues: u64,
    /// Total in-flight transfers flushed by reset so far.
    pub flushed: u64,
    /// The transfer lost to the most recent flush.
    pub last_flushed: Option<Arc<Transfer>>,
    /// The source was torn down.
    pub torn_down: bool,
}

/// Boxed per-edge pause pattern.
type PauseGenerator = Box<dyn Iterator<Item = bool> + Send>;

/// Queue-fed AXI-Stream source driving one bus view.
pub struct StreamSource {
    bus: BusView,
    queue: VecDeque<Arc<Transfer>>,
    in_flight: Option<Arc<Transfer>>,
    last_flushed: Option<Arc<Transfer>>,
    active: bool,
    idle: bool,
    paused: bool,
    pause_generator: Option<PauseGenerator>,
    reset: ResetCoordinator,
    reset_signal: Option<SignalHandle>,
    trace_bus: bool,
    torn_down: bool,
    stats: SourceStats,
    status: watch::Sender<SourceStatus>,
}

impl StreamSource {
    /// Creates an idle source driving `bus`.
    ///
    /// Logs the bus layout once at construction.
    pub fn new(bus: BusView, config: &SourceConfig) -> Self {
        bus.log_layout();
        let (status, _) = watch::channel(SourceStatus {
            idle: true,
            ..SourceStatus::default()
        });
        Self {
            bus,
            queue: VecDeque::new(),
            in_flight: None,
            last_flushed: None,
            active: false,
            idle: true,
            paused: false,
            pause_generator: None,
            reset: ResetCoordinator::new(config.polarity(), config.areset),
            reset_signal: None,
            trace_bus: config.trace_bus,
            torn_down: false,
            stats: SourceStats::default(),
            status,
        }
    }

    /// Samples `signal` as the external reset wire at the start of every edge.
    #[must_use]
    pub fn with_reset_signal(mut self, signal: SignalHandle) -> Self {
        self.reset_signal = Some(signal);
        self
    }

    /// Appends `transfer` to the pending queue. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] once the source has been torn down.
    pub fn enqueue(&mut self, transfer: Transfer) -> Result<(), SourceError> {
        if self.torn_down {
            return Err(SourceError::TornDown);
        }
        self.queue.push_back(Arc::new(transfer));
        self.idle = false;
        self.publish();
        Ok(())
    }

    /// Returns the number of pending transfers.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no transfer is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns `true` if nothing is pending, in flight, or being driven.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_none() && !self.active
    }

    /// Returns `true` while a transfer is being driven or held.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the pause gate.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Opens or closes the pause gate. Enqueues are accepted while paused.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Drives the pause gate from `generator`, one value per edge.
    ///
    /// The generator overrides [`set_paused`](Self::set_paused) until it is
    /// exhausted or cleared; the gate keeps its last generated value afterwards.
    pub fn set_pause_generator<I>(&mut self, generator: I)
    where
        I: IntoIterator<Item = bool>,
        I::IntoIter: Send + 'static,
    {
        self.pause_generator = Some(Box::new(generator.into_iter()));
    }

    /// Removes the pause generator, leaving the gate at its current value.
    pub fn clear_pause_generator(&mut self) {
        self.pause_generator = None;
    }

    /// Discards every pending transfer and returns how many were dropped.
    ///
    /// The in-flight transfer, if any, is unaffected.
    pub fn clear(&mut self) -> usize {
        let discarded = self.queue.len();
        self.queue.clear();
        if discarded > 0 {
            warn!(bus = %self.bus.name(), discarded, "cleared pending transfers");
            self.stats.discarded += discarded as u64;
        }
        self.publish();
        discarded
    }

    /// Sets the local reset request.
    pub fn set_local_reset(&mut self, asserted: bool) {
        if let Some(state) = self.reset.set_local(asserted) {
            self.handle_reset(state);
        }
    }

    /// Samples the raw level of the external reset wire.
    pub fn observe_external_reset(&mut self, raw: bool) {
        if let Some(state) = self.reset.observe_external(raw) {
            self.handle_reset(state);
        }
    }

    /// Returns the reset state.
    pub const fn reset_state(&self) -> ResetState {
        self.reset.state()
    }

    /// Returns the driven bus view.
    pub const fn bus(&self) -> &BusView {
        &self.bus
    }

    /// Reads the current bus values.
    pub fn snapshot(&self) -> BusSnapshot {
        self.bus.snapshot()
    }

    /// Returns the transfer dequeued but not yet committed.
    pub const fn in_flight(&self) -> Option<&Arc<Transfer>> {
        self.in_flight.as_ref()
    }

    /// Returns the transfer discarded by the most recent reset flush.
    pub const fn last_flushed(&self) -> Option<&Arc<Transfer>> {
        self.last_flushed.as_ref()
    }

    /// Returns the collected statistics.
    pub const fn stats(&self) -> SourceStats {
        self.stats
    }

    /// Returns `true` once the source has been torn down.
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns a receiver observing every status change.
    pub fn subscribe(&self) -> watch::Receiver<SourceStatus> {
        self.status.subscribe()
    }

    /// Runs one rising edge of the driving loop.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] if the dequeued transfer does not match the bus
    /// widths. The transfer is lost and the caller is expected to stop.
    pub fn on_rising_edge(&mut self) -> Result<EdgeOutcome, DriveError> {
        if self.torn_down {
            return Ok(EdgeOutcome::Stopped);
        }
        self.stats.edges += 1;
        self.sample_reset_signal();
        self.advance_pause_generator();

        if self.trace_bus {
            trace!(bus = %self.bus.name(), state = %self.bus.snapshot(), "run cycle");
        }

        if self.reset.is_resetting() {
            self.hold_idle();
            self.active = false;
            self.idle = self.queue.is_empty() && self.in_flight.is_none();
            self.stats.reset_edges += 1;
            self.publish();
            return Ok(EdgeOutcome::Reset);
        }

        if self.in_flight.is_none() {
            if let Some(transfer) = self.queue.pop_front() {
                debug!(bus = %self.bus.name(), transfer = %transfer.label(), "next transfer");
                self.stats.dequeued += 1;
                self.in_flight = Some(transfer);
                self.active = true;
                self.idle = false;
            }
        }

        let outcome = match self.in_flight.take() {
            Some(transfer) if !self.paused => {
                self.bus.drive(Arc::clone(&transfer))?;
                self.stats.driven += 1;
                EdgeOutcome::Driven(transfer)
            }
            held => {
                self.in_flight = held;
                self.hold_idle();
                self.active = self.in_flight.is_some();
                if self.active {
                    self.stats.paused_edges += 1;
                    EdgeOutcome::Paused
                } else {
                    if !self.idle {
                        debug!(bus = %self.bus.name(), "source idle");
                    }
                    self.idle = true;
                    self.stats.idle_edges += 1;
                    EdgeOutcome::Idle
                }
            }
        };

        self.publish();
        Ok(outcome)
    }

    /// Stops the source: drops every pending and in-flight transfer and wakes
    /// all waiters with [`SourceError::TornDown`]. Idempotent.
    pub fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }
        let discarded = self.queue.len() + usize::from(self.in_flight.is_some());
        self.queue.clear();
        self.in_flight = None;
        if discarded > 0 {
            warn!(bus = %self.bus.name(), discarded, "discarding pending transfers at teardown");
            self.stats.discarded += discarded as u64;
        }
        self.torn_down = true;
        self.active = false;
        info!(bus = %self.bus.name(), "run stopped");
        self.publish();
    }

    fn handle_reset(&mut self, state: ResetState) {
        match state {
            ResetState::Resetting => {
                info!(bus = %self.bus.name(), "reset asserted");
                self.bus.zero_all();
                if let Some(transfer) = self.in_flight.take() {
                    warn!(
                        bus = %self.bus.name(),
                        transfer = %transfer,
                        "flushed transmit transfer during reset"
                    );
                    self.stats.flushed += 1;
                    self.last_flushed = Some(transfer);
                }
                self.active = false;
            }
            ResetState::Normal => info!(bus = %self.bus.name(), "reset de-asserted"),
        }
        self.publish();
    }

    fn sample_reset_signal(&mut self) {
        let raw = self
            .reset_signal
            .as_ref()
            .map(|signal| signal.value().as_bool());
        if let Some(raw) = raw {
            self.observe_external_reset(raw);
        }
    }

    fn advance_pause_generator(&mut self) {
        match self.pause_generator.as_mut().map(|generator| generator.next()) {
            Some(Some(paused)) => self.paused = paused,
            Some(None) => self.pause_generator = None,
            None => {}
        }
    }

    /// Deasserts the framing controls so the sink sees no beat.
    fn hold_idle(&self) {
        self.bus.deassert(Field::Valid);
        self.bus.deassert(Field::Last);
    }

    fn publish(&self) {
        let next = SourceStatus {
            queued: self.queue.len(),
            in_flight: self.in_flight.is_some(),
            active: self.active,
            idle: self.idle,
            dequeues: self.stats.dequeued,
            flushed: self.stats.flushed,
            last_flushed: self.last_flushed.clone(),
            torn_down: self.torn_down,
        };
        let _ = self.status.send_if_modified(|status| {
            let changed = *status != next;
            *status = next;
            changed
        });
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("bus", &self.bus.name())
            .field("queued", &self.queue.len())
            .field("in_flight", &self.in_flight.as_ref().map(|t| t.label()))
            .field("active", &self.active)
            .field("paused", &self.paused)
            .field("reset", &self.reset.state())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
