//! Shared source handle and the asynchronous driving loop.
//!
//! A [`SourceHandle`] is cheap to clone. Producer tasks enqueue through it
//! while [`run`] advances the engine on every rising edge. Waiters observe
//! the engine through a status channel and are woken with
//! [`SourceError::TornDown`] once the loop stops, so none of them hang.
//!
//! The engine lock is only taken for the duration of one call and never across
//! an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{error, info};

use crate::bus::BusSnapshot;
use crate::common::{DriveError, SourceError};
use crate::reset::ResetState;
use crate::source::clock::EdgeSource;
use crate::source::engine::{EdgeOutcome, SourceStatus, StreamSource};
use crate::stats::SourceStats;
use crate::transfer::Transfer;

/// Cloneable, thread-safe handle to a [`StreamSource`].
///
/// # Examples
///
/// ```
/// use axis_transfer::bus::{BusView, SimDut};
/// use axis_transfer::config::SourceConfig;
/// use axis_transfer::source::{EdgeOutcome, SourceHandle, StreamSource};
/// use axis_transfer::transfer::Transfer;
///
/// let mut dut = SimDut::new();
/// let valid = dut.add_signal("s_axis_tvalid", 1);
/// let bus = BusView::from_prefix(&dut, "s_axis");
/// let source = SourceHandle::new(StreamSource::new(bus, &SourceConfig::default()));
///
/// source.send_nowait(Transfer::new("beat").with_valid(true)).unwrap();
/// assert!(matches!(source.step(), Ok(EdgeOutcome::Driven(_))));
/// assert!(valid.get_bool());
/// assert_eq!(source.step(), Ok(EdgeOutcome::Idle));
/// assert!(!valid.get_bool());
/// ```
#[derive(Debug, Clone)]
pub struct SourceHandle {
    engine: Arc<Mutex<StreamSource>>,
}

impl SourceHandle {
    /// Wraps `engine` for sharing.
    pub fn new(engine: StreamSource) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Locks the engine for direct access.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, StreamSource> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `transfer` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] once the source has stopped.
    pub fn send_nowait(&self, transfer: Transfer) -> Result<(), SourceError> {
        self.lock().enqueue(transfer)
    }

    /// Enqueues `transfer` and yields to the scheduler.
    ///
    /// The queue is unbounded, so this never waits for space.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] once the source has stopped.
    pub async fn send(&self, transfer: Transfer) -> Result<(), SourceError> {
        self.send_nowait(transfer)?;
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Returns the number of pending transfers.
    pub fn count(&self) -> usize {
        self.lock().count()
    }

    /// Returns `true` if no transfer is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if nothing is pending, in flight, or being driven.
    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    /// Returns `true` while a transfer is being driven or held.
    pub fn is_active(&self) -> bool {
        self.lock().is_active()
    }

    /// Discards every pending transfer and returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.lock().clear()
    }

    /// Returns the pause gate.
    pub fn is_paused(&self) -> bool {
        self.lock().is_paused()
    }

    /// Opens or closes the pause gate.
    pub fn set_paused(&self, paused: bool) {
        self.lock().set_paused(paused);
    }

    /// Drives the pause gate from `generator`, one value per edge.
    pub fn set_pause_generator<I>(&self, generator: I)
    where
        I: IntoIterator<Item = bool>,
        I::IntoIter: Send + 'static,
    {
        self.lock().set_pause_generator(generator);
    }

    /// Removes the pause generator.
    pub fn clear_pause_generator(&self) {
        self.lock().clear_pause_generator();
    }

    /// Sets the local reset request.
    pub fn set_local_reset(&self, asserted: bool) {
        self.lock().set_local_reset(asserted);
    }

    /// Samples the raw level of the external reset wire.
    pub fn observe_external_reset(&self, raw: bool) {
        self.lock().observe_external_reset(raw);
    }

    /// Returns the reset state.
    pub fn reset_state(&self) -> ResetState {
        self.lock().reset_state()
    }

    /// Returns the collected statistics.
    pub fn stats(&self) -> SourceStats {
        self.lock().stats()
    }

    /// Reads the current bus values.
    pub fn snapshot(&self) -> BusSnapshot {
        self.lock().snapshot()
    }

    /// Returns the transfer most recently driven onto the bus.
    pub fn current_transfer(&self) -> Option<Arc<Transfer>> {
        self.lock().bus().current_transfer().cloned()
    }

    /// Returns `true` once the source has stopped.
    pub fn is_torn_down(&self) -> bool {
        self.lock().is_torn_down()
    }

    /// Runs one rising edge synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] on a width mismatch.
    pub fn step(&self) -> Result<EdgeOutcome, DriveError> {
        self.lock().on_rising_edge()
    }

    /// Tears the source down: pending transfers are discarded and every waiter
    /// fails with [`SourceError::TornDown`].
    pub fn stop(&self) {
        self.lock().tear_down();
    }

    /// Waits until an edge has seen an empty queue with nothing in flight.
    ///
    /// Returns immediately if the source is already idle.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] if the source stops first.
    pub async fn wait_idle(&self) -> Result<(), SourceError> {
        let status = self.lock().subscribe();
        wait_for_status(status, |status| status.idle).await
    }

    /// Waits until the pending queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] if the source stops first.
    pub async fn wait_drained(&self) -> Result<(), SourceError> {
        let status = self.lock().subscribe();
        wait_for_status(status, |status| status.queued == 0).await
    }

    /// Waits for the next dequeue event after this call.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] if the source stops first.
    pub async fn wait_dequeue(&self) -> Result<(), SourceError> {
        let mut status = self.lock().subscribe();
        let seen = status.borrow_and_update().dequeues;
        wait_for_status(status, move |status| status.dequeues != seen).await
    }

    /// Waits for the next reset flush after this call and returns the
    /// transfer it discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TornDown`] if the source stops first.
    pub async fn wait_flush(&self) -> Result<Arc<Transfer>, SourceError> {
        let mut status = self.lock().subscribe();
        let seen = status.borrow_and_update().flushed;
        let current = status
            .wait_for(|status| status.torn_down || status.flushed != seen)
            .await
            .map_err(|_| SourceError::TornDown)?;
        match &current.last_flushed {
            Some(transfer) if current.flushed != seen => Ok(Arc::clone(transfer)),
            _ => Err(SourceError::TornDown),
        }
    }
}

async fn wait_for_status(
    mut status: watch::Receiver<SourceStatus>,
    mut ready: impl FnMut(&SourceStatus) -> bool + Send,
) -> Result<(), SourceError> {
    let torn_down = status
        .wait_for(|status| status.torn_down || ready(status))
        .await
        .map_err(|_| SourceError::TornDown)?
        .torn_down;
    if torn_down {
        Err(SourceError::TornDown)
    } else {
        Ok(())
    }
}

/// Drives `source` on every rising edge of `clock` until the clock ends, the
/// source is stopped, or a drive fails.
///
/// The source is torn down on exit, releasing every waiter.
///
/// # Errors
///
/// Returns [`SourceError::Drive`] if a transfer could not be driven.
pub async fn run<C: EdgeSource>(source: SourceHandle, mut clock: C) -> Result<(), SourceError> {
    let bus = source.lock().bus().name().to_owned();
    info!(bus = %bus, "run starts");

    let result = loop {
        let Some(cycle) = clock.rising_edge().await else {
            info!(bus = %bus, "clock stopped");
            break Ok(());
        };
        match source.step() {
            Ok(EdgeOutcome::Stopped) => break Ok(()),
            Ok(_) => {}
            Err(err) => {
                error!(bus = %bus, cycle, %err, "failed to drive transfer");
                break Err(SourceError::from(err));
            }
        }
    };

    source.stop();
    result
}
