//! Progress ticker - periodic position sampling for one slot
//!
//! The ticker owns a timer task that enqueues [`FeedCommand::Tick`] at a fixed
//! cadence. Sampling itself happens on the coordination task, which asks the
//! ticker whether a tick is still current before reporting.
//!
//! Every `start`/`stop` bumps the ticker's epoch. A tick that was already in
//! the channel when `stop` ran carries the old epoch and is dropped, which is
//! what makes "no report after stop" hold even though the timer and the
//! coordination task are decoupled.

use crate::events::FeedCommand;
use crate::types::SlotId;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Percent of `duration_ms` reached at `position_ms`
///
/// `None` when the duration is unknown or zero. Clamped to 100.
pub fn progress_percent(position_ms: u64, duration_ms: u64) -> Option<u8> {
    if duration_ms == 0 {
        return None;
    }
    let percent = position_ms.saturating_mul(100) / duration_ms;
    Some(percent.min(100) as u8)
}

/// Per-slot polling timer
#[derive(Debug)]
pub struct ProgressTicker {
    slot: SlotId,
    interval: Duration,
    epoch: u64,
    suppressed: bool,
    task: Option<JoinHandle<()>>,
    commands: UnboundedSender<FeedCommand>,
}

impl ProgressTicker {
    pub fn new(slot: SlotId, interval: Duration, commands: UnboundedSender<FeedCommand>) -> Self {
        Self {
            slot,
            interval,
            epoch: 0,
            suppressed: false,
            task: None,
            commands,
        }
    }

    /// Begin sampling; restarts the period if already running
    ///
    /// Needs a tokio runtime. Without one the ticker stays stopped.
    pub fn start(&mut self) {
        self.cancel_task();
        self.epoch += 1;

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(slot = %self.slot, "No async runtime; progress ticker not started");
                return;
            }
        };

        let slot = self.slot;
        let epoch = self.epoch;
        let period = self.interval;
        let commands = self.commands.clone();

        self.task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if commands.send(FeedCommand::Tick { slot, epoch }).is_err() {
                    break;
                }
            }
        }));

        tracing::trace!(slot = %self.slot, epoch, "Progress ticker started");
    }

    /// Cancel sampling; idempotent
    ///
    /// Any tick already queued becomes stale.
    pub fn stop(&mut self) {
        if self.cancel_task() {
            tracing::trace!(slot = %self.slot, epoch = self.epoch, "Progress ticker stopped");
        }
        self.epoch += 1;
    }

    /// Drop reports while the user drags the seek bar
    ///
    /// Sampling keeps running; only reporting is affected.
    pub fn suppress_during_user_seek(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Turn a sample taken for tick `epoch` into a report
    ///
    /// `None` if the tick is stale, the ticker is stopped or suppressed, or the
    /// duration is unknown.
    pub fn report(&self, epoch: u64, position_ms: u64, duration_ms: Option<u64>) -> Option<u8> {
        if !self.accepts(epoch) || self.suppressed {
            return None;
        }
        progress_percent(position_ms, duration_ms?)
    }

    /// Whether a tick scheduled under `epoch` is still current
    pub fn accepts(&self, epoch: u64) -> bool {
        self.task.is_some() && epoch == self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn cancel_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel_task();
    }
}
