//! Playback slot - one visible list position and its playback resources
//!
//! Owns the lifecycle state machine:
//!
//! | From | Trigger | To |
//! |---|---|---|
//! | Unbound | `bind` | Preparing |
//! | Preparing | player `Ready` | Ready, or Playing when play was requested |
//! | Ready / Paused | `resume` | Playing |
//! | Playing | `pause` | Paused |
//! | Ready / Playing / Paused | player `Ended` | Ended, then Paused at 0 |
//! | any bound | player `Error` | Error |
//! | Error | `resume` | Preparing (user re-trigger) |
//! | any bound | `recycle` | Released, then Unbound |

use crate::error::PlayerError;
use crate::events::{EventSink, FeedEvent};
use crate::gesture::GestureRouter;
use crate::handle::PlaybackHandle;
use crate::player::PlayerNotification;
use crate::ticker::ProgressTicker;
use crate::types::{HandleId, SlotId, SlotState};
use fuplay_core::MediaItem;

/// Binding between one list position and one player resource
#[derive(Debug)]
pub struct PlaybackSlot {
    id: SlotId,
    index: Option<usize>,
    item: Option<MediaItem>,
    handle: Option<PlaybackHandle>,
    ticker: ProgressTicker,
    gestures: GestureRouter,
    state: SlotState,
    focused: bool,
    events: EventSink,
}

impl PlaybackSlot {
    pub fn new(
        id: SlotId,
        ticker: ProgressTicker,
        gestures: GestureRouter,
        events: EventSink,
    ) -> Self {
        Self {
            id,
            index: None,
            item: None,
            handle: None,
            ticker,
            gestures,
            state: SlotState::Unbound,
            focused: false,
            events,
        }
    }

    /// Represent `index` with a fresh handle: load, then start preparing
    ///
    /// A still-bound slot is recycled first. A load failure leaves the slot
    /// bound in `Error`, holding the failed handle.
    pub fn bind(&mut self, index: usize, item: MediaItem, mut handle: PlaybackHandle) {
        if self.state.is_bound() {
            self.recycle();
        }

        self.index = Some(index);
        self.gestures.reset();

        let result = handle.load(&item);
        tracing::debug!(slot = %self.id, index, handle = %handle.id(), source = %item.source_locator, "Binding slot");

        self.item = Some(item);
        match result {
            Ok(()) => {
                handle.prepare();
                self.handle = Some(handle);
                self.transition(SlotState::Preparing);
            }
            Err(error) => {
                self.handle = Some(handle);
                self.fail(error);
            }
        }
    }

    /// Grant playback
    ///
    /// Returns whether the slot is now playing or will play once buffered.
    pub fn resume(&mut self) -> bool {
        match self.state {
            SlotState::Unbound | SlotState::Released => false,
            SlotState::Playing => true,
            SlotState::Preparing => {
                if let Some(handle) = self.handle.as_mut() {
                    handle.set_play_when_ready(true);
                }
                true
            }
            SlotState::Ready | SlotState::Paused | SlotState::Ended => {
                let Some(handle) = self.handle.as_mut() else {
                    return false;
                };
                handle.set_play_when_ready(true);
                self.ticker.start();
                self.transition(SlotState::Playing);
                true
            }
            SlotState::Error => self.retry(),
        }
    }

    /// Withdraw playback
    pub fn pause(&mut self) {
        match self.state {
            SlotState::Playing => {
                if let Some(handle) = self.handle.as_mut() {
                    handle.set_play_when_ready(false);
                }
                self.ticker.stop();
                self.transition(SlotState::Paused);
            }
            SlotState::Preparing => {
                if let Some(handle) = self.handle.as_mut().filter(|h| h.play_when_ready()) {
                    handle.set_play_when_ready(false);
                }
            }
            _ => {}
        }
    }

    /// Tear down the handle and return to `Unbound`
    ///
    /// The ticker stops before the handle is released. Idempotent.
    pub fn recycle(&mut self) {
        if self.state == SlotState::Unbound {
            return;
        }

        self.ticker.stop();
        self.ticker.suppress_during_user_seek(false);
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
        self.transition(SlotState::Released);

        self.index = None;
        self.item = None;
        self.focused = false;
        self.gestures.reset();
        self.transition(SlotState::Unbound);
    }

    /// Handle a notification from the player bound as `handle`
    ///
    /// Notifications from any other handle (typically one released by a
    /// recycle) are discarded.
    pub fn on_notification(&mut self, handle: HandleId, notification: PlayerNotification) {
        let Some(current) = self.handle.as_mut().filter(|h| h.id() == handle) else {
            tracing::trace!(slot = %self.id, %handle, ?notification, "Discarding stale notification");
            return;
        };

        if !current.apply(&notification) {
            tracing::trace!(slot = %self.id, %handle, "Discarding notification for released handle");
            return;
        }
        let play_when_ready = current.play_when_ready();

        match notification {
            PlayerNotification::Ready => {
                if self.state == SlotState::Preparing {
                    if play_when_ready {
                        self.ticker.start();
                        self.transition(SlotState::Playing);
                    } else {
                        self.transition(SlotState::Ready);
                    }
                }
            }
            PlayerNotification::Ended => {
                if matches!(
                    self.state,
                    SlotState::Ready | SlotState::Playing | SlotState::Paused
                ) {
                    self.finish();
                }
            }
            PlayerNotification::Error(error) => self.fail(error),
            PlayerNotification::IsPlayingChanged(playing) => {
                if let Some(index) = self.index {
                    self.events
                        .emit(FeedEvent::PlayingChanged { index, playing });
                }
            }
            PlayerNotification::Idle | PlayerNotification::Preparing => {}
        }
    }

    /// Sample progress for a tick scheduled under `epoch`
    pub fn on_tick(&mut self, epoch: u64) {
        if self.state != SlotState::Playing {
            return;
        }
        let (Some(index), Some(handle)) = (self.index, self.handle.as_mut()) else {
            return;
        };

        let (position, duration) = handle.sample();
        if let Some(percent) = self.ticker.report(epoch, position, duration) {
            self.events.emit(FeedEvent::Progress { index, percent });
        }
    }

    /// User started dragging the seek bar
    pub fn begin_scrub(&mut self) {
        self.ticker.suppress_during_user_seek(true);
    }

    /// User dragged the seek bar to `percent`
    ///
    /// Returns the requested position, or `None` when the duration is not
    /// known yet.
    pub fn scrub_to(&mut self, percent: u8) -> Option<u64> {
        let handle = self.handle.as_mut()?;
        let duration = handle.duration_ms().filter(|d| *d > 0)?;
        let target = u64::from(percent.min(100)) * duration / 100;
        handle.seek_to(target as i64)
    }

    /// User released the seek bar
    pub fn end_scrub(&mut self) {
        self.ticker.suppress_during_user_seek(false);
    }

    /// Playing, or about to play once buffering completes
    pub fn wants_to_play(&self) -> bool {
        match self.state {
            SlotState::Playing => true,
            SlotState::Preparing => self.handle.as_ref().is_some_and(|h| h.play_when_ready()),
            _ => false,
        }
    }

    /// Actual playback as reported by the player
    pub fn is_playing(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_playing())
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// List position this slot currently represents
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn item(&self) -> Option<&MediaItem> {
        self.item.as_ref()
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn handle(&self) -> Option<&PlaybackHandle> {
        self.handle.as_ref()
    }

    pub fn ticker(&self) -> &ProgressTicker {
        &self.ticker
    }

    pub fn gestures_mut(&mut self) -> &mut GestureRouter {
        &mut self.gestures
    }

    fn finish(&mut self) {
        self.ticker.stop();
        self.transition(SlotState::Ended);

        if let Some(handle) = self.handle.as_mut() {
            handle.rewind();
        }
        if let Some(index) = self.index {
            self.events.emit(FeedEvent::Progress { index, percent: 0 });
        }
        self.transition(SlotState::Paused);
    }

    fn fail(&mut self, error: PlayerError) {
        self.ticker.stop();
        if let Some(handle) = self.handle.as_mut().filter(|h| h.play_when_ready()) {
            handle.set_play_when_ready(false);
        }

        tracing::warn!(slot = %self.id, index = ?self.index, %error, "Playback failed");
        self.transition(SlotState::Error);

        if let Some(index) = self.index {
            self.events.emit(FeedEvent::PlaybackError { index, error });
        }
    }

    fn retry(&mut self) -> bool {
        let (Some(handle), Some(item)) = (self.handle.as_mut(), self.item.as_ref()) else {
            return false;
        };

        if !handle.is_loaded() {
            if let Err(error) = handle.load(item) {
                self.fail(error);
                return false;
            }
        }

        handle.prepare();
        handle.set_play_when_ready(true);
        tracing::debug!(slot = %self.id, index = ?self.index, "Retrying after error");
        self.transition(SlotState::Preparing);
        true
    }

    fn transition(&mut self, state: SlotState) {
        if self.state == state {
            return;
        }
        tracing::debug!(slot = %self.id, index = ?self.index, from = ?self.state, to = ?state, "Slot transition");
        self.state = state;
        self.events.emit(FeedEvent::StateChanged {
            slot: self.id,
            index: self.index,
            state,
        });
    }
}
