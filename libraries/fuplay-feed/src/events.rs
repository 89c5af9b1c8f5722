//! Feed commands and events
//!
//! Everything that changes slot state enters the coordination task as a
//! [`FeedCommand`] on one ordered channel:
//! - Host input (focus changes, pointer and seek-bar gestures, lifecycle)
//! - Player notifications (tagged with the handle that produced them)
//! - Ticker samples (tagged with the ticker epoch that scheduled them)
//!
//! Everything the host needs to render goes out as a [`FeedEvent`].

use crate::error::PlayerError;
use crate::gesture::{PointerEvent, SeekBarEvent};
use crate::player::PlayerNotification;
use crate::types::{HandleId, SlotId, SlotState};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Input consumed by the coordination task, one at a time, in arrival order
#[derive(Debug, Clone)]
pub enum FeedCommand {
    /// Page settled on a list position
    Focus(usize),

    /// Move focus to the next item
    Advance,

    /// Move focus to the previous item
    Retreat,

    /// Raw pointer input on the item at `index`
    Pointer { index: usize, event: PointerEvent },

    /// Tap on whichever item is focused
    TapFocused,

    /// Seek-bar interaction on the item at `index`
    SeekBar { index: usize, event: SeekBarEvent },

    /// View-recycling callback: `slot` now represents `index`
    Bind { slot: SlotId, index: usize },

    /// View-recycling callback: `slot` left the screen
    Recycle { slot: SlotId },

    /// Host screen returned to the foreground
    Foreground,

    /// Host screen went to the background
    Background,

    /// State notification from a player resource
    Player {
        slot: SlotId,
        handle: HandleId,
        notification: PlayerNotification,
    },

    /// Progress sample due for a slot's ticker
    Tick { slot: SlotId, epoch: u64 },

    /// Release every slot and stop the coordination task
    Shutdown,
}

/// Notices emitted to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    /// Seek-bar position for the item at `index` (0..=100)
    Progress { index: usize, percent: u8 },

    /// Non-fatal playback failure, reported once per occurrence
    PlaybackError { index: usize, error: PlayerError },

    /// Slot lifecycle transition
    StateChanged {
        slot: SlotId,
        index: Option<usize>,
        state: SlotState,
    },

    /// Focus moved
    FocusChanged {
        previous: Option<usize>,
        current: usize,
    },

    /// Actual playback started or stopped (distinct from play intent)
    PlayingChanged { index: usize, playing: bool },
}

/// Outbound event channel
///
/// Sending never fails from the caller's point of view: once the host has
/// dropped its receiver, events are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<FeedEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<FeedEvent>) -> Self {
        Self { tx }
    }

    /// Emit an event to the host
    pub fn emit(&self, event: FeedEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped; discarding event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn events_round_trip_through_json() {
        let event = FeedEvent::PlaybackError {
            index: 2,
            error: PlayerError::Source("missing".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: FeedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        EventSink::new(tx).emit(FeedEvent::Progress {
            index: 0,
            percent: 10,
        });
    }
}
