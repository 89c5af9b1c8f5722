//! Platform-agnostic player resource trait
//!
//! Abstracts the decoder/renderer so the feed core never depends on a concrete
//! media stack. Hosts plug in an adapter for their platform player; tests use
//! the in-memory [`crate::fake::FakeBackend`].

use crate::error::PlayerError;
use crate::events::FeedCommand;
use crate::types::{HandleId, SlotId};
use fuplay_core::MediaItem;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// State notifications a player emits
///
/// Delivered asynchronously through a [`PlayerNotifier`], in the order the
/// underlying transitions happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerNotification {
    /// Resource allocated, nothing buffered
    Idle,

    /// Buffering started
    Preparing,

    /// Buffered and able to play
    Ready,

    /// Reached the end of the source
    Ended,

    /// Fault
    Error(PlayerError),

    /// Actual playback started (`true`) or stopped (`false`)
    ///
    /// Lags behind `set_play_when_ready` while buffering.
    IsPlayingChanged(bool),
}

/// Opaque player resource
///
/// Capability contract: load, prepare, play intent, seek, position/duration
/// reads, release. Completion of `prepare` is never a blocking return; it
/// arrives later as [`PlayerNotification::Ready`].
pub trait Player: Send {
    /// Attach the item's source without starting playback
    ///
    /// # Errors
    /// Returns [`PlayerError::Source`] if the locator cannot be resolved
    fn load(&mut self, item: &MediaItem) -> Result<(), PlayerError>;

    /// Start buffering; returns immediately
    fn prepare(&mut self);

    /// Set play intent; playback follows once ready
    fn set_play_when_ready(&mut self, play: bool);

    /// Seek to an absolute position (already clamped by the caller)
    fn seek_to(&mut self, position_ms: u64);

    /// Current position, 0 when unknown
    fn position_ms(&self) -> u64;

    /// Total duration, `None` when unknown
    fn duration_ms(&self) -> Option<u64>;

    /// Stop and free the underlying resource
    fn release(&mut self);
}

/// Factory for player resources
pub trait PlayerBackend: Send {
    /// Allocate a new player that reports through `notifier`
    fn create(&self, notifier: PlayerNotifier) -> Box<dyn Player>;
}

/// Channel a player uses to report state changes
///
/// Every notification is tagged with the slot and handle it belongs to, so
/// the coordination task can discard reports from a handle that has since
/// been released.
#[derive(Debug, Clone)]
pub struct PlayerNotifier {
    slot: SlotId,
    handle: HandleId,
    tx: UnboundedSender<FeedCommand>,
}

impl PlayerNotifier {
    pub fn new(slot: SlotId, handle: HandleId, tx: UnboundedSender<FeedCommand>) -> Self {
        Self { slot, handle, tx }
    }

    /// Slot the player is bound to
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Handle the player belongs to
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Enqueue a notification for the coordination task
    ///
    /// A closed channel means the feed is gone; the notification is dropped.
    pub fn notify(&self, notification: PlayerNotification) {
        let command = FeedCommand::Player {
            slot: self.slot,
            handle: self.handle,
            notification,
        };

        if self.tx.send(command).is_err() {
            tracing::trace!(slot = %self.slot, handle = %self.handle, "Feed closed; dropping notification");
        }
    }
}
