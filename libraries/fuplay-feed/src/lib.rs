//! Fuplay Feed - Playback Slots and Focus Coordination
//!
//! The core of a vertically paged short-video feed.
//!
//! This crate provides:
//! - A bounded pool of playback slots, each binding one list position to one
//!   player resource
//! - A per-slot lifecycle state machine (prepare, play, pause, end, error,
//!   recycle)
//! - Focus coordination that keeps exactly one item playing
//! - Periodic progress sampling for the focused item's seek bar
//! - Gesture routing (tap to toggle, fling to page, seek-bar scrubbing)
//!
//! # Architecture
//!
//! All feed state lives on one coordination task. Host input, player
//! notifications and ticker samples are [`FeedCommand`]s on a single ordered
//! channel, so they are applied one at a time and never race. Player
//! notifications carry the [`HandleId`] of the resource that produced them;
//! ticker samples carry the epoch that scheduled them. Anything that arrives
//! after its handle was released or its ticker stopped is dropped.
//!
//! Platform players plug in through [`Player`] and [`PlayerBackend`].
//! [`FakeBackend`] records calls for tests; [`ClockBackend`] plays local files
//! against the tokio clock.
//!
//! # Example
//!
//! ```rust,no_run
//! use fuplay_core::{MediaId, MediaItem};
//! use fuplay_feed::{FakeBackend, FeedConfig, FeedDispatcher, FeedEvent};
//!
//! # async fn run() -> fuplay_feed::Result<()> {
//! let items = vec![
//!     MediaItem::new(MediaId(1), "/videos/a.mp4", "a.mp4", 12_000),
//!     MediaItem::new(MediaId(2), "/videos/b.mp4", "b.mp4", 8_000),
//! ];
//!
//! let (dispatcher, feed, mut events) =
//!     FeedDispatcher::new(items, Box::new(FakeBackend::new(10_000)), &FeedConfig::default())?;
//! let task = dispatcher.spawn();
//!
//! feed.focus(0)?;
//! feed.advance()?;
//!
//! while let Some(event) = events.recv().await {
//!     if let FeedEvent::Progress { index, percent } = event {
//!         println!("item {index}: {percent}%");
//!     }
//! }
//!
//! feed.shutdown()?;
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod clock;
mod dispatcher;
mod error;
mod events;
pub mod fake;
mod focus;
mod gesture;
mod handle;
mod player;
mod pool;
mod slot;
mod ticker;
pub mod types;

pub use clock::{ClockBackend, ClockPlayer};
pub use dispatcher::{Feed, FeedDispatcher, FeedHandle};
pub use error::{FeedError, PlayerError, Result};
pub use events::{EventSink, FeedCommand, FeedEvent};
pub use fake::{FakeBackend, PlayerCall};
pub use focus::{FocusCoordinator, FocusState};
pub use gesture::{
    GestureMode, GestureRouter, GestureThresholds, PointerEvent, SeekBarEvent, Transport,
};
pub use handle::PlaybackHandle;
pub use player::{Player, PlayerBackend, PlayerNotification, PlayerNotifier};
pub use pool::SlotPool;
pub use slot::PlaybackSlot;
pub use ticker::{progress_percent, ProgressTicker};
pub use types::{
    FeedConfig, HandleId, HandleState, SlotId, SlotState, MAX_WINDOW_RADIUS,
};
