//! Error types for the feed core

use crate::types::SlotId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Faults reported by a player resource
///
/// None of these abort the pool. A faulted slot stays bound and inert until
/// the user re-triggers playback or the slot is recycled.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlayerError {
    /// Locator could not be resolved or read
    #[error("Source error: {0}")]
    Source(String),

    /// Decoder or buffering failure while preparing
    #[error("Prepare error: {0}")]
    Prepare(String),

    /// Recoverable fault during playback
    #[error("Playback error: {0}")]
    Transient(String),
}

impl PlayerError {
    /// Reason text without the category prefix
    pub fn reason(&self) -> &str {
        match self {
            Self::Source(reason) | Self::Prepare(reason) | Self::Transient(reason) => reason,
        }
    }
}

/// Feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// List position outside the feed
    #[error("Index {index} out of bounds for feed of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Slot id that was never allocated by this pool
    #[error("Unknown slot: {0}")]
    UnknownSlot(SlotId),

    /// Every slot is bound and none may be evicted
    #[error("No slot available (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// Feed opened with no items
    #[error("Feed has no items")]
    EmptyFeed,

    /// Coordination task has stopped
    #[error("Feed dispatcher is closed")]
    DispatcherClosed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
