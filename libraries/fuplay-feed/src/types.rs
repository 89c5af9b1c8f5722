//! Core types for the feed

use crate::error::{FeedError, Result};
use crate::gesture::GestureMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stable arena identity of a playback slot
///
/// Survives recycling; the list index a slot represents does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub usize);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Identity of one player resource instance
///
/// Never reused within a pool, so notifications from a released handle can
/// always be told apart from its replacement's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Slot lifecycle
///
/// `Unbound -> Preparing -> Ready -> Playing <-> Paused`, with `Ended`
/// passed through on completion and `Error`/`Released` reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// No list position, no handle
    Unbound,

    /// Handle created, waiting for the player to buffer
    Preparing,

    /// Buffered, not playing
    Ready,

    /// Playing with the ticker running
    Playing,

    /// Paused mid-item
    Paused,

    /// Reached the end (transient, settles to `Paused` at position 0)
    Ended,

    /// Player fault, inert until re-triggered or recycled
    Error,

    /// Handle torn down (transient, settles to `Unbound`)
    Released,
}

impl SlotState {
    /// Whether the slot currently holds a list position
    pub fn is_bound(self) -> bool {
        !matches!(self, Self::Unbound | Self::Released)
    }
}

/// Lifecycle of a single player resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleState {
    Idle,
    Preparing,
    Ready,
    Ended,
    Error,
    Released,
}

/// Largest accepted `window_radius`; each slot owns a ticker and a router
pub const MAX_WINDOW_RADIUS: usize = 8;

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Progress sampling cadence in milliseconds (default: 100)
    pub tick_interval_ms: u64,

    /// Slots kept bound on each side of the focused item (default: 1)
    pub window_radius: usize,

    /// Minimum vertical travel for a fling (default: 100 px)
    pub fling_min_distance_px: f32,

    /// Minimum vertical velocity for a fling (default: 100 px/s)
    pub fling_min_velocity_px_s: f32,

    /// Maximum travel for a touch to still count as a tap (default: 16 px)
    pub tap_slop_px: f32,

    /// Maximum press duration for a tap (default: 300 ms)
    pub tap_timeout_ms: u64,

    /// Start playing the focused item automatically (default: true)
    pub autoplay_on_focus: bool,

    /// Gestures recognised on each slot (default: `Feed`, taps only)
    pub gesture_mode: GestureMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            window_radius: 1,
            fling_min_distance_px: 100.0,
            fling_min_velocity_px_s: 100.0,
            tap_slop_px: 16.0,
            tap_timeout_ms: 300,
            autoplay_on_focus: true,
            gesture_mode: GestureMode::Feed,
        }
    }
}

impl FeedConfig {
    /// Number of slots the pool may hold at once
    pub fn capacity(&self) -> usize {
        self.window_radius.saturating_mul(2).saturating_add(1)
    }

    /// Progress sampling cadence
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(FeedError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.window_radius > MAX_WINDOW_RADIUS {
            return Err(FeedError::Config(format!(
                "window_radius must be at most {MAX_WINDOW_RADIUS}, got {}",
                self.window_radius
            )));
        }

        for (name, value) in [
            ("fling_min_distance_px", self.fling_min_distance_px),
            ("fling_min_velocity_px_s", self.fling_min_velocity_px_s),
            ("tap_slop_px", self.tap_slop_px),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FeedError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.capacity(), 3);
        assert_eq!(config.fling_min_distance_px, 100.0);
        assert_eq!(config.fling_min_velocity_px_s, 100.0);
        assert!(config.autoplay_on_focus);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = FeedConfig {
            tick_interval_ms: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = FeedConfig {
            fling_min_velocity_px_s: -1.0,
            ..FeedConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fling_min_velocity_px_s"));
    }

    #[test]
    fn oversized_window_is_rejected() {
        let config = FeedConfig {
            window_radius: usize::MAX,
            ..FeedConfig::default()
        };
        assert_eq!(config.capacity(), usize::MAX);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_radius"));

        let config = FeedConfig {
            window_radius: MAX_WINDOW_RADIUS + 1,
            ..FeedConfig::default()
        };
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));

        let config = FeedConfig {
            window_radius: MAX_WINDOW_RADIUS,
            ..FeedConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), 17);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: FeedConfig = serde_json::from_str(r#"{"window_radius": 2}"#).unwrap();
        assert_eq!(config.capacity(), 5);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.gesture_mode, GestureMode::Feed);
    }

    #[test]
    fn bound_states() {
        assert!(!SlotState::Unbound.is_bound());
        assert!(!SlotState::Released.is_bound());
        assert!(SlotState::Error.is_bound());
        assert!(SlotState::Paused.is_bound());
    }
}
