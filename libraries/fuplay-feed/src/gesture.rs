//! Gesture routing - raw pointer and seek-bar input to transport actions
//!
//! A router classifies a pointer stream (down, moves, up) into:
//! - a tap, which toggles play/pause
//! - in single-item mode, a vertical fling, which moves focus by one item
//!
//! In feed mode the host's scrolling list owns vertical swipes, so only taps
//! are reported. Seek-bar callbacks map to scrub actions in both modes.

use crate::types::FeedConfig;
use serde::{Deserialize, Serialize};

/// Raw pointer input in view coordinates (pixels) with a millisecond clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { x: f32, y: f32, time_ms: u64 },
    Move { x: f32, y: f32, time_ms: u64 },
    Up { x: f32, y: f32, time_ms: u64 },
    Cancel,
}

/// Seek-bar callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekBarEvent {
    /// User put a finger on the bar
    StartTracking,

    /// Bar position changed; `from_user` is false for programmatic updates
    Changed { percent: u8, from_user: bool },

    /// User lifted the finger
    StopTracking,
}

/// Which gestures a router recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureMode {
    /// Scrolling feed: taps only
    #[default]
    Feed,

    /// Single full-screen item: taps and vertical flings
    SingleItem,
}

/// Transport action produced by a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    TogglePlayPause,
    Advance,
    Retreat,
    BeginScrub,
    ScrubTo(u8),
    EndScrub,
}

#[derive(Debug, Clone, Copy)]
struct PointerSample {
    x: f32,
    y: f32,
    time_ms: u64,
}

/// Thresholds used to classify pointer input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    pub fling_min_distance_px: f32,
    pub fling_min_velocity_px_s: f32,
    pub tap_slop_px: f32,
    pub tap_timeout_ms: u64,
}

impl From<&FeedConfig> for GestureThresholds {
    fn from(config: &FeedConfig) -> Self {
        Self {
            fling_min_distance_px: config.fling_min_distance_px,
            fling_min_velocity_px_s: config.fling_min_velocity_px_s,
            tap_slop_px: config.tap_slop_px,
            tap_timeout_ms: config.tap_timeout_ms,
        }
    }
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

/// Per-slot gesture classifier
#[derive(Debug, Clone)]
pub struct GestureRouter {
    mode: GestureMode,
    thresholds: GestureThresholds,
    down: Option<PointerSample>,
    left_slop: bool,
}

impl GestureRouter {
    pub fn new(mode: GestureMode, thresholds: GestureThresholds) -> Self {
        Self {
            mode,
            thresholds,
            down: None,
            left_slop: false,
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// Forget any gesture in progress (the view was recycled)
    pub fn reset(&mut self) {
        self.down = None;
        self.left_slop = false;
    }

    /// Feed one pointer event; returns an action when a gesture completes
    pub fn on_pointer(&mut self, event: PointerEvent) -> Option<Transport> {
        match event {
            PointerEvent::Down { x, y, time_ms } => {
                self.down = Some(PointerSample { x, y, time_ms });
                self.left_slop = false;
                None
            }
            PointerEvent::Move { x, y, .. } => {
                if let Some(down) = self.down {
                    if distance(down.x, down.y, x, y) > self.thresholds.tap_slop_px {
                        self.left_slop = true;
                    }
                }
                None
            }
            PointerEvent::Up { x, y, time_ms } => {
                let down = self.down.take()?;
                let up = PointerSample { x, y, time_ms };
                let left_slop =
                    self.left_slop || distance(down.x, down.y, x, y) > self.thresholds.tap_slop_px;
                self.left_slop = false;
                self.classify(down, up, left_slop)
            }
            PointerEvent::Cancel => {
                self.reset();
                None
            }
        }
    }

    /// Map a seek-bar callback to a scrub action
    ///
    /// Programmatic bar updates (the ticker's own reports) produce nothing.
    pub fn on_seek_bar(&mut self, event: SeekBarEvent) -> Option<Transport> {
        match event {
            SeekBarEvent::StartTracking => Some(Transport::BeginScrub),
            SeekBarEvent::Changed {
                percent,
                from_user: true,
            } => Some(Transport::ScrubTo(percent.min(100))),
            SeekBarEvent::Changed {
                from_user: false, ..
            } => None,
            SeekBarEvent::StopTracking => Some(Transport::EndScrub),
        }
    }

    fn classify(
        &self,
        down: PointerSample,
        up: PointerSample,
        left_slop: bool,
    ) -> Option<Transport> {
        let elapsed_ms = up.time_ms.saturating_sub(down.time_ms);

        if !left_slop {
            return (elapsed_ms <= self.thresholds.tap_timeout_ms)
                .then_some(Transport::TogglePlayPause);
        }

        if self.mode != GestureMode::SingleItem {
            return None;
        }

        let diff_x = up.x - down.x;
        let diff_y = up.y - down.y;
        if diff_y.abs() <= diff_x.abs() {
            return None;
        }

        let velocity_y = diff_y / (elapsed_ms.max(1) as f32 / 1000.0);
        if diff_y.abs() <= self.thresholds.fling_min_distance_px
            || velocity_y.abs() <= self.thresholds.fling_min_velocity_px_s
        {
            return None;
        }

        // Finger moving up reveals the next item.
        if diff_y < 0.0 {
            Some(Transport::Advance)
        } else {
            Some(Transport::Retreat)
        }
    }
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new(GestureMode::default(), GestureThresholds::default())
    }
}

fn distance(x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    (x1 - x0).hypot(y1 - y0)
}
