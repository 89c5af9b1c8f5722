//! Playback handle - one player resource bound to one source

use crate::error::PlayerError;
use crate::player::{Player, PlayerNotification};
use crate::types::{HandleId, HandleState};
use fuplay_core::MediaItem;
use std::fmt;

/// Wraps one opaque player resource bound to one media source
///
/// Exclusively owned by a single slot. After [`release`](Self::release) the
/// player is dropped, so no call can reach it any more, and every later
/// notification is rejected.
pub struct PlaybackHandle {
    id: HandleId,
    source_locator: String,
    state: HandleState,
    loaded: bool,
    last_known_position_ms: u64,
    duration_ms: Option<u64>,
    play_when_ready: bool,
    is_playing: bool,
    player: Option<Box<dyn Player>>,
}

impl PlaybackHandle {
    /// Wrap a freshly created player; nothing is attached yet
    pub fn new(id: HandleId, source_locator: impl Into<String>, player: Box<dyn Player>) -> Self {
        Self {
            id,
            source_locator: source_locator.into(),
            state: HandleState::Idle,
            loaded: false,
            last_known_position_ms: 0,
            duration_ms: None,
            play_when_ready: false,
            is_playing: false,
            player: Some(player),
        }
    }

    /// Attach the item's source; does not start playback
    ///
    /// On failure the handle moves to `Error` and can still be released.
    pub fn load(&mut self, item: &MediaItem) -> Result<(), PlayerError> {
        let Some(player) = self.player.as_mut() else {
            return Err(PlayerError::Source(format!("{} already released", self.id)));
        };

        match player.load(item) {
            Ok(()) => {
                self.source_locator.clone_from(&item.source_locator);
                self.loaded = true;
                self.state = HandleState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = HandleState::Error;
                Err(e)
            }
        }
    }

    /// Start buffering; completion arrives as a `Ready` notification
    ///
    /// Ignored while already preparing, once ready, or after release.
    pub fn prepare(&mut self) {
        if !matches!(
            self.state,
            HandleState::Idle | HandleState::Error | HandleState::Ended
        ) {
            return;
        }

        if let Some(player) = self.player.as_mut() {
            self.state = HandleState::Preparing;
            player.prepare();
        }
    }

    /// Set play intent
    pub fn set_play_when_ready(&mut self, play: bool) {
        if let Some(player) = self.player.as_mut() {
            self.play_when_ready = play;
            player.set_play_when_ready(play);
        }
    }

    /// Seek, clamping into `[0, duration]`
    ///
    /// Returns the position actually requested from the player, or `None`
    /// when the handle is not ready (the seek is dropped).
    pub fn seek_to(&mut self, position_ms: i64) -> Option<u64> {
        if self.state != HandleState::Ready {
            return None;
        }

        let duration = self.duration_ms();
        let player = self.player.as_mut()?;

        let mut target = position_ms.max(0) as u64;
        if let Some(duration) = duration {
            target = target.min(duration);
        }

        player.seek_to(target);
        self.last_known_position_ms = target;
        Some(target)
    }

    /// Best-effort position read, 0 before ready
    pub fn position_ms(&self) -> u64 {
        match (&self.state, self.player.as_ref()) {
            (HandleState::Ready | HandleState::Ended, Some(player)) => player.position_ms(),
            _ => 0,
        }
    }

    /// Best-effort duration read, `None` before ready
    pub fn duration_ms(&self) -> Option<u64> {
        if !matches!(self.state, HandleState::Ready | HandleState::Ended) {
            return None;
        }
        self.duration_ms
            .or_else(|| self.player.as_ref().and_then(|p| p.duration_ms()))
    }

    /// Read position and duration together, remembering the position
    pub fn sample(&mut self) -> (u64, Option<u64>) {
        let position = self.position_ms();
        if self.state == HandleState::Ready {
            self.last_known_position_ms = position;
        }
        (position, self.duration_ms())
    }

    /// Fold a player notification into the handle's view of the resource
    ///
    /// Returns `false` once released: the notification must be discarded.
    pub fn apply(&mut self, notification: &PlayerNotification) -> bool {
        if self.is_released() {
            return false;
        }

        match notification {
            PlayerNotification::Idle => self.state = HandleState::Idle,
            PlayerNotification::Preparing => self.state = HandleState::Preparing,
            PlayerNotification::Ready => {
                self.state = HandleState::Ready;
                self.duration_ms = self
                    .player
                    .as_ref()
                    .and_then(|p| p.duration_ms())
                    .filter(|d| *d > 0);
            }
            PlayerNotification::Ended => {
                self.state = HandleState::Ended;
                self.is_playing = false;
            }
            PlayerNotification::Error(_) => {
                self.state = HandleState::Error;
                self.is_playing = false;
            }
            PlayerNotification::IsPlayingChanged(playing) => self.is_playing = *playing,
        }

        true
    }

    /// Rewind to the start and drop play intent after the source ended
    pub fn rewind(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.seek_to(0);
            player.set_play_when_ready(false);
            self.play_when_ready = false;
            self.is_playing = false;
            self.last_known_position_ms = 0;
            self.state = HandleState::Ready;
        }
    }

    /// Stop and free the player
    ///
    /// Idempotent: later calls (and `Drop`) do nothing.
    pub fn release(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.release();
            tracing::debug!(handle = %self.id, source = %self.source_locator, "Player released");
        }
        self.state = HandleState::Released;
        self.play_when_ready = false;
        self.is_playing = false;
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn state(&self) -> &HandleState {
        &self.state
    }

    pub fn source_locator(&self) -> &str {
        &self.source_locator
    }

    /// Whether a source was attached successfully
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn play_when_ready(&self) -> bool {
        self.play_when_ready
    }

    /// Actual playback state as last reported by the player
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn last_known_position_ms(&self) -> u64 {
        self.last_known_position_ms
    }

    pub fn is_released(&self) -> bool {
        self.player.is_none()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("id", &self.id)
            .field("source_locator", &self.source_locator)
            .field("state", &self.state)
            .field("position_ms", &self.last_known_position_ms)
            .field("duration_ms", &self.duration_ms)
            .field("play_when_ready", &self.play_when_ready)
            .field("is_playing", &self.is_playing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBackend, PlayerCall};
    use crate::player::{PlayerBackend, PlayerNotifier};
    use crate::types::SlotId;
    use fuplay_core::MediaId;
    use tokio::sync::mpsc;

    fn item() -> MediaItem {
        MediaItem::new(MediaId(1), "/videos/a.mp4", "a.mp4", 10_000)
    }

    fn ready_handle(backend: &FakeBackend) -> PlaybackHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = HandleId(1);
        let player = backend.create(PlayerNotifier::new(SlotId(0), id, tx));
        let mut handle = PlaybackHandle::new(id, "", player);
        handle.load(&item()).unwrap();
        handle.prepare();
        backend.mark_ready(id);
        assert!(handle.apply(&PlayerNotification::Ready));
        handle
    }

    #[test]
    fn seek_clamps_into_duration() {
        let backend = FakeBackend::new(10_000);
        let mut handle = ready_handle(&backend);

        assert_eq!(handle.seek_to(-5), Some(0));
        assert_eq!(handle.seek_to(10_000 + 1000), Some(10_000));
        assert_eq!(handle.seek_to(4_200), Some(4_200));
        assert_eq!(handle.position_ms(), 4_200);
    }

    #[test]
    fn seek_before_ready_is_ignored() {
        let backend = FakeBackend::new(10_000);
        let (tx, _rx) = mpsc::unbounded_channel();
        let player = backend.create(PlayerNotifier::new(SlotId(0), HandleId(9), tx));
        let mut handle = PlaybackHandle::new(HandleId(9), "", player);
        handle.load(&item()).unwrap();

        assert_eq!(handle.seek_to(500), None);
        assert_eq!(handle.position_ms(), 0);
        assert_eq!(handle.duration_ms(), None);
        assert!(!backend
            .calls_for(HandleId(9))
            .iter()
            .any(|c| matches!(c, PlayerCall::SeekTo(_))));
    }

    #[test]
    fn release_is_idempotent() {
        let backend = FakeBackend::new(10_000);
        let mut handle = ready_handle(&backend);

        handle.release();
        let first = handle.state().clone();
        handle.release();

        assert_eq!(first, HandleState::Released);
        assert_eq!(handle.state(), &HandleState::Released);
        assert_eq!(backend.release_count(HandleId(1)), 1);
    }

    #[test]
    fn notifications_after_release_are_rejected() {
        let backend = FakeBackend::new(10_000);
        let mut handle = ready_handle(&backend);
        handle.release();

        assert!(!handle.apply(&PlayerNotification::IsPlayingChanged(true)));
        assert!(!handle.is_playing());
        assert_eq!(handle.seek_to(100), None);
    }

    #[test]
    fn failed_load_can_still_be_released() {
        let backend = FakeBackend::new(10_000).with_missing("/videos/a.mp4");
        let (tx, _rx) = mpsc::unbounded_channel();
        let player = backend.create(PlayerNotifier::new(SlotId(0), HandleId(3), tx));
        let mut handle = PlaybackHandle::new(HandleId(3), "", player);

        let err = handle.load(&item()).unwrap_err();
        assert!(matches!(err, PlayerError::Source(_)));
        assert_eq!(handle.state(), &HandleState::Error);

        handle.release();
        handle.release();
        assert_eq!(backend.release_count(HandleId(3)), 1);
    }

    #[test]
    fn drop_releases_player() {
        let backend = FakeBackend::new(10_000);
        let handle = ready_handle(&backend);
        drop(handle);
        assert_eq!(backend.release_count(HandleId(1)), 1);
    }

    #[test]
    fn rewind_resets_position_and_intent() {
        let backend = FakeBackend::new(10_000);
        let mut handle = ready_handle(&backend);
        handle.set_play_when_ready(true);
        handle.seek_to(9_000);
        handle.apply(&PlayerNotification::Ended);

        handle.rewind();

        assert_eq!(handle.state(), &HandleState::Ready);
        assert_eq!(handle.position_ms(), 0);
        assert!(!handle.play_when_ready());
    }
}
