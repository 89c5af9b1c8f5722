//! In-memory player backend
//!
//! Records every call made against every player it creates and simulates the
//! notification sequence of a real player, without decoding anything. Used by
//! the test suites and by hosts that want a headless dry run.

use crate::error::PlayerError;
use crate::player::{Player, PlayerBackend, PlayerNotification, PlayerNotifier};
use crate::types::HandleId;
use fuplay_core::MediaItem;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call made against a fake player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Load(String),
    Prepare,
    SetPlayWhenReady(bool),
    SeekTo(u64),
    Release,
}

#[derive(Debug)]
struct FakeState {
    notifier: PlayerNotifier,
    ready: bool,
    playing: bool,
    play_when_ready: bool,
    position_ms: u64,
    released: bool,
}

#[derive(Debug, Default)]
struct FakeWorld {
    calls: Vec<(HandleId, PlayerCall)>,
    created: Vec<HandleId>,
    players: HashMap<HandleId, FakeState>,
}

/// Backend producing [`FakePlayer`]s that share one call log
#[derive(Debug, Clone)]
pub struct FakeBackend {
    world: Arc<Mutex<FakeWorld>>,
    duration_ms: u64,
    auto_ready: bool,
    missing: Arc<HashSet<String>>,
}

impl FakeBackend {
    /// Players that become ready as soon as they are prepared
    pub fn new(duration_ms: u64) -> Self {
        Self {
            world: Arc::default(),
            duration_ms,
            auto_ready: true,
            missing: Arc::default(),
        }
    }

    /// Players stay `Preparing` until [`mark_ready`](Self::mark_ready)
    pub fn manual_ready(mut self) -> Self {
        self.auto_ready = false;
        self
    }

    /// Treat `locator` as unresolvable: loading it fails with a source error
    pub fn with_missing(mut self, locator: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.missing).insert(locator.into());
        self
    }

    fn world(&self) -> MutexGuard<'_, FakeWorld> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Finish buffering for `handle` and notify `Ready`
    pub fn mark_ready(&self, handle: HandleId) {
        let mut world = self.world();
        if let Some(state) = world.players.get_mut(&handle) {
            if state.released || state.ready {
                return;
            }
            state.ready = true;
            state.notifier.notify(PlayerNotification::Ready);
            if state.play_when_ready {
                state.playing = true;
                state
                    .notifier
                    .notify(PlayerNotification::IsPlayingChanged(true));
            }
        }
    }

    /// Move the playhead without a seek call (simulated playback progress)
    pub fn set_position(&self, handle: HandleId, position_ms: u64) {
        if let Some(state) = self.world().players.get_mut(&handle) {
            state.position_ms = position_ms;
        }
    }

    /// Play `handle` to the end and notify `Ended`
    pub fn finish(&self, handle: HandleId) {
        let duration = self.duration_ms;
        let mut world = self.world();
        if let Some(state) = world.players.get_mut(&handle) {
            if state.released {
                return;
            }
            state.position_ms = duration;
            if state.playing {
                state.playing = false;
                state
                    .notifier
                    .notify(PlayerNotification::IsPlayingChanged(false));
            }
            state.notifier.notify(PlayerNotification::Ended);
        }
    }

    /// Fail `handle` with `error`
    pub fn fail(&self, handle: HandleId, error: PlayerError) {
        let mut world = self.world();
        if let Some(state) = world.players.get_mut(&handle) {
            if state.released {
                return;
            }
            state.playing = false;
            state.notifier.notify(PlayerNotification::Error(error));
        }
    }

    /// Every call, in order
    pub fn calls(&self) -> Vec<(HandleId, PlayerCall)> {
        self.world().calls.clone()
    }

    /// Calls made against one handle, in order
    pub fn calls_for(&self, handle: HandleId) -> Vec<PlayerCall> {
        self.world()
            .calls
            .iter()
            .filter(|(id, _)| *id == handle)
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Number of `release` calls that reached `handle`'s player
    pub fn release_count(&self, handle: HandleId) -> usize {
        self.calls_for(handle)
            .iter()
            .filter(|call| **call == PlayerCall::Release)
            .count()
    }

    /// Handles in creation order
    pub fn created(&self) -> Vec<HandleId> {
        self.world().created.clone()
    }

    /// Handles whose player is actually playing right now
    pub fn playing(&self) -> Vec<HandleId> {
        let world = self.world();
        let mut playing: Vec<_> = world
            .players
            .iter()
            .filter(|(_, state)| state.playing && !state.released)
            .map(|(id, _)| *id)
            .collect();
        playing.sort();
        playing
    }
}

impl PlayerBackend for FakeBackend {
    fn create(&self, notifier: PlayerNotifier) -> Box<dyn Player> {
        let id = notifier.handle();
        {
            let mut world = self.world();
            world.created.push(id);
            world.players.insert(
                id,
                FakeState {
                    notifier,
                    ready: false,
                    playing: false,
                    play_when_ready: false,
                    position_ms: 0,
                    released: false,
                },
            );
        }

        Box::new(FakePlayer {
            id,
            backend: self.clone(),
        })
    }
}

/// Player whose state lives in its [`FakeBackend`]
#[derive(Debug)]
pub struct FakePlayer {
    id: HandleId,
    backend: FakeBackend,
}

impl FakePlayer {
    fn record(&self, call: PlayerCall) {
        self.backend.world().calls.push((self.id, call));
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> Option<R> {
        self.backend.world().players.get_mut(&self.id).map(f)
    }
}

impl Player for FakePlayer {
    fn load(&mut self, item: &MediaItem) -> Result<(), PlayerError> {
        self.record(PlayerCall::Load(item.source_locator.clone()));
        if self.backend.missing.contains(&item.source_locator) {
            return Err(PlayerError::Source(format!(
                "cannot resolve {}",
                item.source_locator
            )));
        }
        Ok(())
    }

    fn prepare(&mut self) {
        self.record(PlayerCall::Prepare);
        self.with_state(|state| state.notifier.notify(PlayerNotification::Preparing));
        if self.backend.auto_ready {
            self.with_state(|state| state.ready = false);
            self.backend.mark_ready(self.id);
        }
    }

    fn set_play_when_ready(&mut self, play: bool) {
        self.record(PlayerCall::SetPlayWhenReady(play));
        self.with_state(|state| {
            state.play_when_ready = play;
            if state.ready && state.playing != play {
                state.playing = play;
                state
                    .notifier
                    .notify(PlayerNotification::IsPlayingChanged(play));
            }
        });
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.record(PlayerCall::SeekTo(position_ms));
        self.with_state(|state| state.position_ms = position_ms);
    }

    fn position_ms(&self) -> u64 {
        self.with_state(|state| state.position_ms).unwrap_or(0)
    }

    fn duration_ms(&self) -> Option<u64> {
        let ready = self.with_state(|state| state.ready).unwrap_or(false);
        ready.then_some(self.backend.duration_ms)
    }

    fn release(&mut self) {
        self.record(PlayerCall::Release);
        self.with_state(|state| {
            state.released = true;
            state.playing = false;
        });
    }
}
