//! Clock player - a file-backed player that keeps time without decoding
//!
//! `prepare` probes the container on a blocking task to learn the duration,
//! then the playhead advances against the tokio clock while playing. An end
//! timer fires `Ended` when the playhead reaches the duration. Frames are
//! never decoded, which makes the backend suitable for headless hosts.

use crate::error::PlayerError;
use crate::player::{Player, PlayerBackend, PlayerNotification, PlayerNotifier};
use fuplay_core::MediaItem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Probe a container for its duration in milliseconds
///
/// Returns the longest track duration, or `None` if no track declares one.
pub fn probe_duration_ms(path: &Path) -> Result<Option<u64>, PlayerError> {
    let file = std::fs::File::open(path)
        .map_err(|e| PlayerError::Source(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlayerError::Prepare(format!("Failed to probe file: {}", e)))?;

    let duration = probed
        .format
        .tracks()
        .iter()
        .filter_map(|track| {
            let params = &track.codec_params;
            let (time_base, n_frames) = (params.time_base?, params.n_frames?);
            let time = time_base.calc_time(n_frames);
            Some(time.seconds * 1000 + (time.frac * 1000.0) as u64)
        })
        .max();

    Ok(duration)
}

/// Strip a `file://` scheme, leaving a filesystem path
fn locator_path(locator: &str) -> PathBuf {
    PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
}

/// Backend producing [`ClockPlayer`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockBackend;

impl ClockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PlayerBackend for ClockBackend {
    fn create(&self, notifier: PlayerNotifier) -> Box<dyn Player> {
        Box::new(ClockPlayer::new(notifier))
    }
}

#[derive(Debug, Default)]
struct ClockState {
    path: Option<PathBuf>,
    duration_hint_ms: u64,
    duration_ms: Option<u64>,
    ready: bool,
    play_when_ready: bool,
    playing: bool,
    base_position_ms: u64,
    anchor: Option<Instant>,
    generation: u64,
    timer_epoch: u64,
    end_timer: Option<JoinHandle<()>>,
    released: bool,
}

impl ClockState {
    fn position_ms(&self) -> u64 {
        let elapsed = self
            .anchor
            .map_or(0, |anchor| anchor.elapsed().as_millis() as u64);
        let position = self.base_position_ms.saturating_add(elapsed);
        self.duration_ms.map_or(position, |d| position.min(d))
    }

    fn cancel_end_timer(&mut self) {
        self.timer_epoch += 1;
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }
}

type Shared = Arc<Mutex<ClockState>>;

fn lock(shared: &Shared) -> MutexGuard<'_, ClockState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Player whose playhead follows the tokio clock
#[derive(Debug)]
pub struct ClockPlayer {
    notifier: PlayerNotifier,
    runtime: Option<Handle>,
    shared: Shared,
    probe: Option<JoinHandle<()>>,
}

impl ClockPlayer {
    pub fn new(notifier: PlayerNotifier) -> Self {
        Self {
            notifier,
            runtime: Handle::try_current().ok(),
            shared: Arc::default(),
            probe: None,
        }
    }
}

fn start_playing(state: &mut ClockState, shared: &Shared, notifier: &PlayerNotifier, runtime: &Handle) {
    if state.playing {
        return;
    }
    state.anchor = Some(Instant::now());
    state.playing = true;
    notifier.notify(PlayerNotification::IsPlayingChanged(true));
    schedule_end(state, shared, notifier, runtime);
}

fn stop_playing(state: &mut ClockState, notifier: &PlayerNotifier) {
    if !state.playing {
        return;
    }
    state.base_position_ms = state.position_ms();
    state.anchor = None;
    state.playing = false;
    state.cancel_end_timer();
    notifier.notify(PlayerNotification::IsPlayingChanged(false));
}

fn schedule_end(state: &mut ClockState, shared: &Shared, notifier: &PlayerNotifier, runtime: &Handle) {
    state.cancel_end_timer();
    let Some(duration) = state.duration_ms else {
        return;
    };

    let remaining = Duration::from_millis(duration.saturating_sub(state.position_ms()));
    let epoch = state.timer_epoch;
    let shared = Arc::clone(shared);
    let notifier = notifier.clone();

    state.end_timer = Some(runtime.spawn(async move {
        tokio::time::sleep(remaining).await;

        let mut state = lock(&shared);
        if state.timer_epoch != epoch || !state.playing || state.released {
            return;
        }
        state.base_position_ms = duration;
        state.anchor = None;
        state.playing = false;
        state.end_timer = None;
        notifier.notify(PlayerNotification::IsPlayingChanged(false));
        notifier.notify(PlayerNotification::Ended);
    }));
}

impl Player for ClockPlayer {
    fn load(&mut self, item: &MediaItem) -> Result<(), PlayerError> {
        let path = locator_path(&item.source_locator);
        if !path.is_file() {
            return Err(PlayerError::Source(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let mut state = lock(&self.shared);
        state.path = Some(path);
        state.duration_hint_ms = item.duration_hint_ms;
        state.duration_ms = None;
        state.ready = false;
        state.base_position_ms = 0;
        Ok(())
    }

    fn prepare(&mut self) {
        let Some(runtime) = self.runtime.clone() else {
            self.notifier.notify(PlayerNotification::Error(PlayerError::Prepare(
                "no async runtime".to_string(),
            )));
            return;
        };

        let (path, hint, generation) = {
            let mut state = lock(&self.shared);
            let Some(path) = state.path.clone() else {
                drop(state);
                self.notifier.notify(PlayerNotification::Error(PlayerError::Source(
                    "nothing loaded".to_string(),
                )));
                return;
            };
            state.generation += 1;
            state.ready = false;
            (path, state.duration_hint_ms, state.generation)
        };

        if let Some(probe) = self.probe.take() {
            probe.abort();
        }
        self.notifier.notify(PlayerNotification::Preparing);

        let shared = Arc::clone(&self.shared);
        let notifier = self.notifier.clone();
        let timers = runtime.clone();

        self.probe = Some(runtime.spawn(async move {
            let probe_path = path.clone();
            let probed = tokio::task::spawn_blocking(move || probe_duration_ms(&probe_path)).await;

            let duration = match probed {
                Ok(Ok(duration)) => duration.filter(|d| *d > 0),
                Ok(Err(e)) => {
                    tracing::debug!(path = %path.display(), error = %e, "Probe failed; using duration hint");
                    None
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Probe task failed");
                    None
                }
            };

            let mut state = lock(&shared);
            if state.generation != generation || state.released {
                return;
            }

            let Some(duration) = duration.or((hint > 0).then_some(hint)) else {
                notifier.notify(PlayerNotification::Error(PlayerError::Prepare(format!(
                    "unknown duration for {}",
                    path.display()
                ))));
                return;
            };

            state.duration_ms = Some(duration);
            state.base_position_ms = state.base_position_ms.min(duration);
            state.ready = true;
            notifier.notify(PlayerNotification::Ready);

            if state.play_when_ready {
                start_playing(&mut state, &shared, &notifier, &timers);
            }
        }));
    }

    fn set_play_when_ready(&mut self, play: bool) {
        let mut state = lock(&self.shared);
        state.play_when_ready = play;
        if !state.ready || state.released {
            return;
        }

        if play {
            if let Some(runtime) = self.runtime.as_ref() {
                start_playing(&mut state, &self.shared, &self.notifier, runtime);
            }
        } else {
            stop_playing(&mut state, &self.notifier);
        }
    }

    fn seek_to(&mut self, position_ms: u64) {
        let mut state = lock(&self.shared);
        let target = state.duration_ms.map_or(position_ms, |d| position_ms.min(d));
        state.base_position_ms = target;

        if state.playing {
            state.anchor = Some(Instant::now());
            if let Some(runtime) = self.runtime.as_ref() {
                schedule_end(&mut state, &self.shared, &self.notifier, runtime);
            }
        }
    }

    fn position_ms(&self) -> u64 {
        lock(&self.shared).position_ms()
    }

    fn duration_ms(&self) -> Option<u64> {
        let state = lock(&self.shared);
        if state.ready {
            state.duration_ms
        } else {
            None
        }
    }

    fn release(&mut self) {
        if let Some(probe) = self.probe.take() {
            probe.abort();
        }

        let mut state = lock(&self.shared);
        state.released = true;
        state.playing = false;
        state.anchor = None;
        state.generation += 1;
        state.cancel_end_timer();
    }
}
