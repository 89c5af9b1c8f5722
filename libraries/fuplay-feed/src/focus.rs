//! Focus coordination - which item is current, and the single playhead
//!
//! At most one slot plays at any time. Moving focus pauses every other slot
//! before the newly focused one is resumed, so there is never a moment with
//! two players producing output. That includes a neighbour the user started
//! with a tap.

use crate::error::{FeedError, Result};
use crate::events::FeedEvent;
use crate::pool::SlotPool;
use crate::types::{SlotId, SlotState};
use serde::{Deserialize, Serialize};

/// Focus state owned by the screen hosting the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    focused_index: Option<usize>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }
}

#[derive(Debug)]
pub struct FocusCoordinator {
    state: FocusState,
    autoplay: bool,
    backgrounded: bool,
    /// Position that held the playhead when the screen went to the background
    resume_index: Option<usize>,
}

impl FocusCoordinator {
    pub fn new(state: FocusState, autoplay: bool) -> Self {
        Self {
            state,
            autoplay,
            backgrounded: false,
            resume_index: None,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.state.focused_index
    }

    /// Move focus to `index`
    ///
    /// Returns `false` if `index` already had focus (nothing changes).
    pub fn set_focus(&mut self, pool: &mut SlotPool, index: usize) -> Result<bool> {
        if index >= pool.len() {
            return Err(FeedError::IndexOutOfBounds {
                index,
                len: pool.len(),
            });
        }

        let previous = self.state.focused_index;
        if previous == Some(index) {
            return Ok(false);
        }

        let paused = pool.pause_others(pool.slot_at(index));
        if !paused.is_empty() {
            tracing::debug!(?paused, index, "Paused slots leaving focus");
        }

        self.state.focused_index = Some(index);
        self.resume_index = None;
        pool.ensure_window(index)?;
        let slot = pool.acquire(index, index)?;
        pool.set_focused(Some(slot));

        if self.autoplay {
            self.grant(pool, slot)?;
        }

        tracing::info!(?previous, index, %slot, "Focus changed");
        pool.events().emit(FeedEvent::FocusChanged {
            previous,
            current: index,
        });
        Ok(true)
    }

    /// Focus the next item; no-op on the last one
    pub fn advance(&mut self, pool: &mut SlotPool) -> Result<bool> {
        match self.state.focused_index {
            None => self.set_focus(pool, 0),
            Some(index) if index + 1 < pool.len() => self.set_focus(pool, index + 1),
            Some(_) => Ok(false),
        }
    }

    /// Focus the previous item; no-op on the first one
    pub fn retreat(&mut self, pool: &mut SlotPool) -> Result<bool> {
        match self.state.focused_index {
            None => self.set_focus(pool, 0),
            Some(index) if index > 0 => self.set_focus(pool, index - 1),
            Some(_) => Ok(false),
        }
    }

    /// Host rebound the focused position to `slot`: re-apply focus to it
    pub fn on_bound(&mut self, pool: &mut SlotPool, slot: SlotId, index: usize) -> Result<()> {
        if self.state.focused_index != Some(index) {
            return Ok(());
        }
        pool.set_focused(Some(slot));
        if self.autoplay {
            self.grant(pool, slot)?;
        }
        Ok(())
    }

    /// Screen left the foreground: pause whichever slot holds the playhead
    pub fn on_background(&mut self, pool: &mut SlotPool) -> Result<()> {
        if self.backgrounded {
            return Ok(());
        }
        self.backgrounded = true;
        let paused = pool.pause_all();
        tracing::debug!(?paused, "Paused playback for background");
        self.resume_index = paused.first().copied();
        Ok(())
    }

    /// Screen returned: resume the slot that was playing, else the focused one
    pub fn on_foreground(&mut self, pool: &mut SlotPool) -> Result<()> {
        self.backgrounded = false;
        let target = self
            .resume_index
            .take()
            .and_then(|i| pool.slot_at(i))
            .or_else(|| self.focused_slot(pool));
        if let Some(slot) = target {
            tracing::debug!(%slot, "Resuming playback for foreground");
            self.grant(pool, slot)?;
        }
        Ok(())
    }

    /// Forget the focus; used on teardown
    pub fn clear(&mut self) {
        self.state.focused_index = None;
        self.resume_index = None;
    }

    /// Resume `slot` exclusively unless backgrounded
    ///
    /// A faulted slot is left alone; only an explicit tap re-triggers it.
    fn grant(&self, pool: &mut SlotPool, slot: SlotId) -> Result<()> {
        if self.backgrounded {
            return Ok(());
        }
        if pool.slot(slot).is_some_and(|s| s.state() == SlotState::Error) {
            tracing::debug!(%slot, "Focused slot is faulted; not resuming");
            return Ok(());
        }
        pool.resume_exclusive(slot)?;
        Ok(())
    }

    fn focused_slot(&self, pool: &SlotPool) -> Option<SlotId> {
        self.state.focused_index.and_then(|i| pool.slot_at(i))
    }
}
