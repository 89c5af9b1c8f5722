//! Slot pool - bounded set of playback slots over the media list
//!
//! Slots live in an arena indexed by [`SlotId`]. A slot's identity never
//! changes; the list position it represents does. `by_index` is the reverse
//! map, so at most one slot represents any list position.

use crate::error::{FeedError, Result};
use crate::events::{EventSink, FeedCommand};
use crate::gesture::{GestureRouter, GestureThresholds};
use crate::handle::PlaybackHandle;
use crate::player::{PlayerBackend, PlayerNotification, PlayerNotifier};
use crate::slot::PlaybackSlot;
use crate::ticker::ProgressTicker;
use crate::types::{FeedConfig, HandleId, SlotId, SlotState};
use fuplay_core::MediaItem;
use std::collections::HashMap;
use std::ops::Range;
use tokio::sync::mpsc::UnboundedSender;

pub struct SlotPool {
    items: Vec<MediaItem>,
    slots: Vec<PlaybackSlot>,
    by_index: HashMap<usize, SlotId>,
    backend: Box<dyn PlayerBackend>,
    next_handle: u64,
    commands: UnboundedSender<FeedCommand>,
    events: EventSink,
}

impl SlotPool {
    /// Create a pool of `config.capacity()` unbound slots over `items`
    pub fn new(
        items: Vec<MediaItem>,
        backend: Box<dyn PlayerBackend>,
        config: &FeedConfig,
        commands: UnboundedSender<FeedCommand>,
        events: EventSink,
    ) -> Self {
        let thresholds = GestureThresholds::from(config);
        let slots = (0..config.capacity())
            .map(|n| {
                let id = SlotId(n);
                PlaybackSlot::new(
                    id,
                    ProgressTicker::new(id, config.tick_interval(), commands.clone()),
                    GestureRouter::new(config.gesture_mode, thresholds),
                    events.clone(),
                )
            })
            .collect();

        Self {
            items,
            slots,
            by_index: HashMap::new(),
            backend,
            next_handle: 1,
            commands,
            events,
        }
    }

    /// Number of media items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of simultaneously bound slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn slot(&self, slot: SlotId) -> Option<&PlaybackSlot> {
        self.slots.get(slot.0)
    }

    pub fn slot_mut(&mut self, slot: SlotId) -> Result<&mut PlaybackSlot> {
        self.slots.get_mut(slot.0).ok_or(FeedError::UnknownSlot(slot))
    }

    pub fn slots(&self) -> impl Iterator<Item = &PlaybackSlot> {
        self.slots.iter()
    }

    /// Slot currently representing `index`
    pub fn slot_at(&self, index: usize) -> Option<SlotId> {
        self.by_index.get(&index).copied()
    }

    /// Bound list positions, ascending
    pub fn bound_indices(&self) -> Vec<usize> {
        let mut indices: Vec<_> = self.by_index.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Slots actually playing, as reported by their players
    pub fn playing_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_playing()).count()
    }

    /// Slots in the `Playing` state
    pub fn playing_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.state() == SlotState::Playing)
            .map(PlaybackSlot::id)
            .collect()
    }

    /// Make `slot` represent `index`
    ///
    /// The slot's previous handle, and any other slot holding `index`, are
    /// released before the new player is created. Binding a slot to the
    /// index it already holds does nothing.
    pub fn bind(&mut self, slot: SlotId, index: usize) -> Result<()> {
        self.check_index(index)?;
        let current = self.slot_mut(slot)?.index();
        if current == Some(index) {
            return Ok(());
        }

        if let Some(other) = self.slot_at(index).filter(|other| *other != slot) {
            self.recycle(other)?;
        }
        self.recycle(slot)?;

        let handle_id = HandleId(self.next_handle);
        self.next_handle += 1;

        let notifier = PlayerNotifier::new(slot, handle_id, self.commands.clone());
        let player = self.backend.create(notifier);
        let item = self.items[index].clone();
        let handle = PlaybackHandle::new(handle_id, item.source_locator.clone(), player);

        self.slots[slot.0].bind(index, item, handle);
        self.by_index.insert(index, slot);
        Ok(())
    }

    /// Release `slot`'s resources; idempotent
    pub fn recycle(&mut self, slot: SlotId) -> Result<()> {
        let target = self.slots.get_mut(slot.0).ok_or(FeedError::UnknownSlot(slot))?;
        if let Some(index) = target.index() {
            self.by_index.remove(&index);
        }
        target.recycle();
        Ok(())
    }

    /// Slot representing `index`, binding one if needed
    ///
    /// Prefers an unbound slot; otherwise evicts the bound slot farthest
    /// from `center`.
    pub fn acquire(&mut self, index: usize, center: usize) -> Result<SlotId> {
        self.check_index(index)?;
        if let Some(slot) = self.slot_at(index) {
            return Ok(slot);
        }

        let target = self
            .slots
            .iter()
            .find(|s| !s.state().is_bound())
            .map(PlaybackSlot::id)
            .or_else(|| self.farthest_from(center))
            .ok_or(FeedError::PoolExhausted {
                capacity: self.slots.len(),
            })?;

        tracing::trace!(index, slot = %target, "Acquiring slot");
        self.bind(target, index)?;
        Ok(target)
    }

    /// Keep the positions around `center` bound and everything else released
    ///
    /// Slots outside the window are recycled first so their decoders are
    /// freed before new ones are created. Neighbours are prepared silently.
    pub fn ensure_window(&mut self, center: usize) -> Result<()> {
        self.check_index(center)?;
        let window = self.window(center);

        let outside: Vec<SlotId> = self
            .slots
            .iter()
            .filter(|s| s.index().is_some_and(|i| !window.contains(&i)))
            .map(PlaybackSlot::id)
            .collect();
        for slot in outside {
            self.recycle(slot)?;
        }

        self.acquire(center, center)?;
        for index in window.filter(|i| *i != center) {
            self.acquire(index, center)?;
        }
        Ok(())
    }

    /// Positions kept bound around `center`, shifted to stay inside the list
    pub fn window(&self, center: usize) -> Range<usize> {
        let size = self.capacity().min(self.len());
        let radius = self.capacity() / 2;
        let mut start = center.saturating_sub(radius);
        if start + size > self.len() {
            start = self.len() - size;
        }
        start..start + size
    }

    /// Grant playback to `slot`, pausing every other slot first
    pub fn resume_exclusive(&mut self, slot: SlotId) -> Result<bool> {
        self.slot_mut(slot)?;
        self.pause_others(Some(slot));
        Ok(self.slots[slot.0].resume())
    }

    /// Pause every slot except `keep`
    ///
    /// Returns the list positions of the slots that were playing or about to.
    pub fn pause_others(&mut self, keep: Option<SlotId>) -> Vec<usize> {
        let mut paused = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| Some(s.id()) != keep) {
            if slot.wants_to_play() {
                paused.extend(slot.index());
                slot.pause();
            }
        }
        paused
    }

    pub fn pause_all(&mut self) -> Vec<usize> {
        self.pause_others(None)
    }

    /// Flip `slot` between playing and paused; returns whether it now plays
    pub fn toggle(&mut self, slot: SlotId) -> Result<bool> {
        if self.slot_mut(slot)?.wants_to_play() {
            self.slots[slot.0].pause();
            Ok(false)
        } else {
            self.resume_exclusive(slot)
        }
    }

    /// Mark `slot` as the focused one and clear the flag everywhere else
    pub fn set_focused(&mut self, slot: Option<SlotId>) {
        for s in &mut self.slots {
            let focused = Some(s.id()) == slot;
            s.set_focused(focused);
        }
    }

    pub fn on_notification(
        &mut self,
        slot: SlotId,
        handle: HandleId,
        notification: PlayerNotification,
    ) {
        match self.slots.get_mut(slot.0) {
            Some(target) => target.on_notification(handle, notification),
            None => tracing::trace!(%slot, %handle, "Notification for unknown slot"),
        }
    }

    pub fn on_tick(&mut self, slot: SlotId, epoch: u64) {
        if let Some(target) = self.slots.get_mut(slot.0) {
            target.on_tick(epoch);
        }
    }

    /// Recycle every slot
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.recycle();
        }
        self.by_index.clear();
        tracing::debug!("Released all slots");
    }

    fn farthest_from(&self, center: usize) -> Option<SlotId> {
        self.slots
            .iter()
            .filter_map(|s| s.index().map(|i| (s.id(), i.abs_diff(center))))
            .filter(|(_, distance)| *distance > 0)
            .max_by_key(|(_, distance)| *distance)
            .map(|(id, _)| id)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(FeedError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl std::fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPool")
            .field("len", &self.items.len())
            .field("slots", &self.slots)
            .field("by_index", &self.by_index)
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use fuplay_core::MediaId;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| {
                MediaItem::new(
                    MediaId(i as u64 + 1),
                    format!("/videos/{i}.mp4"),
                    format!("{i}.mp4"),
                    10_000,
                )
            })
            .collect()
    }

    fn pool(n: usize, backend: &FakeBackend) -> (SlotPool, UnboundedReceiver<FeedCommand>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, _events) = mpsc::unbounded_channel();
        let pool = SlotPool::new(
            items(n),
            Box::new(backend.clone()),
            &FeedConfig::default(),
            commands_tx,
            EventSink::new(events_tx),
        );
        (pool, commands)
    }

    fn pump(pool: &mut SlotPool, commands: &mut UnboundedReceiver<FeedCommand>) {
        while let Ok(command) = commands.try_recv() {
            match command {
                FeedCommand::Player {
                    slot,
                    handle,
                    notification,
                } => pool.on_notification(slot, handle, notification),
                FeedCommand::Tick { slot, epoch } => pool.on_tick(slot, epoch),
                _ => {}
            }
        }
    }

    #[test]
    fn window_shifts_at_list_edges() {
        let backend = FakeBackend::new(1_000);
        let (pool, _rx) = pool(10, &backend);
        assert_eq!(pool.window(0), 0..3);
        assert_eq!(pool.window(5), 4..7);
        assert_eq!(pool.window(9), 7..10);

        let (short, _rx) = self::pool(2, &backend);
        assert_eq!(short.window(1), 0..2);
    }

    #[tokio::test(start_paused = true)]
    async fn bind_is_unique_per_index() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(5, &backend);

        pool.bind(SlotId(0), 2).unwrap();
        pool.bind(SlotId(1), 2).unwrap();

        assert_eq!(pool.slot_at(2), Some(SlotId(1)));
        assert_eq!(pool.slot(SlotId(0)).unwrap().state(), SlotState::Unbound);
        assert_eq!(pool.bound_indices(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn rebinding_same_index_keeps_handle() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(5, &backend);

        pool.bind(SlotId(0), 1).unwrap();
        pool.bind(SlotId(0), 1).unwrap();

        assert_eq!(backend.created().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rebinding_releases_before_creating() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(5, &backend);

        pool.bind(SlotId(0), 0).unwrap();
        pool.bind(SlotId(0), 4).unwrap();

        let created = backend.created();
        assert_eq!(created.len(), 2);
        assert_eq!(backend.release_count(created[0]), 1);
        assert_eq!(backend.release_count(created[1]), 0);
    }

    #[test]
    fn bind_rejects_bad_input() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(2, &backend);

        assert!(matches!(
            pool.bind(SlotId(0), 7),
            Err(FeedError::IndexOutOfBounds { index: 7, len: 2 })
        ));
        assert!(matches!(
            pool.bind(SlotId(9), 0),
            Err(FeedError::UnknownSlot(SlotId(9)))
        ));
        assert!(backend.created().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn window_recycles_far_slots() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(10, &backend);

        pool.ensure_window(0).unwrap();
        assert_eq!(pool.bound_indices(), vec![0, 1, 2]);

        pool.ensure_window(6).unwrap();
        assert_eq!(pool.bound_indices(), vec![5, 6, 7]);
        assert_eq!(backend.created().len(), 6);
        for handle in &backend.created()[..3] {
            assert_eq!(backend.release_count(*handle), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_evicts_farthest_slot() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(10, &backend);
        pool.ensure_window(1).unwrap();

        let slot = pool.acquire(3, 2).unwrap();

        assert_eq!(pool.slot(slot).unwrap().index(), Some(3));
        assert_eq!(pool.bound_indices(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_exclusive_pauses_others() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, mut rx) = pool(3, &backend);
        pool.ensure_window(0).unwrap();
        pump(&mut pool, &mut rx);

        let first = pool.slot_at(0).unwrap();
        let second = pool.slot_at(1).unwrap();
        pool.resume_exclusive(first).unwrap();
        pool.resume_exclusive(second).unwrap();
        pump(&mut pool, &mut rx);

        assert_eq!(pool.playing_slots(), vec![second]);
        assert_eq!(pool.playing_count(), 1);
        assert_eq!(pool.slot(first).unwrap().state(), SlotState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_all_reports_what_was_playing() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, mut rx) = pool(3, &backend);
        pool.ensure_window(0).unwrap();
        pump(&mut pool, &mut rx);

        let second = pool.slot_at(1).unwrap();
        pool.resume_exclusive(second).unwrap();
        pump(&mut pool, &mut rx);

        assert_eq!(pool.pause_others(Some(second)), Vec::<usize>::new());
        assert_eq!(pool.pause_all(), vec![1]);
        pump(&mut pool, &mut rx);

        assert!(pool.playing_slots().is_empty());
        assert!(backend.playing().is_empty());
        assert_eq!(pool.pause_all(), Vec::<usize>::new());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_play_state() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, mut rx) = pool(3, &backend);
        pool.bind(SlotId(2), 0).unwrap();
        pump(&mut pool, &mut rx);

        assert!(pool.toggle(SlotId(2)).unwrap());
        assert!(!pool.toggle(SlotId(2)).unwrap());
        assert_eq!(pool.slot(SlotId(2)).unwrap().state(), SlotState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn release_all_unbinds_everything() {
        let backend = FakeBackend::new(1_000);
        let (mut pool, _rx) = pool(4, &backend);
        pool.ensure_window(1).unwrap();

        pool.release_all();

        assert!(pool.bound_indices().is_empty());
        assert!(pool.slots().all(|s| s.state() == SlotState::Unbound));
        for handle in backend.created() {
            assert_eq!(backend.release_count(handle), 1);
        }
    }
}
