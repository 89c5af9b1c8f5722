//! Feed dispatcher - the single coordination task
//!
//! [`Feed`] holds all mutable feed state and applies one [`FeedCommand`] at a
//! time. [`FeedDispatcher`] runs it on a tokio task, reading commands from the
//! channel that host input, players and tickers all share. [`FeedHandle`] is
//! the host's side of that channel.

use crate::error::{FeedError, Result};
use crate::events::{EventSink, FeedCommand, FeedEvent};
use crate::focus::{FocusCoordinator, FocusState};
use crate::gesture::{PointerEvent, SeekBarEvent, Transport};
use crate::player::PlayerBackend;
use crate::pool::SlotPool;
use crate::types::{FeedConfig, SlotId};
use fuplay_core::MediaItem;
use std::ops::ControlFlow;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Feed state: the slot pool plus focus
#[derive(Debug)]
pub struct Feed {
    pool: SlotPool,
    focus: FocusCoordinator,
}

impl Feed {
    pub fn new(
        items: Vec<MediaItem>,
        backend: Box<dyn PlayerBackend>,
        config: &FeedConfig,
        commands: UnboundedSender<FeedCommand>,
        events: UnboundedSender<FeedEvent>,
    ) -> Result<Self> {
        config.validate()?;
        if items.is_empty() {
            return Err(FeedError::EmptyFeed);
        }

        let pool = SlotPool::new(items, backend, config, commands, EventSink::new(events));
        let focus = FocusCoordinator::new(FocusState::new(), config.autoplay_on_focus);
        Ok(Self { pool, focus })
    }

    pub fn pool(&self) -> &SlotPool {
        &self.pool
    }

    pub fn focus(&self) -> &FocusCoordinator {
        &self.focus
    }

    /// Apply one command
    ///
    /// Returns `Break` once the feed has shut down.
    pub fn apply(&mut self, command: FeedCommand) -> Result<ControlFlow<()>> {
        match command {
            FeedCommand::Focus(index) => {
                self.focus.set_focus(&mut self.pool, index)?;
            }
            FeedCommand::Advance => {
                self.focus.advance(&mut self.pool)?;
            }
            FeedCommand::Retreat => {
                self.focus.retreat(&mut self.pool)?;
            }
            FeedCommand::Pointer { index, event } => self.route_pointer(index, event)?,
            FeedCommand::TapFocused => {
                if let Some(slot) = self.focused_slot() {
                    self.pool.toggle(slot)?;
                }
            }
            FeedCommand::SeekBar { index, event } => self.route_seek_bar(index, event)?,
            FeedCommand::Bind { slot, index } => {
                self.pool.bind(slot, index)?;
                self.focus.on_bound(&mut self.pool, slot, index)?;
            }
            FeedCommand::Recycle { slot } => self.pool.recycle(slot)?,
            FeedCommand::Foreground => self.focus.on_foreground(&mut self.pool)?,
            FeedCommand::Background => self.focus.on_background(&mut self.pool)?,
            FeedCommand::Player {
                slot,
                handle,
                notification,
            } => self.pool.on_notification(slot, handle, notification),
            FeedCommand::Tick { slot, epoch } => self.pool.on_tick(slot, epoch),
            FeedCommand::Shutdown => {
                self.teardown();
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Release every slot and forget focus
    pub fn teardown(&mut self) {
        self.pool.release_all();
        self.focus.clear();
    }

    fn route_pointer(&mut self, index: usize, event: PointerEvent) -> Result<()> {
        let Some(slot) = self.pool.slot_at(index) else {
            tracing::trace!(index, "Pointer input on unbound position");
            return Ok(());
        };
        match self.pool.slot_mut(slot)?.gestures_mut().on_pointer(event) {
            Some(transport) => self.apply_transport(slot, transport),
            None => Ok(()),
        }
    }

    fn route_seek_bar(&mut self, index: usize, event: SeekBarEvent) -> Result<()> {
        let Some(slot) = self.pool.slot_at(index) else {
            tracing::trace!(index, "Seek-bar input on unbound position");
            return Ok(());
        };
        match self.pool.slot_mut(slot)?.gestures_mut().on_seek_bar(event) {
            Some(transport) => self.apply_transport(slot, transport),
            None => Ok(()),
        }
    }

    fn apply_transport(&mut self, slot: SlotId, transport: Transport) -> Result<()> {
        tracing::debug!(%slot, ?transport, "Gesture recognised");
        match transport {
            Transport::TogglePlayPause => {
                self.pool.toggle(slot)?;
            }
            Transport::Advance => {
                self.focus.advance(&mut self.pool)?;
            }
            Transport::Retreat => {
                self.focus.retreat(&mut self.pool)?;
            }
            Transport::BeginScrub => self.pool.slot_mut(slot)?.begin_scrub(),
            Transport::ScrubTo(percent) => {
                self.pool.slot_mut(slot)?.scrub_to(percent);
            }
            Transport::EndScrub => self.pool.slot_mut(slot)?.end_scrub(),
        }
        Ok(())
    }

    fn focused_slot(&self) -> Option<SlotId> {
        self.focus
            .focused_index()
            .and_then(|index| self.pool.slot_at(index))
    }
}

/// Owns a [`Feed`] and the receiving end of its command channel
#[derive(Debug)]
pub struct FeedDispatcher {
    feed: Feed,
    commands: UnboundedReceiver<FeedCommand>,
}

impl FeedDispatcher {
    /// Build a feed and its channels
    ///
    /// Returns the dispatcher (to be run), the host-side handle, and the
    /// receiver for outbound events.
    pub fn new(
        items: Vec<MediaItem>,
        backend: Box<dyn PlayerBackend>,
        config: &FeedConfig,
    ) -> Result<(Self, FeedHandle, UnboundedReceiver<FeedEvent>)> {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        let feed = Feed::new(items, backend, config, commands_tx.clone(), events_tx)?;
        let handle = FeedHandle { tx: commands_tx };
        Ok((Self { feed, commands }, handle, events))
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// Process commands until [`FeedCommand::Shutdown`]
    ///
    /// Slots and tickers hold senders of their own, so the channel never
    /// closes while the feed is alive.
    pub async fn run(mut self) {
        tracing::info!(items = self.feed.pool().len(), "Feed dispatcher started");

        while let Some(command) = self.commands.recv().await {
            match self.feed.apply(command) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(e) => tracing::warn!(error = %e, "Feed command failed"),
            }
        }

        self.feed.teardown();
        tracing::info!("Feed dispatcher stopped");
    }

    /// Run on the current tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Host-side sender for feed commands
#[derive(Debug, Clone)]
pub struct FeedHandle {
    tx: UnboundedSender<FeedCommand>,
}

impl FeedHandle {
    /// Send a raw command
    pub fn send(&self, command: FeedCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| FeedError::DispatcherClosed)
    }

    pub fn focus(&self, index: usize) -> Result<()> {
        self.send(FeedCommand::Focus(index))
    }

    pub fn advance(&self) -> Result<()> {
        self.send(FeedCommand::Advance)
    }

    pub fn retreat(&self) -> Result<()> {
        self.send(FeedCommand::Retreat)
    }

    pub fn pointer(&self, index: usize, event: PointerEvent) -> Result<()> {
        self.send(FeedCommand::Pointer { index, event })
    }

    pub fn tap_focused(&self) -> Result<()> {
        self.send(FeedCommand::TapFocused)
    }

    pub fn seek_bar(&self, index: usize, event: SeekBarEvent) -> Result<()> {
        self.send(FeedCommand::SeekBar { index, event })
    }

    pub fn bind(&self, slot: SlotId, index: usize) -> Result<()> {
        self.send(FeedCommand::Bind { slot, index })
    }

    pub fn recycle(&self, slot: SlotId) -> Result<()> {
        self.send(FeedCommand::Recycle { slot })
    }

    pub fn foreground(&self) -> Result<()> {
        self.send(FeedCommand::Foreground)
    }

    pub fn background(&self) -> Result<()> {
        self.send(FeedCommand::Background)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(FeedCommand::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use fuplay_core::MediaId;

    fn items(n: u64) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem::new(MediaId(i), format!("/v/{i}.mp4"), format!("{i}.mp4"), 3_000))
            .collect()
    }

    #[test]
    fn empty_feed_is_rejected() {
        let result = FeedDispatcher::new(
            Vec::new(),
            Box::new(FakeBackend::new(1_000)),
            &FeedConfig::default(),
        );
        assert!(matches!(result, Err(FeedError::EmptyFeed)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FeedConfig {
            tick_interval_ms: 0,
            ..FeedConfig::default()
        };
        let result = FeedDispatcher::new(items(2), Box::new(FakeBackend::new(1_000)), &config);
        assert!(matches!(result, Err(FeedError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn handle_reports_closed_dispatcher() {
        let (dispatcher, handle, _events) =
            FeedDispatcher::new(items(2), Box::new(FakeBackend::new(1_000)), &FeedConfig::default())
                .unwrap();
        let task = dispatcher.spawn();

        handle.shutdown().unwrap();
        task.await.unwrap();

        assert!(matches!(handle.advance(), Err(FeedError::DispatcherClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn bad_command_does_not_stop_the_feed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (events_tx, _events) = mpsc::unbounded_channel();
        let mut feed = Feed::new(
            items(2),
            Box::new(FakeBackend::new(1_000)),
            &FeedConfig::default(),
            tx,
            events_tx,
        )
        .unwrap();

        assert!(matches!(
            feed.apply(FeedCommand::Focus(9)),
            Err(FeedError::IndexOutOfBounds { .. })
        ));
        assert_eq!(
            feed.apply(FeedCommand::Focus(1)).unwrap(),
            ControlFlow::Continue(())
        );
        while let Ok(command) = rx.try_recv() {
            feed.apply(command).unwrap();
        }
        assert_eq!(feed.pool().playing_count(), 1);
    }
}
