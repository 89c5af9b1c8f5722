//! End-to-end feed over the clock backend and real files
//!
//! The files are not decodable, so duration comes from the item's hint.

use fuplay_core::{MediaId, MediaItem};
use fuplay_feed::{ClockBackend, FeedConfig, FeedDispatcher, FeedEvent, PlayerError, SlotState};
use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

fn write_clip(dir: &TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"placeholder clip").unwrap();
    path.to_string_lossy().into_owned()
}

fn drain(events: &mut UnboundedReceiver<FeedEvent>) -> Vec<FeedEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

#[tokio::test]
async fn clip_plays_to_end_and_settles_paused() {
    let dir = TempDir::new().unwrap();
    let items = vec![
        MediaItem::new(MediaId(1), write_clip(&dir, "a.mp4"), "a.mp4", 400),
        MediaItem::new(MediaId(2), write_clip(&dir, "b.mp4"), "b.mp4", 400),
    ];

    let (dispatcher, feed, mut events) =
        FeedDispatcher::new(items, Box::new(ClockBackend::new()), &FeedConfig::default()).unwrap();
    let task = dispatcher.spawn();

    feed.focus(0).unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    let events = drain(&mut events);
    let states: Vec<SlotState> = events
        .iter()
        .filter_map(|e| match e {
            FeedEvent::StateChanged {
                index: Some(0),
                state,
                ..
            } => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SlotState::Preparing,
            SlotState::Playing,
            SlotState::Ended,
            SlotState::Paused
        ]
    );

    let reports: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            FeedEvent::Progress { index: 0, percent } => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(reports.len() >= 2, "{reports:?}");
    assert_eq!(reports.last(), Some(&0));
    assert!(reports.iter().any(|p| *p > 0));

    feed.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn missing_file_reports_source_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.mp4").to_string_lossy().into_owned();
    let items = vec![
        MediaItem::new(MediaId(1), write_clip(&dir, "a.mp4"), "a.mp4", 5_000),
        MediaItem::new(MediaId(2), missing, "gone.mp4", 5_000),
    ];

    let (dispatcher, feed, mut events) =
        FeedDispatcher::new(items, Box::new(ClockBackend::new()), &FeedConfig::default()).unwrap();
    let task = dispatcher.spawn();

    feed.focus(0).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let errors: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            FeedEvent::PlaybackError { index, error } => Some((index, error)),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, 1);
    assert!(matches!(errors[0].1, PlayerError::Source(_)));

    feed.shutdown().unwrap();
    task.await.unwrap();
}
