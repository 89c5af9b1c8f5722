//! Core media types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Folder name used when an item's location has no parent directory
pub const UNKNOWN_FOLDER: &str = "Unknown";

/// Stable identifier of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaId(pub u64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single video in the feed
///
/// Created once by the catalog before the feed opens and read-only to the
/// playback core afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Catalog identifier
    pub id: MediaId,

    /// Opaque locator resolved by the player backend (path or URI)
    pub source_locator: String,

    /// Name shown to the user
    pub display_name: String,

    /// Duration reported by the catalog, 0 when unknown
    pub duration_hint_ms: u64,

    /// Parent folder name used for grouping
    pub folder_name: String,

    /// File size in bytes, 0 when unknown
    pub size_bytes: u64,
}

impl MediaItem {
    /// Create an item with no folder or size information
    pub fn new(
        id: MediaId,
        source_locator: impl Into<String>,
        display_name: impl Into<String>,
        duration_hint_ms: u64,
    ) -> Self {
        Self {
            id,
            source_locator: source_locator.into(),
            display_name: display_name.into(),
            duration_hint_ms,
            folder_name: UNKNOWN_FOLDER.to_string(),
            size_bytes: 0,
        }
    }

    /// Set the folder this item is grouped under
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder_name = folder.into();
        self
    }

    /// Set the file size
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Duration hint rendered as `m:ss`
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_hint_ms)
    }
}

/// Items sharing a parent folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFolder {
    /// Folder name
    pub name: String,

    /// Items in display order
    pub items: Vec<MediaItem>,
}

impl MediaFolder {
    /// Create an empty folder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Number of items in the folder
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the folder has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the duration hints of every item
    pub fn total_duration_ms(&self) -> u64 {
        self.items.iter().map(|item| item.duration_hint_ms).sum()
    }
}

/// Group items by folder name
///
/// Folders come back sorted by name. Items keep their relative input order
/// inside each folder.
pub fn group_by_folder(items: impl IntoIterator<Item = MediaItem>) -> Vec<MediaFolder> {
    let mut folders: BTreeMap<String, MediaFolder> = BTreeMap::new();

    for item in items {
        folders
            .entry(item.folder_name.clone())
            .or_insert_with_key(|name| MediaFolder::new(name.clone()))
            .items
            .push(item);
    }

    folders.into_values().collect()
}

/// Format a millisecond duration as `m:ss`
///
/// Minutes are not wrapped into hours, so a 75 minute video renders as `75:00`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
