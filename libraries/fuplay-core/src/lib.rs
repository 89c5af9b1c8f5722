//! Fuplay Core
//!
//! Platform-agnostic media types and collaborator traits shared by every
//! Fuplay crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `MediaItem`, `MediaId`, `MediaFolder`
//! - **Collaborator Traits**: `MediaCatalog`, `PermissionGate`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use fuplay_core::{group_by_folder, MediaId, MediaItem};
//!
//! let items = vec![
//!     MediaItem::new(MediaId(1), "/videos/beach/a.mp4", "a.mp4", 12_000).with_folder("beach"),
//!     MediaItem::new(MediaId(2), "/videos/city/b.mp4", "b.mp4", 8_000).with_folder("city"),
//! ];
//!
//! let folders = group_by_folder(items);
//! assert_eq!(folders.len(), 2);
//! assert_eq!(folders[0].name, "beach");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::{AllowAll, MediaCatalog, PermissionGate};
pub use types::{format_duration, group_by_folder, MediaFolder, MediaId, MediaItem, UNKNOWN_FOLDER};
