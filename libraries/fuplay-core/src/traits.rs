//! Collaborator traits for Fuplay
//!
//! The feed core never enumerates media or asks for permissions itself; hosts
//! provide these capabilities through the traits below.

use crate::error::Result;
use crate::types::MediaItem;

/// Source of feed items
///
/// A catalog produces a finite, ordered sequence of items. The sequence is not
/// restartable mid-session: refreshing the feed means running a fresh query.
pub trait MediaCatalog: Send {
    /// Run a fresh query and return every item in display order
    ///
    /// # Errors
    /// Returns an error if the underlying media store cannot be read
    fn query(&self) -> Result<Vec<MediaItem>>;
}

/// Media read permission check
///
/// Hosts consult the gate before touching a catalog. On denial the feed core
/// is never constructed.
pub trait PermissionGate {
    /// Whether the process may read media
    fn can_read_media(&self) -> bool;
}

/// Gate that always grants access (headless hosts, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn can_read_media(&self) -> bool {
        true
    }
}

impl<F> PermissionGate for F
where
    F: Fn() -> bool,
{
    fn can_read_media(&self) -> bool {
        self()
    }
}
