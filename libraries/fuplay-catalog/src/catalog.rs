//! Directory-backed media catalog

use crate::error::{CatalogError, Result};
use crate::scanner::FileScanner;
use fuplay_core::{MediaCatalog, MediaId, MediaItem, PermissionGate, UNKNOWN_FOLDER};
use lofty::AudioFile;
use std::path::{Path, PathBuf};

/// Catalog that enumerates video files under a set of directories
///
/// Every call to [`MediaCatalog::query`] rescans the directories. Items are
/// ordered by display name (case-insensitive) and numbered from 1 in that
/// order, so ids are stable only within a single query.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    directories: Vec<PathBuf>,
    scanner: FileScanner,
}

impl DirectoryCatalog {
    /// Create a catalog over the given directories
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            scanner: FileScanner::new(),
        }
    }

    /// Use a custom scanner (depth limit, symlink policy)
    pub fn with_scanner(mut self, scanner: FileScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Directories this catalog scans
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    fn describe(path: &Path) -> Result<MediaItem> {
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CatalogError::InvalidPath(path.display().to_string()))?
            .to_string();

        let size_bytes = std::fs::metadata(path)?.len();

        Ok(MediaItem::new(
            MediaId(0),
            path.display().to_string(),
            display_name,
            read_duration_hint(path),
        )
        .with_folder(folder_name(path))
        .with_size(size_bytes))
    }
}

impl MediaCatalog for DirectoryCatalog {
    fn query(&self) -> fuplay_core::Result<Vec<MediaItem>> {
        let paths = self.scanner.scan_directories(&self.directories);

        let mut items = Vec::with_capacity(paths.len());
        for path in &paths {
            match Self::describe(path) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        items.sort_by_cached_key(|item| item.display_name.to_lowercase());
        for (position, item) in items.iter_mut().enumerate() {
            item.id = MediaId(position as u64 + 1);
        }

        tracing::info!(
            directories = self.directories.len(),
            items = items.len(),
            "Catalog query complete"
        );

        Ok(items)
    }
}

/// Grants media access when every configured directory can be listed
#[derive(Debug, Clone)]
pub struct DirectoryPermissionGate {
    directories: Vec<PathBuf>,
}

impl DirectoryPermissionGate {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }
}

impl PermissionGate for DirectoryPermissionGate {
    fn can_read_media(&self) -> bool {
        !self.directories.is_empty()
            && self.directories.iter().all(|dir| match std::fs::read_dir(dir) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!("Cannot read {}: {}", dir.display(), e);
                    false
                }
            })
    }
}

/// Name of the directory that directly contains `path`
fn folder_name(path: &Path) -> String {
    path.parent()
        .and_then(|parent| parent.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_FOLDER.to_string())
}

/// Container duration, 0 when the file cannot be probed
fn read_duration_hint(path: &Path) -> u64 {
    match lofty::read_from_path(path) {
        Ok(tagged_file) => tagged_file.properties().duration().as_millis() as u64,
        Err(e) => {
            tracing::debug!("No duration for {}: {}", path.display(), e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_name_uses_parent_directory() {
        assert_eq!(folder_name(Path::new("/videos/beach/a.mp4")), "beach");
        assert_eq!(folder_name(Path::new("a.mp4")), UNKNOWN_FOLDER);
    }

    #[test]
    fn unreadable_duration_is_zero() {
        assert_eq!(read_duration_hint(Path::new("/nonexistent/a.mp4")), 0);
    }

    #[test]
    fn gate_denies_without_directories() {
        assert!(!DirectoryPermissionGate::new(vec![]).can_read_media());
        assert!(!DirectoryPermissionGate::new(vec!["/nonexistent/videos".into()]).can_read_media());
    }
}
