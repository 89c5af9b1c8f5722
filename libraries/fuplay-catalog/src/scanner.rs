//! Directory scanning for video files

use crate::{CatalogError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Container extensions the feed can hand to a player backend
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "webm", "3gp", "avi"];

/// Scanner for video files in directories
#[derive(Debug, Clone, Default)]
pub struct FileScanner {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse (`None` for unlimited)
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan a directory for video files
    ///
    /// Unreadable entries below `path` are skipped. The returned paths are
    /// sorted so repeated scans of an unchanged tree agree.
    pub fn scan_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }

        if !path.is_dir() {
            return Err(CatalogError::InvalidPath(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let mut walker = WalkDir::new(path).follow_links(self.follow_links);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut videos: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_video_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        videos.sort();
        Ok(videos)
    }

    /// Scan multiple directories for video files
    ///
    /// A directory that fails to scan is logged and skipped.
    pub fn scan_directories(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut all_files = Vec::new();

        for path in paths {
            match self.scan_directory(path) {
                Ok(mut files) => all_files.append(&mut files),
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", path.display(), e);
                }
            }
        }

        all_files
    }
}

/// Check if a file has a supported video extension
pub fn is_video_file(path: &Path) -> bool {
    get_video_extension(path).is_some()
}

/// Get the lowercase video extension of a path
pub fn get_video_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .filter(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("clip.MOV")));
        assert!(is_video_file(Path::new("clip.webm")));
        assert!(!is_video_file(Path::new("song.mp3")));
        assert!(!is_video_file(Path::new("clip")));
    }

    #[test]
    fn test_get_video_extension() {
        assert_eq!(
            get_video_extension(Path::new("clip.MKV")),
            Some("mkv".to_string())
        );
        assert_eq!(get_video_extension(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_scan_directory() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("b.mp4"), b"fake mp4").unwrap();
        fs::write(base.join("a.mkv"), b"fake mkv").unwrap();
        fs::write(base.join("readme.txt"), b"not video").unwrap();

        let subdir = base.join("trip");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("c.webm"), b"fake webm").unwrap();

        let files = FileScanner::new().scan_directory(base).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.mkv"));
        assert!(files[1].ends_with("b.mp4"));
        assert!(files.iter().any(|p| p.ends_with("c.webm")));
        assert!(!files.iter().any(|p| p.ends_with("readme.txt")));
    }

    #[test]
    fn test_scan_with_max_depth() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("top.mp4"), b"fake").unwrap();
        let subdir = base.join("nested");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("deep.mp4"), b"fake").unwrap();

        let files = FileScanner::new().max_depth(1).scan_directory(base).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.mp4"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = FileScanner::new().scan_directory(Path::new("/nonexistent/videos"));
        assert!(matches!(result, Err(CatalogError::FileNotFound(_))));
    }

    #[test]
    fn test_scan_directories_skips_failures() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one.mp4"), b"fake").unwrap();

        let files = FileScanner::new().scan_directories(&[
            PathBuf::from("/nonexistent/videos"),
            temp.path().to_path_buf(),
        ]);

        assert_eq!(files.len(), 1);
    }
}
