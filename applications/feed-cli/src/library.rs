/// Library loading: permission check, catalog query, folder selection
use crate::config::LibrarySettings;
use crate::error::{CliError, Result};
use fuplay_catalog::{DirectoryCatalog, FileScanner};
use fuplay_core::{group_by_folder, MediaCatalog, MediaItem, PermissionGate};
use std::path::PathBuf;

/// Build a catalog over `directories` using the library settings
pub fn catalog(settings: &LibrarySettings, directories: Vec<PathBuf>) -> DirectoryCatalog {
    let mut scanner = FileScanner::new().follow_links(settings.follow_links);
    if let Some(depth) = settings.max_depth {
        scanner = scanner.max_depth(depth);
    }
    DirectoryCatalog::new(directories).with_scanner(scanner)
}

/// Query `catalog` once the gate grants access
///
/// On denial the catalog is never touched.
pub fn load_items(gate: &dyn PermissionGate, catalog: &dyn MediaCatalog) -> Result<Vec<MediaItem>> {
    if !gate.can_read_media() {
        return Err(CliError::PermissionDenied(
            "media directories cannot be read".to_string(),
        ));
    }

    let items = catalog.query()?;
    if items.is_empty() {
        return Err(CliError::NoMedia("the library directories".to_string()));
    }

    Ok(items)
}

/// Restrict `items` to one folder, or keep them all
pub fn select_folder(items: Vec<MediaItem>, folder: Option<&str>) -> Result<Vec<MediaItem>> {
    let Some(name) = folder else {
        return Ok(items);
    };

    group_by_folder(items)
        .into_iter()
        .find(|f| f.name == name)
        .map(|f| f.items)
        .ok_or_else(|| CliError::UnknownFolder(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuplay_core::{AllowAll, MediaId};

    struct Fixed(Vec<MediaItem>);

    impl MediaCatalog for Fixed {
        fn query(&self) -> fuplay_core::Result<Vec<MediaItem>> {
            Ok(self.0.clone())
        }
    }

    struct Exploding;

    impl MediaCatalog for Exploding {
        fn query(&self) -> fuplay_core::Result<Vec<MediaItem>> {
            panic!("catalog queried without permission");
        }
    }

    fn item(id: u64, folder: &str) -> MediaItem {
        MediaItem::new(MediaId(id), format!("/v/{id}.mp4"), format!("{id}.mp4"), 1_000)
            .with_folder(folder)
    }

    #[test]
    fn denied_gate_skips_the_catalog() {
        let denied = || false;
        let err = load_items(&denied, &Exploding).unwrap_err();
        assert!(matches!(err, CliError::PermissionDenied(_)));
    }

    #[test]
    fn empty_library_is_reported() {
        let err = load_items(&AllowAll, &Fixed(Vec::new())).unwrap_err();
        assert!(matches!(err, CliError::NoMedia(_)));
    }

    #[test]
    fn selects_one_folder() {
        let items = vec![item(1, "beach"), item(2, "city"), item(3, "beach")];

        let beach = select_folder(items.clone(), Some("beach")).unwrap();
        assert_eq!(beach.iter().map(|i| i.id.0).collect::<Vec<_>>(), vec![1, 3]);

        assert_eq!(select_folder(items.clone(), None).unwrap().len(), 3);
        assert!(matches!(
            select_folder(items, Some("forest")),
            Err(CliError::UnknownFolder(_))
        ));
    }
}
