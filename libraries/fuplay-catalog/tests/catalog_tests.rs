//! Integration tests for the directory catalog
//!
//! Builds real directory trees and checks what a feed would be opened with.

use fuplay_catalog::{DirectoryCatalog, DirectoryPermissionGate, FileScanner};
use fuplay_core::{group_by_folder, MediaCatalog, MediaId, PermissionGate};
use std::fs;
use tempfile::TempDir;

fn video_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let base = temp.path();

    let beach = base.join("beach");
    let city = base.join("city");
    fs::create_dir(&beach).unwrap();
    fs::create_dir(&city).unwrap();

    fs::write(beach.join("Waves.mp4"), vec![0u8; 64]).unwrap();
    fs::write(beach.join("sunset.mov"), vec![0u8; 32]).unwrap();
    fs::write(city.join("night.webm"), vec![0u8; 16]).unwrap();
    fs::write(city.join("notes.txt"), b"not a video").unwrap();

    temp
}

#[test]
fn query_orders_by_display_name_and_numbers_items() {
    let temp = video_tree();
    let catalog = DirectoryCatalog::new(vec![temp.path().to_path_buf()]);

    let items = catalog.query().unwrap();
    let names: Vec<_> = items.iter().map(|i| i.display_name.as_str()).collect();

    assert_eq!(names, ["night.webm", "sunset.mov", "Waves.mp4"]);
    assert_eq!(items[0].id, MediaId(1));
    assert_eq!(items[2].id, MediaId(3));
    assert_eq!(items[2].size_bytes, 64);
}

#[test]
fn query_groups_into_sorted_folders() {
    let temp = video_tree();
    let catalog = DirectoryCatalog::new(vec![temp.path().to_path_buf()]);

    let folders = group_by_folder(catalog.query().unwrap());

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].name, "beach");
    assert_eq!(folders[0].len(), 2);
    assert_eq!(folders[1].name, "city");
    assert_eq!(folders[1].items[0].display_name, "night.webm");
}

#[test]
fn fake_files_have_zero_duration_hint() {
    let temp = video_tree();
    let catalog = DirectoryCatalog::new(vec![temp.path().to_path_buf()]);

    let items = catalog.query().unwrap();
    assert!(items.iter().all(|item| item.duration_hint_ms == 0));
}

#[test]
fn depth_limited_scanner_only_sees_top_level() {
    let temp = video_tree();
    fs::write(temp.path().join("top.mp4"), b"fake").unwrap();

    let catalog = DirectoryCatalog::new(vec![temp.path().to_path_buf()])
        .with_scanner(FileScanner::new().max_depth(1));

    let items = catalog.query().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].display_name, "top.mp4");
}

#[test]
fn each_query_rescans() {
    let temp = video_tree();
    let catalog = DirectoryCatalog::new(vec![temp.path().to_path_buf()]);

    assert_eq!(catalog.query().unwrap().len(), 3);
    fs::write(temp.path().join("beach").join("new.mp4"), b"fake").unwrap();
    assert_eq!(catalog.query().unwrap().len(), 4);
}

#[test]
fn permission_gate_reflects_directory_access() {
    let temp = video_tree();
    let gate = DirectoryPermissionGate::new(vec![temp.path().to_path_buf()]);
    assert!(gate.can_read_media());

    let gate = DirectoryPermissionGate::new(vec![
        temp.path().to_path_buf(),
        temp.path().join("missing"),
    ]);
    assert!(!gate.can_read_media());
}
