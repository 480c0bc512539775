//! Integration tests for AssetScanner
//!
//! These tests verify:
//! - End-to-end grouping of a real directory tree
//! - Event delivery through the channel subscription
//! - Recursion into nested directories
//! - Cancellation and restart of a scanner

use camino::{Utf8Path, Utf8PathBuf};
use digismod::services::{AssetScanner, ScanEvent, ScanStatus, is_asset_database_directory};
use digismod::{AssetGroup, Category, ModError};
use std::fs;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

fn touch(dir: &Utf8Path, files: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for file in files {
        fs::write(dir.join(file), b"").unwrap();
    }
}

fn by_name(mut groups: Vec<AssetGroup>) -> Vec<AssetGroup> {
    groups.sort_by(|a, b| a.base_name.cmp(&b.base_name));
    groups
}

async fn collect_events(scanner: &AssetScanner) -> (Vec<AssetGroup>, usize) {
    let mut events = scanner.subscribe();
    let worker = scanner.start().unwrap();

    let mut groups = Vec::new();
    let finished = loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("Timeout waiting for scan event")
            .expect("Channel closed");
        match event {
            ScanEvent::AssetFound(group) => groups.push(group),
            ScanEvent::ScanFinished { groups: count, .. } => break count,
        }
    };

    assert_eq!(worker.join().unwrap(), ScanStatus::Finished);
    (groups, finished)
}

#[tokio::test]
async fn test_scan_groups_hero_and_other() {
    let (_temp_dir, root) = create_test_dir();
    touch(
        &root,
        &["hero.name", "hero_ab01.anim", "hero_cd02.anim", "other.name"],
    );

    let scanner = AssetScanner::new(&root);
    let (groups, finished) = collect_events(&scanner).await;
    let groups = by_name(groups);

    assert_eq!(finished, 2);
    assert_eq!(groups.len(), 2);

    let hero = &groups[0];
    assert_eq!(hero.base_name, "hero");
    assert_eq!(hero.files(Category::Name), ["hero.name"]);
    assert_eq!(
        hero.files(Category::Animation),
        ["hero_ab01.anim", "hero_cd02.anim"]
    );
    assert_eq!(hero.files(Category::Geometry), ["hero.geom"]);
    assert_eq!(hero.files(Category::Skeleton), ["hero.skel"]);
    assert_eq!(hero.directory.as_deref(), Some(root.as_path()));

    let other = &groups[1];
    assert_eq!(other.base_name, "other");
    assert!(other.files(Category::Animation).is_empty());
    assert_eq!(other.files(Category::Geometry), ["other.geom"]);
    assert_eq!(other.files(Category::Skeleton), ["other.skel"]);
}

#[tokio::test]
async fn test_scan_recurses_into_subdirectories() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root.join("chars"), &["hero.name", "hero.anim"]);
    touch(&root.join("chars").join("bosses"), &["boss.name", "boss_zz99.anim"]);
    touch(&root.join("empty"), &[]);

    let scanner = AssetScanner::new(&root);
    let (groups, finished) = collect_events(&scanner).await;
    let groups = by_name(groups);

    assert_eq!(finished, 2);
    assert_eq!(groups[0].base_name, "boss");
    assert_eq!(groups[0].directory, Some(root.join("chars").join("bosses")));
    assert_eq!(groups[0].files(Category::Animation), ["boss_zz99.anim"]);
    assert_eq!(groups[1].base_name, "hero");
    assert_eq!(groups[1].directory, Some(root.join("chars")));
    assert_eq!(groups[1].files(Category::Animation), ["hero.anim"]);
}

#[tokio::test]
async fn test_scan_without_name_files_finishes_empty() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root, &["readme.txt", "lonely.anim"]);

    let scanner = AssetScanner::new(&root);
    let (groups, finished) = collect_events(&scanner).await;

    assert!(groups.is_empty());
    assert_eq!(finished, 0);
    assert_eq!(scanner.status(), ScanStatus::Finished);
}

#[test]
fn test_scan_missing_directory_fails() {
    let (_temp_dir, root) = create_test_dir();
    let scanner = AssetScanner::new(root.join("missing"));

    let result = scanner.start();
    assert!(matches!(result, Err(ModError::InvalidDirectoryPath(_))));
    assert_eq!(scanner.status(), ScanStatus::Idle);
}

#[test]
fn test_stop_before_run_is_reset_by_new_scan() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root, &["a.name", "b.name", "c.name"]);

    let scanner = AssetScanner::new(&root);
    scanner.stop();

    // Starting a scan clears any stale cancellation request
    let status = scanner.run().unwrap();
    assert_eq!(status, ScanStatus::Finished);
    assert!(!scanner.is_cancel_requested());
}

#[test]
fn test_rescan_emits_again() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root, &["a.name", "b.name", "c.name"]);

    let scanner = AssetScanner::new(&root);
    let mut events = scanner.subscribe();

    assert_eq!(scanner.run().unwrap(), ScanStatus::Finished);
    let first_timestamp = scanner.last_scan_timestamp();
    assert!(first_timestamp > 0);
    assert_eq!(scanner.run().unwrap(), ScanStatus::Finished);

    let mut found = 0;
    let mut finished = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            ScanEvent::AssetFound(_) => found += 1,
            ScanEvent::ScanFinished { .. } => finished += 1,
        }
    }
    assert_eq!(found, 6);
    assert_eq!(finished, 2);
    assert!(scanner.last_scan_timestamp() >= first_timestamp);
}

#[test]
fn test_scanned_directory_is_database() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root, &["a.name", "b.name"]);
    assert!(!is_asset_database_directory(&root).unwrap());

    touch(&root, &["c.name"]);
    assert!(is_asset_database_directory(&root).unwrap());
}

#[test]
fn test_events_observed_from_blocking_context() {
    let (_temp_dir, root) = create_test_dir();
    touch(&root, &["solo.name", "solo_ab12.anim"]);

    let scanner = AssetScanner::new(&root);
    let mut events = scanner.subscribe();
    let worker = scanner.start().unwrap();

    let first = tokio_test::block_on(events.recv()).unwrap();
    match first {
        ScanEvent::AssetFound(group) => {
            assert_eq!(group.base_name, "solo");
            assert_eq!(group.files(Category::Animation), ["solo_ab12.anim"]);
        }
        other => panic!("Expected AssetFound, got {:?}", other),
    }

    let last = tokio_test::block_on(events.recv()).unwrap();
    assert!(matches!(last, ScanEvent::ScanFinished { groups: 1, .. }));
    worker.join().unwrap();
}
