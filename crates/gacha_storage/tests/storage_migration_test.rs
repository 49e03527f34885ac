//! Tests for absorbing the legacy film image store.

use gacha_storage::{AssetRepository, AssetTag, StorageConfig, WarningKind};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

fn open(root: &Path) -> AssetRepository {
    let config = StorageConfig::default().with_data_root(root);
    AssetRepository::open(&config).unwrap()
}

fn legacy_dir(root: &Path) -> PathBuf {
    root.join("film_images")
}

fn legacy_index(root: &Path) -> PathBuf {
    legacy_dir(root).join("film_images_index.json")
}

fn library_index(root: &Path) -> PathBuf {
    root.join("image_library").join("image_library_index.json")
}

/// Lay down a legacy store with the given files and index entries.
fn seed_legacy(root: &Path, files: &[(&str, &[u8])], index: &str) {
    std::fs::create_dir_all(legacy_dir(root)).unwrap();
    for (name, bytes) in files {
        std::fs::write(legacy_dir(root).join(name), bytes).unwrap();
    }
    std::fs::write(legacy_index(root), index).unwrap();
}

#[tokio::test]
async fn test_first_list_absorbs_legacy_store() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[("film_1.png", b"frame one")], r#"["film_1.png"]"#);

    let repo = open(root);
    let listed = repo.list().await.unwrap();
    assert!(listed.is_clean());

    let records = listed.into_value();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.file_name(), "film_1.png");
    assert_eq!(record.id(), "film_1.png");
    assert_eq!(record.original_name().as_deref(), Some("film_1.png"));
    assert_eq!(record.tags().as_deref(), Some(&[AssetTag::Film][..]));

    assert!(!legacy_index(root).exists());
    assert!(!legacy_dir(root).join("film_1.png").exists());
    assert_eq!(
        std::fs::read(root.join("image_library").join("film_1.png")).unwrap(),
        b"frame one"
    );
    assert_eq!(repo.load_bytes("film_1.png").await.unwrap(), b"frame one");
    assert!(repo.is_migration_verified());
}

#[tokio::test]
async fn test_stale_legacy_entry_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[], r#"["film_2.png"]"#);

    let repo = open(root);
    let listed = repo.list().await.unwrap();
    assert!(listed.has_warning(WarningKind::LegacyFileMissing));
    assert!(listed.value().is_empty());
    assert!(!legacy_index(root).exists());
}

#[tokio::test]
async fn test_migration_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(
        root,
        &[("film_1.png", b"one"), ("film_3.jpg", b"three")],
        r#"["film_1.png", "film_2.png", "film_3.jpg"]"#,
    );

    let repo = open(root);
    let outcome = repo.migrate().await.unwrap();
    assert!(outcome.has_warning(WarningKind::LegacyFileMissing));

    let report = outcome.into_value();
    assert_eq!(report.migrated(), &vec!["film_1.png".to_string(), "film_3.jpg".to_string()]);
    assert_eq!(report.missing(), &vec!["film_2.png".to_string()]);
    assert!(report.already_present().is_empty());
    assert!(report.failed().is_empty());

    // Legacy order is kept
    let ids: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_value()
        .iter()
        .map(|r| r.id().clone())
        .collect();
    assert_eq!(ids, vec!["film_1.png".to_string(), "film_3.jpg".to_string()]);
}

#[tokio::test]
async fn test_migration_twice_matches_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(
        root,
        &[("film_1.png", b"one"), ("film_2.png", b"two")],
        r#"["film_1.png", "film_2.png"]"#,
    );

    let repo = open(root);
    repo.migrate().await.unwrap();
    let once = std::fs::read(library_index(root)).unwrap();

    let second = repo.migrate().await.unwrap();
    assert!(second.is_clean());
    assert!(second.value().is_noop());
    let twice = std::fs::read(library_index(root)).unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_rerun_after_interrupted_retirement() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let repo = open(root);
    repo.migrate().await.unwrap();
    let once = std::fs::read(library_index(root)).unwrap();

    // Simulate a crash after the copy but before the legacy store was cleaned up
    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let repo = open(root);
    let outcome = repo.migrate().await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(outcome.value().already_present(), &vec!["film_1.png".to_string()]);
    assert!(outcome.value().migrated().is_empty());

    assert_eq!(std::fs::read(library_index(root)).unwrap(), once);
    assert!(!legacy_index(root).exists());
    assert!(!legacy_dir(root).join("film_1.png").exists());
    assert_eq!(
        std::fs::read(root.join("image_library").join("film_1.png")).unwrap(),
        b"one"
    );
    assert!(*outcome.value().retired());
    assert_eq!(repo.list().await.unwrap().value().len(), 1);
}

#[tokio::test]
async fn test_indexed_name_without_library_file_keeps_legacy_copy() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let repo = open(root);
    repo.migrate().await.unwrap();
    std::fs::remove_file(root.join("image_library").join("film_1.png")).unwrap();
    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let outcome = repo.migrate().await.unwrap();
    assert_eq!(outcome.value().already_present(), &vec!["film_1.png".to_string()]);
    assert!(legacy_dir(root).join("film_1.png").exists());
}

#[tokio::test]
async fn test_legacy_records_follow_existing_ones() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let saved = {
        let repo = open(root);
        repo.save(PNG, Some("prize.png"), &[AssetTag::Prize])
            .await
            .unwrap()
            .into_value()
    };

    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let repo = open(root);
    let records = repo.list().await.unwrap().into_value();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], saved);
    assert_eq!(records[1].id(), "film_1.png");
}

#[tokio::test]
async fn test_save_triggers_migration() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[("film_1.png", b"one")], r#"["film_1.png"]"#);

    let repo = open(root);
    let saved = repo.save(PNG, None, &[]).await.unwrap().into_value();

    let ids: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_value()
        .iter()
        .map(|r| r.id().clone())
        .collect();
    assert_eq!(ids, vec![saved.id().clone(), "film_1.png".to_string()]);
}

#[tokio::test]
async fn test_unusable_legacy_entries() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::write(root.join("evil.png"), b"outside").unwrap();
    seed_legacy(
        root,
        &[("film_1.png", b"one")],
        r#"["../evil.png", 5, "", null, "film_1.png"]"#,
    );

    let repo = open(root);
    let outcome = repo.migrate().await.unwrap();
    assert!(outcome.has_warning(WarningKind::LegacyEntryFailed));

    let report = outcome.into_value();
    assert_eq!(report.migrated(), &vec!["film_1.png".to_string()]);
    assert_eq!(report.failed(), &vec!["../evil.png".to_string()]);

    assert!(root.join("evil.png").exists());
    assert!(!root.join("image_library").join("evil.png").exists());
}

#[tokio::test]
async fn test_corrupt_legacy_index_migrates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(root, &[("film_1.png", b"one")], "[not json");

    let repo = open(root);
    let outcome = repo.migrate().await.unwrap();
    assert!(outcome.has_warning(WarningKind::CorruptIndex));
    assert!(outcome.value().is_noop());

    assert!(repo.list().await.unwrap().value().is_empty());
    assert!(legacy_dir(root).join("film_1.png").exists());
}

#[tokio::test]
async fn test_no_legacy_store_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let repo = open(temp_dir.path());

    assert!(!repo.is_migration_verified());
    let outcome = repo.migrate().await.unwrap();
    assert!(outcome.is_clean());
    assert!(outcome.value().is_noop());
    assert!(repo.is_migration_verified());
    assert!(!library_index(temp_dir.path()).exists());
}

#[tokio::test]
async fn test_concurrent_entry_points_migrate_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_legacy(
        root,
        &[("film_1.png", b"one"), ("film_2.png", b"two")],
        r#"["film_1.png", "film_2.png"]"#,
    );

    let repo = open(root);
    let (a, b, c) = tokio::join!(repo.list(), repo.list(), repo.migrate());
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let records = repo.list().await.unwrap().into_value();
    assert_eq!(records.len(), 2);
}
