//! Scenario: files appear, disappear, and get ignored upstream.

use std::fs;

use tempfile::TempDir;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::domain::value_objects::{ArchiveArgs, CopyArgs};
use keepsync::{CleanUseCase, FileStatus, JsonStateRepository, LocalFs};

use crate::assert_status;
use crate::common::*;

/// SCENARIO: upstream renames a file; clean removes the stale copy
#[test]
fn scenario_rename_upstream_then_clean() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[("docs/old.md", "text\n")]);
    let options = SyncOptions::new(root, provider.args());
    let sync = || {
        SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
            .sync(&options)
            .unwrap()
    };

    sync();
    provider.delete("docs/old.md");
    provider.put("guide/new.md", "text\n");
    let report = sync();

    assert_eq!(report.removed, vec!["docs/old.copy.md"]);
    assert_status!(report, "guide/new.copy.md", FileStatus::New);

    let clean = CleanUseCase::new(JsonStateRepository::new(), LocalFs::new())
        .execute(root)
        .unwrap();
    assert_eq!(clean.deleted, vec!["docs/old.copy.md"]);
    assert!(!root.join("docs").exists());
    assert!(root.join("guide/new.copy.md").exists());
}

/// SCENARIO: a file becomes ignored, then mirrored again
#[test]
fn scenario_ignore_then_unignore() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[("big.bin", "payload"), ("a.txt", "a\n")]);

    let ignoring = provider.args().with_copy_args(CopyArgs {
        ignore: vec!["*.bin".to_string()],
        ..CopyArgs::default()
    });
    let options = SyncOptions::new(root, ignoring).with_clean(true);
    let report = SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
        .sync(&options)
        .unwrap();
    assert_status!(report, "big.copy.bin", FileStatus::Ignored);
    assert!(!root.join("big.copy.bin").exists());

    let options = SyncOptions::new(root, provider.args());
    let report = SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
        .sync(&options)
        .unwrap();
    assert_status!(report, "big.copy.bin", FileStatus::New);
    assert_eq!(fs::read_to_string(root.join("big.copy.bin")).unwrap(), "payload");
}

/// SCENARIO: archive snapshots follow the remote
#[test]
fn scenario_archive_snapshot_updates() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[("a.txt", "a\n")]);
    provider.set_archive(b"v1");
    let args = provider.args().with_archive_args(ArchiveArgs {
        enabled: true,
        name: None,
    });
    let options = SyncOptions::new(root, args).with_clean(true);
    let sync = || {
        SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
            .sync(&options)
            .unwrap()
    };

    let first = sync();
    assert!(first.is_success());
    let sidecar_v1 = fs::read_to_string(root.join("source.copy.sha256")).unwrap();

    provider.set_archive(b"v2");
    let second = sync();

    assert!(second.written.contains(&"source.copy.tar.gz".to_string()));
    assert_eq!(fs::read(root.join("source.copy.tar.gz")).unwrap(), b"v2");
    let sidecar_v2 = fs::read_to_string(root.join("source.copy.sha256")).unwrap();
    assert_ne!(sidecar_v1, sidecar_v2);
    // Clean treats both artifacts as referenced
    assert!(second.clean.unwrap().deleted.is_empty());
}
