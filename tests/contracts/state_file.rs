//! CONTRACT: the lock file is versioned JSON at `<dest>/.keepsync.lock`.

use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::domain::ports::{StateError, StateRepository};
use keepsync::domain::value_objects::CopyArgs;
use keepsync::{JsonStateRepository, LocalFs, SourceArgs, STATE_FILE_NAME};

use crate::common::*;

fn synced_lock_file(
    files: &[(&str, &str)],
    args_fn: impl Fn(&FakeProvider) -> SourceArgs,
) -> (TempDir, Value) {
    let dest = TempDir::new().unwrap();
    let provider = FakeProvider::with_files(files);
    let options = SyncOptions::new(dest.path(), args_fn(provider.as_ref()));
    SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
        .sync(&options)
        .unwrap();
    let raw = fs::read_to_string(dest.path().join(STATE_FILE_NAME)).unwrap();
    let json = serde_json::from_str(&raw).unwrap();
    (dest, json)
}

/// CONTRACT: top-level layout and the historical `coppied_files` key
#[test]
fn contract_lock_file_layout() {
    let (_dest, json) = synced_lock_file(&[("a.txt", "a\n")], FakeProvider::args);

    assert_eq!(json["version"], 1);
    assert_eq!(json["commit_hash"], "rev-1");
    assert_eq!(json["args"]["provider"], "fake");
    let entry = &json["coppied_files"]["a.copy.txt"];
    assert_eq!(entry["file"], "a.copy.txt");
    assert_eq!(entry["source"], "a.txt");
    assert_eq!(entry["permalink"], "fake://rev-1/a.txt");
    assert!(entry["remote_hash"].as_str().unwrap().starts_with("sha256:"));
    assert!(json.get("copied_files").is_none());
}

/// CONTRACT: ignored content is stored compressed in `blobs`
#[test]
fn contract_ignored_content_is_a_blob() {
    let (_dest, json) = synced_lock_file(&[("secret.env", "TOKEN=1\n")], |p| {
        p.args().with_copy_args(CopyArgs {
            ignore: vec!["*.env".to_string()],
            ..CopyArgs::default()
        })
    });

    assert_eq!(json["coppied_files"]["secret.copy.env"]["ignored"], true);
    let blob = json["blobs"]["secret.copy.env"].as_str().unwrap();
    assert!(!blob.is_empty());
    assert!(!blob.contains("TOKEN"));
}

/// CONTRACT: `copied_files` is accepted on load
#[test]
fn contract_copied_files_alias_is_accepted() {
    let dest = TempDir::new().unwrap();
    let path = dest.path().join(STATE_FILE_NAME);
    fs::write(
        &path,
        r#"{
  "version": 1,
  "commit_hash": "abc",
  "copied_files": {
    "a.copy.txt": { "file": "a.copy.txt", "last_updated": "2024-01-01T00:00:00Z" }
  }
}"#,
    )
    .unwrap();

    let doc = JsonStateRepository::new().load(&path).unwrap();

    assert_eq!(doc.commit_hash(), "abc");
    assert!(doc.tracked("a.copy.txt").is_some());
}

/// CONTRACT: unknown versions are refused, never reinterpreted
#[test]
fn contract_future_version_is_refused() {
    let dest = TempDir::new().unwrap();
    let path = dest.path().join(STATE_FILE_NAME);
    fs::write(&path, r#"{ "version": 2 }"#).unwrap();

    let err = JsonStateRepository::new().load(&path).unwrap_err();

    assert!(matches!(
        err,
        StateError::VersionMismatch {
            found: 2,
            expected: 1
        }
    ));
}

/// CONTRACT: keys escaping the destination root mark the file corrupted
#[test]
fn contract_escaping_keys_are_corrupt() {
    let dest = TempDir::new().unwrap();
    let path = dest.path().join(STATE_FILE_NAME);
    fs::write(
        &path,
        r#"{
  "version": 1,
  "coppied_files": {
    "../evil.copy.txt": { "file": "../evil.copy.txt", "last_updated": "2024-01-01T00:00:00Z" }
  }
}"#,
    )
    .unwrap();

    let err = JsonStateRepository::new().load(&path).unwrap_err();

    assert!(matches!(err, StateError::Corrupted { .. }));
}

/// CONTRACT: a missing lock file is an empty state
#[test]
fn contract_missing_lock_file_is_empty() {
    let dest = TempDir::new().unwrap();

    let doc = JsonStateRepository::new()
        .load(&dest.path().join(STATE_FILE_NAME))
        .unwrap();

    assert_eq!(doc.tracked_len(), 0);
    assert_eq!(doc.commit_hash(), "");
}
