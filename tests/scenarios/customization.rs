//! Scenario: a vendored file is edited locally while upstream keeps moving.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::domain::ports::StateRepository;
use keepsync::{FileStatus, JsonStateRepository, LocalFs, STATE_FILE_NAME};

use crate::assert_status;
use crate::common::*;

fn use_case(provider: &std::sync::Arc<FakeProvider>) -> SyncUseCase<JsonStateRepository, LocalFs> {
    SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
}

/// SCENARIO: edit, upstream update, revert, upstream update
#[test]
fn scenario_customization_round_trip() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[("config.ini", "a=1\nb=2\nc=3\n")]);
    let options = SyncOptions::new(root, provider.args());

    // Step 1: first mirror
    let report = use_case(&provider).sync(&options).unwrap();
    assert_status!(report, "config.copy.ini", FileStatus::New);

    // Step 2: local edit of one line
    fs::write(root.join("config.copy.ini"), "a=1\nb=20\nc=3\n").unwrap();

    // Step 3: upstream edits a different line; the local edit wins
    provider.put("config.ini", "a=1\nb=2\nc=30\n");
    let report = use_case(&provider).sync(&options).unwrap();
    assert_status!(report, "config.copy.ini", FileStatus::Customized);
    assert_eq!(
        fs::read_to_string(root.join("config.copy.ini")).unwrap(),
        "a=1\nb=20\nc=3\n"
    );
    let overlay = fs::read_to_string(root.join("config.patch.ini")).unwrap();
    assert!(overlay.contains("-c=30"));
    assert!(overlay.contains("+c=3"));

    // Step 4: the recorded delta reproduces the local content from the remote
    let state = JsonStateRepository::new()
        .load(&root.join(STATE_FILE_NAME))
        .unwrap();
    let record = state.tracked("config.copy.ini").unwrap();
    assert_eq!(
        record.delta().apply(b"a=1\nb=2\nc=30\n").unwrap(),
        b"a=1\nb=20\nc=3\n".to_vec()
    );

    // Step 5: the user adopts upstream; the divergence resolves
    fs::write(root.join("config.copy.ini"), "a=1\nb=2\nc=30\n").unwrap();
    let report = use_case(&provider)
        .sync(&options.clone().with_force(true))
        .unwrap();
    assert_status!(report, "config.copy.ini", FileStatus::Unchanged);

    // Step 6: subsequent upstream updates flow in again
    provider.put("config.ini", "a=1\nb=2\nc=31\n");
    let report = use_case(&provider).sync(&options).unwrap();
    assert_status!(report, "config.copy.ini", FileStatus::Modified);
    assert_eq!(
        fs::read_to_string(root.join("config.copy.ini")).unwrap(),
        "a=1\nb=2\nc=31\n"
    );
}

/// SCENARIO: a customized file is deleted locally
#[test]
fn scenario_deleted_customized_file_is_not_restored() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[("a.txt", "one\n")]);
    let options = SyncOptions::new(root, provider.args());
    use_case(&provider).sync(&options).unwrap();

    fs::write(root.join("a.copy.txt"), "mine\n").unwrap();
    provider.put("a.txt", "two\n");
    use_case(&provider).sync(&options).unwrap();

    fs::remove_file(root.join("a.copy.txt")).unwrap();
    provider.put("a.txt", "three\n");
    let report = use_case(&provider).sync(&options).unwrap();

    assert_status!(report, "a.copy.txt", FileStatus::Deleted);
    assert!(!root.join("a.copy.txt").exists());
}
