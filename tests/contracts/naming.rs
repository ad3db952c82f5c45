//! CONTRACT: keepsync only ever writes managed-named files.

use std::collections::BTreeSet;

use tempfile::TempDir;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::domain::ports::FileSystem;
use keepsync::domain::value_objects::managed_name::{is_managed, normalize_path};
use keepsync::{JsonStateRepository, LocalFs, STATE_FILE_NAME};

use crate::common::*;

fn tree(root: &std::path::Path) -> BTreeSet<String> {
    LocalFs::new()
        .list_files(root)
        .unwrap()
        .iter()
        .map(|p| normalize_path(p))
        .collect()
}

/// CONTRACT: every written file is managed-named or the lock file
#[test]
fn contract_written_files_are_managed() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    let provider = FakeProvider::with_files(&[
        ("Makefile", "all:\n"),
        ("src/main.rs", "fn main() {}\n"),
        (".env.example", "A=1\n"),
    ]);
    let options = SyncOptions::new(root, provider.args());
    let run = || {
        SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
            .sync(&options)
            .unwrap()
    };
    run();
    std::fs::write(root.join("src/main.copy.rs"), "fn main() { edited() }\n").unwrap();
    provider.put("src/main.rs", "fn main() { upstream() }\n");
    run();

    let files = tree(root);

    assert!(files.contains("Makefile.copy"));
    assert!(files.contains("src/main.copy.rs"));
    assert!(files.contains("src/main.patch.rs"));
    assert!(files.contains(".env.copy.example"));
    for file in &files {
        assert!(
            file == STATE_FILE_NAME || is_managed(file),
            "unmanaged file written: {file}"
        );
    }
}

/// CONTRACT: user files next to mirrors are never touched
#[test]
fn contract_user_files_are_left_alone() {
    let dest = TempDir::new().unwrap();
    let root = dest.path();
    std::fs::write(root.join("notes.txt"), "mine\n").unwrap();
    let provider = FakeProvider::with_files(&[("notes.txt", "theirs\n")]);
    let options = SyncOptions::new(root, provider.args()).with_clean(true);

    SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), provider.registry())
        .sync(&options)
        .unwrap();

    assert_eq!(std::fs::read_to_string(root.join("notes.txt")).unwrap(), "mine\n");
    assert_eq!(
        std::fs::read_to_string(root.join("notes.copy.txt")).unwrap(),
        "theirs\n"
    );
}
