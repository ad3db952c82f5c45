//! Property tests for the classifier.

use chrono::Utc;
use proptest::prelude::*;

use keepsync::domain::entities::TrackedFile;
use keepsync::domain::services::{classify, ClassifyInput, Differ, FileStatus};
use keepsync::ContentHash;

fn content() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just("one\n"), Just("two\n"), Just("three\n")],
        0..=6,
    )
    .prop_map(|lines| lines.concat().into_bytes())
}

fn recorded(remote: &[u8], local: &[u8]) -> TrackedFile {
    TrackedFile::new("f.copy.txt", "f.txt", Utc::now())
        .with_remote_hash(Some(ContentHash::from_bytes(remote)))
        .with_delta(Differ::new().diff(remote, local))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a file that diverged from its recorded remote is never written.
    #[test]
    fn property_customized_files_are_never_written(
        remote in content(),
        local in content(),
        incoming in content(),
    ) {
        prop_assume!(remote != local);
        let record = recorded(&remote, &local);

        let result = classify(ClassifyInput {
            on_disk: Some(&local),
            record: Some(&record),
            incoming: Some(&incoming),
            managed_name: true,
        })
        .unwrap();

        prop_assert!(!result.write);
    }

    /// PROPERTY: a pristine file is written exactly when the remote changed.
    #[test]
    fn property_pristine_files_follow_remote(remote in content(), incoming in content()) {
        let record = recorded(&remote, &remote);

        let result = classify(ClassifyInput {
            on_disk: Some(&remote),
            record: Some(&record),
            incoming: Some(&incoming),
            managed_name: true,
        })
        .unwrap();

        prop_assert_eq!(result.write, remote != incoming);
        let expected = if remote == incoming { FileStatus::Unchanged } else { FileStatus::Modified };
        prop_assert_eq!(result.status, expected);
    }
}
