//! Property tests for edit scripts.

use proptest::prelude::*;

use keepsync::domain::services::Differ;
use keepsync::EditScript;

fn text() -> impl Strategy<Value = Vec<u8>> {
    // Few distinct lines so generated pairs share content
    proptest::collection::vec(
        prop_oneof![
            Just("alpha\n"),
            Just("beta\n"),
            Just("gamma\n"),
            Just("\n"),
            Just("delta"),
        ],
        0..=12,
    )
    .prop_map(|lines| lines.concat().into_bytes())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: applying diff(old, new) to old yields new.
    #[test]
    fn property_apply_reproduces_target(old in text(), new in text()) {
        let script = Differ::new().diff(&old, &new);
        prop_assert_eq!(script.apply(&old).unwrap(), new);
    }

    /// PROPERTY: the inverted script takes new back to old.
    #[test]
    fn property_invert_reverses(old in text(), new in text()) {
        let script = Differ::new().diff(&old, &new);
        prop_assert_eq!(script.invert().apply(&new).unwrap(), old);
    }

    /// PROPERTY: the persisted form decodes to an equivalent script.
    #[test]
    fn property_encoding_preserves_behavior(old in text(), new in text()) {
        let script = Differ::new().diff(&old, &new);
        let decoded = EditScript::decode(&script.encode()).unwrap();
        prop_assert_eq!(decoded.apply(&old).unwrap(), new);
        prop_assert_eq!(decoded.change_count(), script.change_count());
    }

    /// PROPERTY: identical inputs have no change regions.
    #[test]
    fn property_identity_is_empty(content in text()) {
        let script = Differ::new().diff(&content, &content);
        prop_assert!(script.is_empty());
        prop_assert_eq!(script.change_count(), 0);
    }

    /// PROPERTY: decoding arbitrary input never panics.
    #[test]
    fn property_decode_never_panics(input in "(?s).{0,256}") {
        let _ = EditScript::decode(&input);
    }
}
