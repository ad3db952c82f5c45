//! Property tests for the managed naming convention.

use proptest::prelude::*;

use keepsync::domain::value_objects::managed_name::{
    copy_path, is_copy_name, is_managed, is_overlay_name, is_safe_relative, overlay_path,
};

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-]{1,8}(\\.[a-z]{1,4})?").unwrap()
}

fn relative_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..=4).prop_map(|parts| parts.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every mirror path carries the copy marker and stays in its directory.
    #[test]
    fn property_copy_path_is_managed(path in relative_path()) {
        let mirrored = copy_path(&path);
        prop_assert!(is_copy_name(&mirrored));
        prop_assert!(is_managed(&mirrored));
        prop_assert!(is_safe_relative(&mirrored));

        let dir = |p: &str| p.rsplit_once('/').map(|(d, _)| d.to_string());
        prop_assert_eq!(dir(&mirrored), dir(&path));
    }

    /// PROPERTY: every mirror has an overlay name that is not a mirror name.
    #[test]
    fn property_overlay_exists_for_mirrors(path in relative_path()) {
        let overlay = overlay_path(&copy_path(&path)).unwrap();
        prop_assert!(is_overlay_name(&overlay));
        prop_assert_ne!(overlay, copy_path(&path));
    }

    /// PROPERTY: distinct remote paths never share a mirror path.
    #[test]
    fn property_copy_path_is_injective(a in relative_path(), b in relative_path()) {
        prop_assume!(a != b);
        prop_assert_ne!(copy_path(&a), copy_path(&b));
    }

    /// PROPERTY: parent traversal is never considered safe.
    #[test]
    fn property_parent_traversal_is_unsafe(path in relative_path()) {
        let escaped = format!("../{path}");
        prop_assert!(!is_safe_relative(&escaped));
    }
}
