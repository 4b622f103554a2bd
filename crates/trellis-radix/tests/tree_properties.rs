//! Property-based tests for the radix tree.

use std::collections::HashMap;

use proptest::prelude::*;
use trellis_radix::Tree;

/// Distinct static path segments: lowercase words joined by `/`.
fn static_paths() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z]{1,8}(/[a-z]{1,8}){0,3}", 1..16).prop_map(|set| {
        set.into_iter()
            .map(|suffix| format!("/{suffix}"))
            .collect::<Vec<_>>()
    })
}

proptest! {
    /// Every registered static path resolves to its own value, with no
    /// captures and no cross-talk between routes.
    #[test]
    fn static_routes_are_disjointly_retrievable(paths in static_paths()) {
        let mut tree = Tree::new();
        let mut expected = HashMap::new();
        for (i, path) in paths.iter().enumerate() {
            tree.add(path, i);
            expected.insert(path.clone(), i);
        }

        prop_assert_eq!(tree.len(), expected.len());
        for (path, value) in &expected {
            let found = tree.find(path).expect("registered path must match");
            prop_assert_eq!(found.value, value);
            prop_assert!(found.captures.is_empty());
        }
    }

    /// Matching is a read-only operation: repeating a lookup returns the
    /// same result.
    #[test]
    fn lookup_twice_is_lookup_once(paths in static_paths(), probe in "/[a-z/]{0,16}") {
        let mut tree = Tree::new();
        for (i, path) in paths.iter().enumerate() {
            tree.add(path, i);
        }

        let first = tree.find(&probe).map(|f| (*f.value, f.captures));
        let second = tree.find(&probe).map(|f| (*f.value, f.captures));
        prop_assert_eq!(first, second);
    }

    /// The last registration for an identical path wins.
    #[test]
    fn reinsertion_replaces(path in "/[a-z]{1,12}") {
        let mut tree = Tree::new();
        tree.add(&path, 0);
        tree.add(&path, 1);

        prop_assert_eq!(tree.len(), 1);
        prop_assert_eq!(*tree.find(&path).unwrap().value, 1);
    }
}
