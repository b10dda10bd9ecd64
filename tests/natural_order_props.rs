//! Property tests for natural-order string comparison.

use comic_archive::natural_order::{compare, sort_key};
use proptest::prelude::*;

fn arb_mixed_filename() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..1000).prop_map(|n| format!("page{n:03}.jpg")),
        (1u32..100, 1u32..100).prop_map(|(v, c)| format!("vol{v:02}_ch{c:02}.zip")),
        "[a-zA-Z]{1,10}".prop_map(|s| s),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Comparing a string to itself is always `Equal`.
    #[test]
    fn reflexive(s in arb_mixed_filename()) {
        prop_assert_eq!(compare(&s, &s), std::cmp::Ordering::Equal);
    }

    /// Swapping operands reverses a non-equal result.
    #[test]
    fn antisymmetric(a in arb_mixed_filename(), b in arb_mixed_filename()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    /// `sort_key` agrees with `compare` as a total order: sorting by one
    /// key produces the same sequence as sorting with the pairwise
    /// comparator.
    #[test]
    fn sort_key_agrees_with_compare(mut items in prop::collection::vec(arb_mixed_filename(), 0..30)) {
        let mut by_compare = items.clone();
        by_compare.sort_by(|a, b| compare(a, b));

        items.sort_by_key(|s| sort_key(s));

        prop_assert_eq!(by_compare, items);
    }

    /// Zero-padding a numeric run never changes its relative order against
    /// the un-padded value.
    #[test]
    fn leading_zeros_do_not_change_numeric_order(n in 1u32..100000) {
        let padded = format!("{n:010}.jpg");
        let plain = format!("{n}.jpg");
        prop_assert_eq!(compare(&padded, &plain), std::cmp::Ordering::Less);
    }
}
