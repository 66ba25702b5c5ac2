//! Property tests for port set notation.

use std::collections::BTreeSet;

use proptest::prelude::*;

use kvdeploy::domain::value_objects::PortSet;

fn ports() -> impl Strategy<Value = BTreeSet<u16>> {
    // Clustered values so that ranges actually form
    prop_oneof![
        proptest::collection::btree_set(18000u16..18064, 0..40),
        proptest::collection::btree_set(any::<u16>(), 0..16),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the compact notation parses back to the same set.
    #[test]
    fn property_format_parses_back(set in ports()) {
        let ports: PortSet = set.iter().copied().collect();
        let parsed = PortSet::parse(&ports.format()).unwrap();
        prop_assert_eq!(parsed.to_vec(), set.into_iter().collect::<Vec<_>>());
    }

    /// PROPERTY: no two adjacent runs in the notation could be merged.
    #[test]
    fn property_format_is_maximally_compact(set in ports()) {
        let ports: PortSet = set.iter().copied().collect();
        let runs: Vec<(u32, u32)> = ports
            .format()
            .split(',')
            .filter(|r| !r.is_empty())
            .map(|run| match run.split_once('-') {
                Some((a, b)) => (a.parse().unwrap(), b.parse().unwrap()),
                None => {
                    let p: u32 = run.parse().unwrap();
                    (p, p)
                }
            })
            .collect();
        for pair in runs.windows(2) {
            prop_assert!(pair[0].1 + 1 < pair[1].0, "mergeable runs in {}", ports.format());
        }
    }

    /// PROPERTY: swapping roles keeps every port and overlaps nothing.
    #[test]
    fn property_difference_and_intersection_partition(a in ports(), b in ports()) {
        let a: PortSet = a.into_iter().collect();
        let b: PortSet = b.into_iter().collect();
        let only_a = a.difference(&b);
        let both = a.intersection(&b);
        prop_assert!(only_a.intersection(&b).is_empty());
        prop_assert_eq!(only_a.union(&both), a);
    }

    /// PROPERTY: parsing never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(s in ".{0,64}") {
        let _ = PortSet::parse(&s);
    }
}
