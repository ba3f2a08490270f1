use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};

fn validate_index<A: Address>(index: &PrefixTagIndex<A>) {
    let mut seen = vec![false; index.nodes.len()];
    let mut stack: Vec<(Ref, u8)> = vec![(Ref::ROOT, 0)];
    let mut tagged = 0usize;
    let mut entries = 0usize;

    while let Some((r, depth)) = stack.pop() {
        assert!(!r.is_null(), "NULL reference inside trie");
        assert!(depth <= A::BITS, "node deeper than address width");
        assert!(!seen[r.idx()], "node reachable twice");
        seen[r.idx()] = true;

        let node = &index.nodes[r.idx()];
        if node.has_tags() {
            let set = &index.tag_sets[node.tags as usize];
            assert!(!set.is_empty(), "registered prefix with no tags");
            assert!(
                set.windows(2).all(|w| w[0] < w[1]),
                "tag set must be sorted and unique"
            );
            assert!(set.iter().all(|&id| (id as usize) < index.tags.len()));
            tagged += 1;
            entries += set.len();
        }
        for child in node.children {
            if !child.is_null() {
                stack.push((child, depth + 1));
            }
        }
    }

    assert!(seen.iter().all(|&s| s), "unreachable node in arena");
    assert_eq!(tagged, index.len(), "tagged node count must match len");
    assert_eq!(entries, index.entry_count());
    assert!(
        index.tags.windows(2).all(|w| w[0] < w[1]),
        "tag table must be sorted and unique"
    );
}

/// One `(prefix, tag)` entry over 8-bit addresses, small enough to check every
/// address exhaustively.
#[derive(Clone, Debug, Arbitrary)]
struct Entry {
    addr: u8,
    #[proptest(strategy = "0u8..=8")]
    len: u8,
    #[proptest(regex = "[a-eZ]{1,2}")]
    tag: String,
}

impl Entry {
    fn prefix(&self) -> Prefix<u8> {
        Prefix::new(self.addr, self.len).unwrap()
    }
}

fn build_u8(entries: &[Entry]) -> PrefixTagIndex<u8> {
    PrefixTagIndex::build(entries.iter().map(|e| (e.prefix(), e.tag.as_str()))).unwrap()
}

fn model_lookup(entries: &[Entry], addr: u8) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.prefix().contains(addr))
        .map(|e| e.tag.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn entries_strategy() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(any::<Entry>(), 0..=64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_lookup_matches_containment_model(entries in entries_strategy()) {
        let index = build_u8(&entries);
        validate_index(&index);

        for addr in 0..=u8::MAX {
            let got = index.lookup(addr);
            let expected = model_lookup(&entries, addr);
            prop_assert_eq!(got, expected, "address {:#x}", addr);
        }
    }

    #[test]
    fn prop_insertion_order_is_irrelevant(
        pair in entries_strategy()
            .prop_flat_map(|e| (Just(e.clone()), Just(e).prop_shuffle()))
    ) {
        let (entries, shuffled) = pair;
        let a = build_u8(&entries);
        let b = build_u8(&shuffled);
        validate_index(&b);
        for addr in 0..=u8::MAX {
            prop_assert_eq!(a.lookup(addr), b.lookup(addr));
        }
        prop_assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_duplicates_do_not_change_results(entries in entries_strategy()) {
        let once = build_u8(&entries);
        let doubled: Vec<Entry> = entries.iter().chain(entries.iter()).cloned().collect();
        let twice = build_u8(&doubled);
        validate_index(&twice);
        prop_assert_eq!(once.entry_count(), twice.entry_count());
        prop_assert_eq!(once.len(), twice.len());
        for addr in 0..=u8::MAX {
            prop_assert_eq!(once.lookup(addr), twice.lookup(addr));
        }
    }

    #[test]
    fn prop_iter_and_matches_agree_with_entries(entries in entries_strategy()) {
        let index = build_u8(&entries);

        let mut model: BTreeMap<Prefix<u8>, BTreeSet<String>> = BTreeMap::new();
        for e in &entries {
            model.entry(e.prefix()).or_default().insert(e.tag.clone());
        }
        let listed: BTreeMap<Prefix<u8>, BTreeSet<String>> = index
            .iter()
            .map(|(p, tags)| (p, tags.into_iter().map(str::to_owned).collect()))
            .collect();
        prop_assert_eq!(&listed, &model);

        for addr in 0..=u8::MAX {
            let matches = index.matches(addr);
            prop_assert!(matches.windows(2).all(|w| w[0].prefix.len() < w[1].prefix.len()));
            prop_assert!(matches.iter().all(|m| m.prefix.contains(addr)));
            let expected: Vec<Prefix<u8>> = model
                .keys()
                .filter(|p| p.contains(addr))
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let mut got: Vec<Prefix<u8>> = matches.iter().map(|m| m.prefix).collect();
            got.sort();
            prop_assert_eq!(got, expected);
            prop_assert_eq!(
                index.longest_match(addr).map(|m| m.prefix),
                matches.last().map(|m| m.prefix)
            );
        }
    }

    #[test]
    fn prop_u32_lookup_matches_model(
        raw in prop::collection::vec((any::<u32>(), 0u8..=32, "[a-z]{1,3}"), 0..=200),
        probes in prop::collection::vec(any::<u32>(), 0..=64),
    ) {
        let index = PrefixTagIndex::build(
            raw.iter().map(|(a, l, t)| (Prefix::new(*a, *l).unwrap(), t.as_str())),
        ).unwrap();
        validate_index(&index);

        // Probe each entry's own address as well, so there are always hits.
        for addr in probes.iter().copied().chain(raw.iter().map(|(a, _, _)| *a)) {
            let expected: Vec<&str> = raw
                .iter()
                .filter(|(a, l, _)| Prefix::new(*a, *l).unwrap().contains(addr))
                .map(|(_, _, t)| t.as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            prop_assert_eq!(index.lookup(addr), expected);
        }
    }
}
