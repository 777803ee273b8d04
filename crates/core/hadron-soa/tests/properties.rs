#![allow(missing_docs)]

use hadron_soa::{Soa, SoaArray, SoaError, SoaSlice};
use proptest::prelude::*;

const CAP: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Soa)]
struct Item {
    id: u32,
    tag: u8,
    score: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Soa)]
enum Cell {
    Int(i64),
    Flag(bool),
    Pair { a: u16, b: u16 },
    Empty,
}

fn arb_item() -> impl Strategy<Value = Item> {
    (any::<u32>(), any::<u8>(), any::<i64>()).prop_map(|(id, tag, score)| Item { id, tag, score })
}

fn arb_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        any::<i64>().prop_map(Cell::Int),
        any::<bool>().prop_map(Cell::Flag),
        (any::<u16>(), any::<u16>()).prop_map(|(a, b)| Cell::Pair { a, b }),
        Just(Cell::Empty),
    ]
}

fn arb_items(max: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_item(), 0..=max)
}

fn collect<T: hadron_soa::SoaElement, const N: usize>(soa: &SoaArray<T, N>) -> Vec<T> {
    soa.iter().collect()
}

/// Every column span has exactly `len` entries.
fn spans_match_len(soa: &SoaArray<Item, CAP>) -> bool {
    let items = soa.items();
    items.id.len() == soa.len() && items.tag.len() == soa.len() && items.score.len() == soa.len()
}

proptest! {
    #[test]
    fn from_slice_round_trips(records in arb_items(CAP)) {
        let soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        prop_assert!(spans_match_len(&soa));
        let mut out = vec![Item { id: 0, tag: 0, score: 0 }; records.len()];
        soa.copy_to_slice(&mut out);
        prop_assert_eq!(out, records);
    }

    #[test]
    fn enum_round_trips(cells in prop::collection::vec(arb_cell(), 0..=CAP)) {
        let soa = SoaArray::<Cell, CAP>::from_slice(&cells).unwrap();
        prop_assert_eq!(collect(&soa), cells);
    }

    #[test]
    fn from_soa_reproduces_elements(records in arb_items(CAP)) {
        let source = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        let copy = SoaArray::<Item, 64>::from_soa(source.as_slice()).unwrap();
        prop_assert_eq!(copy.len(), source.len());
        prop_assert_eq!(copy, source);
        prop_assert_eq!(collect(&copy), records);
    }

    #[test]
    fn append_then_pop_is_lifo(records in arb_items(CAP)) {
        let mut soa = SoaArray::<Item, CAP>::new();
        for record in &records {
            soa.append(*record).unwrap();
            prop_assert!(spans_match_len(&soa));
        }
        for record in records.iter().rev() {
            prop_assert_eq!(soa.pop(), *record);
        }
        prop_assert!(soa.try_pop().is_none());
    }

    #[test]
    fn ordered_remove_matches_vec(records in arb_items(CAP), pick in any::<prop::sample::Index>()) {
        prop_assume!(!records.is_empty());
        let index = pick.index(records.len());
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        let mut model = records.clone();
        prop_assert_eq!(soa.ordered_remove(index), model.remove(index));
        prop_assert_eq!(collect(&soa), model);
    }

    #[test]
    fn swap_remove_matches_vec(records in arb_items(CAP), pick in any::<prop::sample::Index>()) {
        prop_assume!(!records.is_empty());
        let index = pick.index(records.len());
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        let mut model = records.clone();
        prop_assert_eq!(soa.swap_remove(index), model.swap_remove(index));
        prop_assert_eq!(collect(&soa), model);
    }

    #[test]
    fn insert_then_remove_restores(
        records in arb_items(CAP - 1),
        extra in arb_item(),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(records.len() + 1);
        let original = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        let mut soa = original;
        soa.insert(index, extra).unwrap();
        prop_assert_eq!(soa.get(index), extra);
        prop_assert_eq!(soa.ordered_remove(index), extra);
        prop_assert_eq!(soa, original);
    }

    #[test]
    fn insert_multi_matches_vec_splice(
        head in arb_items(16),
        tail in arb_items(16),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(head.len() + 1);
        let mut soa = SoaArray::<Item, CAP>::from_slice(&head).unwrap();
        let other = SoaArray::<Item, 16>::from_slice(&tail).unwrap();
        soa.insert_multi(index, &other).unwrap();

        let mut model = head[..index].to_vec();
        model.extend_from_slice(&tail);
        model.extend_from_slice(&head[index..]);
        prop_assert_eq!(collect(&soa), model);
    }

    #[test]
    fn capacity_failures_leave_container_unchanged(
        records in arb_items(CAP),
        extra in arb_items(CAP),
    ) {
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        let before = soa;
        let fits = records.len() + extra.len() <= CAP;
        let other = SoaArray::<Item, CAP>::from_slice(&extra).unwrap();

        match soa.append_multi(&other) {
            Ok(()) => prop_assert!(fits),
            Err(SoaError::CapacityExceeded) => {
                prop_assert!(!fits);
                prop_assert_eq!(soa, before);
            }
        }
        prop_assert_eq!(soa.ensure_unused_capacity(CAP - soa.len()), Ok(()));
        prop_assert_eq!(
            soa.ensure_unused_capacity(CAP - soa.len() + 1),
            Err(SoaError::CapacityExceeded)
        );
    }

    #[test]
    fn stable_sort_matches_vec(records in arb_items(CAP)) {
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        soa.sort_by(|view: &SoaSlice<'_, Item>, a, b| view.tag[a].cmp(&view.tag[b]));

        let mut model = records.clone();
        model.sort_by_key(|item| item.tag);
        prop_assert_eq!(collect(&soa), model);
    }

    #[test]
    fn unstable_sort_is_a_sorted_permutation(records in arb_items(CAP)) {
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        soa.sort_unstable_by(|view, a, b| view.id[a].cmp(&view.id[b]));

        prop_assert!(soa.items().id.windows(2).all(|w| w[0] <= w[1]));
        let mut sorted = collect(&soa);
        let mut model = records.clone();
        sorted.sort_by_key(|item| (item.id, item.tag, item.score));
        model.sort_by_key(|item| (item.id, item.tag, item.score));
        prop_assert_eq!(sorted, model);
    }

    #[test]
    fn span_sort_touches_only_span(
        records in arb_items(CAP),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let x = a.index(records.len() + 1);
        let y = b.index(records.len() + 1);
        let span = x.min(y)..x.max(y);
        let mut soa = SoaArray::<Item, CAP>::from_slice(&records).unwrap();
        soa.sort_span_by(span.clone(), |view, i, j| view.score[i].cmp(&view.score[j]));

        let mut model = records.clone();
        model[span].sort_by_key(|item| item.score);
        prop_assert_eq!(collect(&soa), model);
    }
}
