use std::collections::HashSet;

use memtrack::{AllocSite, TrackError, TrackedVec, Tracker};
use proptest::collection::vec;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Register(u16),
    Unregister(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u16..512).prop_map(Op::Register),
        (1u16..512).prop_map(Op::Unregister),
    ]
}

fn as_addr(key: u16) -> *mut u8 {
    (0x1000 + key as usize * 8) as *mut u8
}

proptest! {
    // The live set equals registered minus unregistered, independent of
    // interleaving.
    #[test]
    #[cfg_attr(feature = "track-off", ignore)]
    fn prop_live_set_matches_model(ops in vec(op_strategy(), 1..128)) {
        let tracker = Tracker::new();
        let mut model: HashSet<usize> = HashSet::new();

        for op in ops {
            match op {
                Op::Register(key) => {
                    let addr = as_addr(key) as usize;
                    if model.insert(addr) {
                        tracker.register(as_addr(key), AllocSite::new("p.c", key as u32)).unwrap();
                    }
                }
                Op::Unregister(key) => {
                    let addr = as_addr(key) as usize;
                    if model.remove(&addr) {
                        tracker.unregister(as_addr(key)).unwrap();
                    } else {
                        prop_assert_eq!(
                            tracker.unregister(as_addr(key)),
                            Err(TrackError::AddressNotFound(addr))
                        );
                    }
                }
            }
        }

        let live: HashSet<usize> =
            tracker.live().unwrap().into_iter().map(|(addr, _)| addr).collect();
        prop_assert_eq!(live, model);
    }

    #[test]
    fn prop_push_n_has_len_n_and_bounded_capacity(n in 0usize..2048) {
        let mut values = TrackedVec::new();
        for v in 0..n {
            values.push(v);
        }
        prop_assert_eq!(values.len(), n);
        prop_assert!(values.capacity() >= n.max(1));
        prop_assert!(values.capacity() <= (2 * n).max(1));
    }

    // Insert-then-remove at the same index restores size and contents.
    #[test]
    fn prop_insert_remove_roundtrip(
        base in vec(any::<i32>(), 0..64),
        elem in any::<i32>(),
        index_seed in any::<prop::sample::Index>(),
    ) {
        let mut values = TrackedVec::new();
        for &v in &base {
            values.push(v);
        }
        let index = index_seed.index(base.len() + 1);

        values.insert(index, elem);
        prop_assert_eq!(values.len(), base.len() + 1);
        prop_assert_eq!(values.get(index), Some(&elem));

        prop_assert_eq!(values.remove(index), Some(elem));
        prop_assert_eq!(values.as_slice(), base.as_slice());
    }

    #[test]
    fn prop_find_agrees_with_linear_scan(
        values_in in vec(0u8..8, 0..64),
        needle in 0u8..8,
    ) {
        let mut values = TrackedVec::new();
        for &v in &values_in {
            values.push(v);
        }
        prop_assert_eq!(
            values.find(&needle),
            values_in.iter().position(|&v| v == needle)
        );
    }

    #[test]
    fn prop_capacity_invariants_hold_under_mixed_ops(
        ops in vec((any::<bool>(), any::<prop::sample::Index>()), 1..256),
    ) {
        let mut values = TrackedVec::new();
        for (push, index_seed) in ops {
            if push {
                values.push(0u64);
            } else if !values.is_empty() {
                let index = index_seed.index(values.len());
                values.remove(index);
            }
            prop_assert!(values.capacity() >= 1);
            prop_assert!(values.capacity() >= values.len());
        }
    }
}
