//! Property-based companion to `tests/stress.rs`: instead of one fixed
//! seeded sequence, `proptest` generates alloc/free-biased operation
//! sequences and checks the same invariants hold for every one of them.

use proptest::prelude::*;
use std::collections::HashSet;

use slub_core::cache::SlubCache;
use slub_core::provider::BuddyPageProvider;

#[derive(Debug, Clone, Copy)]
enum Op {
    Alloc,
    Free,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Same 5/11 alloc bias as the hand-rolled stress test.
    prop_oneof![
        5 => Just(Op::Alloc),
        6 => Just(Op::Free),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_op_sequences_never_duplicate_a_live_address(ops in prop::collection::vec(op_strategy(), 1..2000)) {
        let _ = env_logger::try_init();
        let mut cache = SlubCache::new(32, 8, 1).unwrap();
        let mut provider = BuddyPageProvider::new(512);

        let mut live = Vec::new();
        let mut live_addrs = HashSet::new();

        for op in ops {
            match op {
                Op::Alloc => {
                    let Some(p) = cache.alloc(&mut provider) else { continue };
                    let addr = p.as_ptr() as usize;
                    prop_assert!(live_addrs.insert(addr));
                    live.push(p);
                }
                Op::Free => {
                    if let Some(p) = live.pop() {
                        live_addrs.remove(&(p.as_ptr() as usize));
                        unsafe { cache.free(p) };
                    }
                }
            }
            let stats = cache.stats();
            prop_assert_eq!(stats.objects_inuse, live.len());
        }

        for p in live.drain(..) {
            unsafe { cache.free(p) };
        }
        let stats = cache.stats();
        prop_assert_eq!(stats.objects_inuse, 0);
        prop_assert_eq!(stats.partial_slabs, 0);
        prop_assert_eq!(stats.full_slabs, 0);
    }
}
