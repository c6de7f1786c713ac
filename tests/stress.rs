//! A large biased random mix of alloc/free on one cache, checking liveness
//! distinctness, no neighbor corruption, and a full drain back to all-empty.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use slub_core::cache::SlubCache;
use slub_core::provider::BuddyPageProvider;

const OPS: usize = 50_000;
const OBJ_SIZE: usize = 64;
const OBJ_ALIGN: usize = 8;

#[test]
fn stress_mix_alloc_free_64_byte_cache() {
    let _ = env_logger::try_init();
    let mut cache = SlubCache::new(OBJ_SIZE, OBJ_ALIGN, 1).unwrap();
    // Generous backing store: worst case every op is an alloc before any
    // free, each needing a fresh page.
    let mut provider = BuddyPageProvider::new(4096);
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    let mut live: Vec<std::ptr::NonNull<u8>> = Vec::new();
    let mut live_addrs: HashSet<usize> = HashSet::new();

    for i in 0..OPS {
        // Bias 5/11 toward alloc.
        let do_alloc = live.is_empty() || rng.gen_range(0..11) < 5;

        if do_alloc {
            let p = cache.alloc(&mut provider).expect("allocator is not expected to OOM here");
            let addr = p.as_ptr() as usize;
            assert!(
                live_addrs.insert(addr),
                "op {i}: alloc returned an address already live: {addr:#x}"
            );
            // Tag the slot so a later read can detect neighbor corruption.
            unsafe {
                core::ptr::write_bytes(p.as_ptr(), (addr & 0xff) as u8, OBJ_SIZE);
            }
            live.push(p);
        } else {
            let idx = rng.gen_range(0..live.len());
            let p = live.swap_remove(idx);
            let addr = p.as_ptr() as usize;
            // Confirm our own tag is still intact before freeing (nothing
            // else could have written through this pointer).
            let tag = unsafe { core::slice::from_raw_parts(p.as_ptr(), OBJ_SIZE) };
            assert!(
                tag.iter().all(|&b| b == (addr & 0xff) as u8),
                "op {i}: slot at {addr:#x} was corrupted before free"
            );
            live_addrs.remove(&addr);
            unsafe { cache.free(p) };
        }
    }

    for p in live.drain(..) {
        unsafe { cache.free(p) };
    }

    let stats = cache.stats();
    assert_eq!(stats.objects_inuse, 0);
    assert_eq!(stats.partial_slabs, 0);
    assert_eq!(stats.full_slabs, 0, "every slab must drain back to Empty");
}
