//! `SlubAllocator`: the untyped, size-class dispatcher. Routes arbitrary
//! request sizes to the right [`SlubCache`] or to the large-object path.

use core::ptr::NonNull;

use crate::cache::{CacheStats, SlubCache};
use crate::large::BigHeader;
use crate::provider::PageProvider;
use crate::{MAX_SMALL_SIZE, NUM_SIZE_CLASSES, PAGES_PER_SLAB};

/// The size-class boundaries: 8, 16, 32, ..., 2048.
const SIZE_CLASSES: [usize; NUM_SIZE_CLASSES] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048];

/// Map a request size to a size-class index: `n = max(n, 8)`, then the
/// smallest class `>= n`. Returns `None` if `n` exceeds `MAX_SMALL_SIZE`
/// (the large path must be used instead).
fn class_for(n: usize) -> Option<usize> {
    let n = n.max(8);
    if n > MAX_SMALL_SIZE {
        return None;
    }
    SIZE_CLASSES.iter().position(|&class| class >= n)
}

/// The top-level untyped allocator: nine small-object caches plus the
/// large-object path.
pub struct SlubAllocator {
    caches: [SlubCache; NUM_SIZE_CLASSES],
}

impl SlubAllocator {
    /// Build the nine size-class caches (one page per slab for each).
    pub fn new() -> Self {
        let mut classes = SIZE_CLASSES.iter();
        let caches = core::array::from_fn(|_| {
            let size = *classes.next().expect("SIZE_CLASSES has NUM_SIZE_CLASSES entries");
            SlubCache::new(size, size, PAGES_PER_SLAB)
                .expect("built-in size classes always produce a valid cache")
        });
        Self { caches }
    }

    /// Route `n` bytes to the appropriate cache, or the large-object path if
    /// `n > MAX_SMALL_SIZE`.
    pub fn alloc<P: PageProvider>(&mut self, provider: &mut P, n: usize) -> Option<NonNull<u8>> {
        match class_for(n) {
            Some(idx) => self.caches[idx].alloc(provider),
            None => BigHeader::alloc(provider, n),
        }
    }

    /// Untagged free: recovers whether `ptr` is a large or small allocation
    /// by checking the `BigHeader` magic at the fixed negative offset, then
    /// dispatches accordingly.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live, unfreed return value of `self.alloc` on this
    /// exact allocator/provider pair.
    pub unsafe fn free<P: PageProvider>(&mut self, provider: &mut P, ptr: NonNull<u8>) {
        if unsafe { BigHeader::looks_like_large(ptr) } {
            unsafe { BigHeader::free(provider, ptr) };
            return;
        }
        // Falls through to the small path on magic mismatch rather than
        // consulting a side-table of live large-object bases (see DESIGN.md).
        let idx = self.class_containing(ptr);
        unsafe { self.caches[idx].free(ptr) };
    }

    /// Size-aware free: routes directly by `size`, without reading any
    /// header. Immune to the magic-collision risk of the untagged variant.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live, unfreed return value of `self.alloc(provider,
    /// size)` on this exact allocator/provider pair.
    pub unsafe fn free_sized<P: PageProvider>(
        &mut self,
        provider: &mut P,
        ptr: NonNull<u8>,
        size: usize,
    ) {
        match class_for(size) {
            Some(idx) => unsafe { self.caches[idx].free(ptr) },
            None => unsafe { BigHeader::free(provider, ptr) },
        }
    }

    /// Find which small-object cache's slab owns `ptr`, by masking it down
    /// to each candidate `slab_bytes` boundary and checking which cache's
    /// slab header reports that size class. All slabs in this allocator
    /// share the same `slab_bytes` (one page), so this reduces to reading
    /// the owning slab's header once the slab is recovered under any
    /// cache's `slab_bytes`.
    fn class_containing(&self, ptr: NonNull<u8>) -> usize {
        let slab_bytes = self.caches[0].slab_bytes();
        let base = crate::align::align_down(ptr.as_ptr() as usize, slab_bytes);
        let header = unsafe { &*(base as *const crate::slab::SlabHeader) };
        let obj_size = header.owner().obj_size;
        SIZE_CLASSES
            .iter()
            .position(|&s| s == obj_size)
            .expect("slab header carries an obj_size matching one of this allocator's classes")
    }

    /// Aggregate statistics across all nine caches.
    pub fn stats(&self) -> AllocatorStats {
        let mut agg = AllocatorStats::default();
        for cache in &self.caches {
            let s = cache.stats();
            agg.memory_usage_bytes += s.memory_usage_bytes();
            agg.total_slabs += s.total_slabs();
            agg.objects_total += s.objects_total();
            agg.objects_inuse += s.objects_inuse;
        }
        agg
    }

    /// Per-class statistics, for finer-grained reporting.
    pub fn cache_stats(&self) -> [CacheStats; NUM_SIZE_CLASSES] {
        core::array::from_fn(|i| self.caches[i].stats())
    }
}

impl Default for SlubAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocator-wide aggregate statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorStats {
    pub memory_usage_bytes: usize,
    pub total_slabs: usize,
    pub objects_total: usize,
    pub objects_inuse: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BuddyPageProvider;

    #[test]
    fn boundary_sizes_route_correctly() {
        assert_eq!(class_for(0), Some(0));
        assert_eq!(class_for(1), Some(0));
        assert_eq!(class_for(7), Some(0));
        assert_eq!(class_for(8), Some(0));
        assert_eq!(class_for(9), Some(1));
        assert_eq!(class_for(2048), Some(8));
        assert_eq!(class_for(2049), None);
    }

    #[test]
    fn dispatcher_roundtrip_small_and_large() {
        let mut alloc = SlubAllocator::new();
        let mut provider = BuddyPageProvider::new(64);

        let sizes = [8usize, 24, 64, 1024, 2048, 4096];
        let mut ptrs = alloc::vec::Vec::new();
        for &size in &sizes {
            ptrs.push(alloc.alloc(&mut provider, size).expect("alloc failed"));
        }
        for p in ptrs {
            unsafe { alloc.free(&mut provider, p) };
        }
        let stats = alloc.stats();
        assert_eq!(stats.objects_inuse, 0);
    }

    #[test]
    fn size_aware_free_matches_untagged_free() {
        let mut alloc = SlubAllocator::new();
        let mut provider = BuddyPageProvider::new(16);
        let p = alloc.alloc(&mut provider, 100).unwrap();
        unsafe { alloc.free_sized(&mut provider, p, 100) };
        assert_eq!(alloc.stats().objects_inuse, 0);
    }
}
