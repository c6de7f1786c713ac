//! `SlubCache`: the per-(size, align) class owner of all slabs for that
//! class, carrying them through empty → partial → full.

use core::ptr::NonNull;

use crate::align::{align_up, next_power_of_two};
use crate::error::SlubError;
use crate::list::SlabList;
use crate::provider::PageProvider;
use crate::slab::{CacheId, SlabHeader, SlabState};

/// One size class's allocator: three slab lists plus the immutable
/// parameters that produced them.
///
/// Construction rounds `obj_align` up to at least pointer alignment (and to
/// a power of two); `obj_size` is rounded up to at least pointer size, then
/// to a multiple of `obj_align`.
pub struct SlubCache {
    obj_size: usize,
    obj_align: usize,
    slab_bytes: usize,
    slots_per_slab: usize,
    empty: SlabList,
    partial: SlabList,
    full: SlabList,
    empty_count: usize,
    partial_count: usize,
    full_count: usize,
    objects_inuse: usize,
}

impl SlubCache {
    /// Build a cache for one size class. `pages_per_slab * PAGE_SIZE` must be
    /// a power of two.
    pub fn new(
        raw_obj_size: usize,
        raw_obj_align: usize,
        pages_per_slab: usize,
    ) -> Result<Self, SlubError> {
        let ptr_align = core::mem::align_of::<usize>();
        let ptr_size = core::mem::size_of::<usize>();

        let obj_align = next_power_of_two(raw_obj_align.max(ptr_align));
        let obj_size = align_up(raw_obj_size.max(ptr_size), obj_align);
        let slab_bytes = pages_per_slab * crate::PAGE_SIZE;

        if !slab_bytes.is_power_of_two() {
            return Err(SlubError::SlabBytesNotPowerOfTwo);
        }
        if SlabHeader::slots_offset(obj_align) >= slab_bytes {
            return Err(SlubError::AlignmentExceedsSlab);
        }

        let slots_per_slab = SlabHeader::slots_that_fit(slab_bytes, obj_size, obj_align);
        if slots_per_slab == 0 {
            return Err(SlubError::AlignmentExceedsSlab);
        }

        Ok(Self {
            obj_size,
            obj_align,
            slab_bytes,
            slots_per_slab,
            empty: SlabList::new(),
            partial: SlabList::new(),
            full: SlabList::new(),
            empty_count: 0,
            partial_count: 0,
            full_count: 0,
            objects_inuse: 0,
        })
    }

    #[inline]
    pub fn obj_size(&self) -> usize {
        self.obj_size
    }

    #[inline]
    pub fn obj_align(&self) -> usize {
        self.obj_align
    }

    #[inline]
    pub fn slab_bytes(&self) -> usize {
        self.slab_bytes
    }

    fn identity(&self) -> CacheId {
        CacheId {
            obj_size: self.obj_size,
            obj_align: self.obj_align,
            slab_bytes: self.slab_bytes,
        }
    }

    /// Allocate one object, growing the cache via `provider` if both the
    /// partial and empty lists are exhausted.
    ///
    /// Priority: last of `partial`, else last of `empty` (promoted to
    /// `partial`), else a fresh slab from `provider` (inserted directly into
    /// `partial`).
    pub fn alloc<P: PageProvider>(&mut self, provider: &mut P) -> Option<NonNull<u8>> {
        let slab = if let Some(slab) = self.partial.back() {
            slab
        } else if let Some(slab) = self.empty.pop_back() {
            self.empty_count -= 1;
            self.partial.push_back(slab);
            self.partial_count += 1;
            slab
        } else {
            let slab = self.grow(provider)?;
            self.partial.push_back(slab);
            self.partial_count += 1;
            slab
        };

        // SAFETY: `slab` is a live header we (or `grow`) just linked into
        // `partial`; nothing else holds a conflicting reference to it.
        let header = unsafe { &mut *slab.as_ptr() };
        debug_assert_eq!(header.owner(), self.identity());
        let ptr = header
            .pop_free()
            .expect("cache invariant violated: slab on partial/empty list had no free slots");

        if header.inuse() == header.total() {
            // SAFETY: `slab` is currently linked into `partial` (we just put
            // it there, or it was already the back of `partial`).
            unsafe { self.partial.erase(slab) };
            self.partial_count -= 1;
            header.set_state(SlabState::Full);
            self.full.push_back(slab);
            self.full_count += 1;
            log::trace!("slab {:p} is now full", slab.as_ptr());
        } else {
            header.set_state(SlabState::Partial);
        }

        self.objects_inuse += 1;
        Some(ptr)
    }

    /// Return an object to the cache. `ptr` must have come from a prior
    /// `alloc` on this exact cache.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live, not-already-freed allocation from this cache.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let slab = unsafe { SlabHeader::owning_slab(ptr, self.slab_bytes) };
        let header = unsafe { &mut *slab.as_ptr() };

        debug_assert_eq!(
            header.owner(),
            self.identity(),
            "free() called on a pointer not owned by this cache"
        );

        let was_full = header.state() == SlabState::Full;
        unsafe { header.push_free(ptr) };

        if header.inuse() == 0 {
            let list = if was_full {
                &mut self.full
            } else {
                &mut self.partial
            };
            // SAFETY: `slab` is linked into exactly the list it was last
            // transitioned into, matching `header.state()`.
            unsafe { list.erase(slab) };
            if was_full {
                self.full_count -= 1;
            } else {
                self.partial_count -= 1;
            }
            header.set_state(SlabState::Empty);
            self.empty.push_back(slab);
            self.empty_count += 1;
        } else if was_full {
            unsafe { self.full.erase(slab) };
            self.full_count -= 1;
            header.set_state(SlabState::Partial);
            self.partial.push_back(slab);
            self.partial_count += 1;
        }
        // Otherwise: stays in partial, still partial.

        self.objects_inuse -= 1;
    }

    fn grow<P: PageProvider>(&mut self, provider: &mut P) -> Option<NonNull<SlabHeader>> {
        let pages = self.slab_bytes / crate::PAGE_SIZE;
        let base = provider.alloc_pages(pages)?;
        let header = unsafe {
            SlabHeader::init(
                base,
                self.identity(),
                self.obj_size,
                self.obj_align,
                self.slots_per_slab,
            )
        };
        log::debug!(
            "cache(obj_size={}): grew a new slab at {:p}",
            self.obj_size,
            base.as_ptr()
        );
        Some(header)
    }

    /// Snapshot of this cache's slab-list occupancy.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            obj_size: self.obj_size,
            obj_align: self.obj_align,
            slab_bytes: self.slab_bytes,
            slots_per_slab: self.slots_per_slab,
            empty_slabs: self.empty_count,
            partial_slabs: self.partial_count,
            full_slabs: self.full_count,
            objects_inuse: self.objects_inuse,
        }
    }
}

/// Point-in-time statistics for one size class.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub obj_size: usize,
    pub obj_align: usize,
    pub slab_bytes: usize,
    pub slots_per_slab: usize,
    pub empty_slabs: usize,
    pub partial_slabs: usize,
    pub full_slabs: usize,
    pub objects_inuse: usize,
}

impl CacheStats {
    pub fn total_slabs(&self) -> usize {
        self.empty_slabs + self.partial_slabs + self.full_slabs
    }

    pub fn objects_total(&self) -> usize {
        self.total_slabs() * self.slots_per_slab
    }

    pub fn memory_usage_bytes(&self) -> usize {
        self.total_slabs() * self.slab_bytes
    }
}
