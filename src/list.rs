//! The intrusive list used for a cache's three slab lists (empty, partial,
//! full).
//!
//! `empty`, `back`, `push_back`, and `erase(node)` all run in O(1) and touch
//! no allocator, realized on top of [`intrusive_collections::LinkedList`]
//! rather than hand-rolled prev/next pointers. `SlabHeader` embeds a
//! [`LinkedListLink`]; [`SlabAdapter`] is the generated adapter. Nodes are
//! referenced through [`UnsafeRef`], the non-owning smart pointer
//! `intrusive_collections` provides for exactly this situation: the list
//! never owns the memory its nodes live in (that memory is a slab, owned by
//! whichever `PageProvider` handed it out).
//!
//! Erasing a node that is not currently linked into `self` is undefined
//! behavior. Callers must uphold the single-list-membership invariant
//! themselves (`SlubCache` does, via the `SlabState` tag).

use core::ptr::NonNull;
use intrusive_collections::{intrusive_adapter, LinkedList, LinkedListLink, UnsafeRef};

use crate::slab::SlabHeader;

intrusive_adapter!(pub SlabAdapter = UnsafeRef<SlabHeader>: SlabHeader { link: LinkedListLink });

/// One of a cache's three slab lists.
pub struct SlabList {
    inner: LinkedList<SlabAdapter>,
}

impl SlabList {
    pub const fn new() -> Self {
        Self {
            inner: LinkedList::new(SlabAdapter::NEW),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// O(1) access to the most recently inserted node, without removing it.
    #[inline]
    pub fn back(&self) -> Option<NonNull<SlabHeader>> {
        self.inner.back().get().map(NonNull::from)
    }

    /// Insert `node` at the back of the list. `node` must not already be
    /// linked into any list.
    #[inline]
    pub fn push_back(&mut self, node: NonNull<SlabHeader>) {
        // SAFETY: caller guarantees `node` points to a live `SlabHeader` not
        // currently linked into any list (the single-list-membership
        // invariant `SlubCache` upholds via `SlabState`).
        unsafe { self.inner.push_back(UnsafeRef::from_raw(node.as_ptr())) };
    }

    /// Remove and return the most recently inserted node, if any.
    #[inline]
    pub fn pop_back(&mut self) -> Option<NonNull<SlabHeader>> {
        self.inner
            .pop_back()
            .map(|r| unsafe { NonNull::new_unchecked(UnsafeRef::into_raw(r)) })
    }

    /// O(1) removal of a specific node, given a direct handle to it.
    ///
    /// # Safety
    ///
    /// `node` must currently be linked into `self` (not some other list, and
    /// not unlinked). Violating this is undefined behavior.
    #[inline]
    pub unsafe fn erase(&mut self, node: NonNull<SlabHeader>) {
        let mut cursor = unsafe { self.inner.cursor_mut_from_ptr(node.as_ptr()) };
        cursor.remove();
    }
}

impl Default for SlabList {
    fn default() -> Self {
        Self::new()
    }
}
