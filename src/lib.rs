//! SLUB-style object allocator.
//!
//! A fast, low-fragmentation allocator for small fixed-size objects, modeled
//! on the Linux kernel's slab allocator family (Bonwick, USENIX 1994).
//!
//! # Overview
//!
//! Small requests (`<= 2048` bytes) are carved out of page-aligned "slabs"
//! managed by [`cache::SlubCache`], one cache per size class. Each cache keeps
//! three lists of slabs (empty, partial, full) and serves allocations from
//! the most recently touched partial (or empty) slab for cache-line locality.
//! Larger requests bypass the slab machinery entirely and go straight to the
//! page provider via [`large`], with a small header prepended so `free` can
//! recover the allocation size without being told.
//!
//! [`dispatcher::SlubAllocator`] ties size classes and the large path
//! together behind one untyped `alloc`/`free` surface. [`typed::TypedCache`]
//! offers a single-size-class allocator specialized for one Rust type `T`.
//!
//! # Example
//!
//! ```
//! use slub_core::dispatcher::SlubAllocator;
//! use slub_core::provider::BuddyPageProvider;
//!
//! let mut provider = BuddyPageProvider::new(64); // 64 pages of backing arena
//! let mut alloc = SlubAllocator::new();
//!
//! let p = alloc.alloc(&mut provider, 48).expect("alloc failed");
//! unsafe { alloc.free(&mut provider, p) };
//! ```
//!
//! # Non-goals
//!
//! Thread safety, NUMA awareness, per-CPU caches, and reclamation of empty
//! slabs back to the page provider are explicitly out of scope. The baseline
//! is single-threaded and retains empty slabs indefinitely.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod align;
pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod large;
pub mod list;
pub mod provider;
pub mod slab;
pub mod typed;

pub use cache::SlubCache;
pub use dispatcher::SlubAllocator;
pub use error::SlubError;
pub use provider::PageProvider;
pub use typed::TypedCache;

/// Page size assumed throughout the allocator (4 KiB).
pub const PAGE_SIZE: usize = 4096;

/// Pages carved into a single slab. The baseline never spans a slab across
/// more than one page.
pub const PAGES_PER_SLAB: usize = 1;

/// Bytes in one slab; `base` of every slab is congruent to 0 modulo this.
pub const SLAB_BYTES: usize = PAGE_SIZE * PAGES_PER_SLAB;

/// User-alignment floor guaranteed by the large-object path.
pub const LARGE_ALIGN: usize = 16;

/// Requests larger than this many bytes take the large-object path.
pub const MAX_SMALL_SIZE: usize = 2048;

/// Number of small-object size classes (8, 16, 32, ..., 2048).
pub const NUM_SIZE_CLASSES: usize = 9;
