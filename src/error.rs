//! Allocator error types.
//!
//! Most failure modes in this crate are not recoverable errors in the usual
//! sense: out-of-memory surfaces as `None`, a null `free` is a silent no-op,
//! and an invariant violation is a contract breach reported via `assert!`.
//! `SlubError` exists for the smaller set of call sites where construction
//! itself can be rejected without touching allocator state, building a
//! cache or a typed allocator from a bad `(size, align)` pair.

use core::fmt;

/// Errors returned by cache and allocator construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlubError {
    /// `pages_per_slab * PAGE_SIZE` was not a power of two.
    SlabBytesNotPowerOfTwo,
    /// The requested object alignment cannot be satisfied within one slab
    /// (larger than the slab itself).
    AlignmentExceedsSlab,
    /// A zero-sized type was passed to the typed allocator.
    ZeroSizedType,
}

impl fmt::Display for SlubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlubError::SlabBytesNotPowerOfTwo => {
                write!(f, "pages_per_slab * PAGE_SIZE is not a power of two")
            }
            SlubError::AlignmentExceedsSlab => {
                write!(f, "object alignment exceeds the slab size")
            }
            SlubError::ZeroSizedType => write!(f, "cannot allocate a zero-sized type"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SlubError {}
