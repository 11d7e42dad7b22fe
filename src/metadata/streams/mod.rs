//! Owned, append-only metadata heaps.
//!
//! The in-memory storage engine keeps one heap of each kind per image. Heap entries are never
//! removed or rewritten, so offsets handed out by [`StringHeap::add`], [`BlobHeap::add`] and
//! [`GuidHeap::add`] stay valid for the lifetime of the heap.

mod blob;
mod guid;
mod strings;

pub use blob::BlobHeap;
pub use guid::GuidHeap;
pub use strings::StringHeap;
