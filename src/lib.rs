//! # rresource - Pluggable Memory Resources and an Allocator-Aware Vector
//!
//! This crate provides a **tracking memory resource** and a growable array,
//! [`PmrVec`], that takes all of its storage from whatever resource it is
//! given instead of the global allocator.
//!
//! ## Overview
//!
//! A memory resource is anything that hands out raw blocks and takes them
//! back. Containers only see the [`MemoryResource`] trait, so the strategy
//! behind it can be swapped freely:
//!
//! ```text
//!   ┌──────────────┐   ┌──────────────┐
//!   │ PmrVec<i32>  │   │ PmrVec<Point>│      containers borrow the resource
//!   └──────┬───────┘   └──────┬───────┘
//!          │ allocate         │ deallocate
//!          ▼                  ▼
//!   ┌──────────────────────────────────────┐
//!   │          TrackingResource            │
//!   │  ┌────────────────┬────────────────┐ │
//!   │  │ handle         │ size           │ │  one entry per live block
//!   │  ├────────────────┼────────────────┤ │
//!   │  │ 0x5581_2a40    │ 12             │ │
//!   │  │ 0x5581_2b10    │ 48             │ │
//!   │  └────────────────┴────────────────┘ │
//!   └──────────────────┬───────────────────┘
//!                      │ upstream
//!                      ▼
//!   ┌──────────────────────────────────────┐
//!   │     SystemResource (malloc / free)   │
//!   └──────────────────────────────────────┘
//! ```
//!
//! When a [`TrackingResource`] is dropped it frees every block still in its
//! map, so memory leaked by a forgotten container is reclaimed at the latest
//! when the resource goes away.
//!
//! ## Crate Structure
//!
//! ```text
//!   rresource
//!   ├── align      - Alignment guaranteed by the system allocator
//!   ├── block      - BlockHandle, the opaque block address
//!   ├── counting   - CountingResource, instrumentation and byte budgets
//!   ├── error      - AllocError
//!   ├── iter       - Iter / IterMut forward cursors
//!   ├── resource   - MemoryResource trait, SystemResource, default_resource
//!   ├── tracking   - TrackingResource implementation
//!   └── vec        - PmrVec implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rresource::{PmrVec, TrackingResource};
//!
//! let tracking = TrackingResource::new();
//!
//! {
//!     let mut numbers = PmrVec::new_in(&tracking);
//!     numbers.push(10).unwrap();
//!     numbers.push(20).unwrap();
//!     numbers.push(30).unwrap();
//!
//!     let all: Vec<i32> = numbers.iter().copied().collect();
//!     assert_eq!(all, [10, 20, 30]);
//!     assert_eq!(tracking.live_blocks(), 1);
//! }
//!
//! // The array gave its buffer back when it went out of scope.
//! assert_eq!(tracking.live_blocks(), 0);
//! ```
//!
//! ## Growth
//!
//! ```text
//!   push #1   cap 0 ─► 1    ┌──┐
//!   push #2   cap 1 ─► 2    ┌──┬──┐
//!   push #3   cap 2 ─► 4    ┌──┬──┬──┬──┐
//!   push #5   cap 4 ─► 8    ┌──┬──┬──┬──┬──┬──┬──┬──┐
//! ```
//!
//! Each step asks the resource for the larger block first, moves the
//! elements across, and only then returns the old block. If the resource
//! refuses, `push` returns [`AllocError::OutOfMemory`] and the array is
//! untouched.
//!
//! ## Ownership
//!
//! A [`PmrVec`] owns its buffer and borrows its resource. It cannot be
//! cloned, only moved; [`PmrVec::take`] moves the contents out and leaves an
//! empty, reusable array behind.
//!
//! ```rust,compile_fail
//! use rresource::{PmrVec, TrackingResource};
//!
//! let tracking = TrackingResource::new();
//! let numbers: PmrVec<'_, i32> = PmrVec::new_in(&tracking);
//! let copy = numbers.clone();
//! ```
//!
//! The borrow also means an array cannot outlive its resource:
//!
//! ```rust,compile_fail
//! use rresource::{PmrVec, TrackingResource};
//!
//! let numbers = {
//!     let tracking = TrackingResource::new();
//!     PmrVec::<i32>::new_in(&tracking)
//! };
//! ```
//!
//! Element types aligned beyond what the system allocator guarantees are
//! rejected when the array is built:
//!
//! ```rust,compile_fail
//! use rresource::{PmrVec, TrackingResource};
//!
//! #[repr(align(64))]
//! struct CacheLine([u8; 64]);
//!
//! let tracking = TrackingResource::new();
//! let lines = PmrVec::<CacheLine>::new_in(&tracking);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: resources use `Cell`/`RefCell` and are not `Sync`
//! - **No shrinking**: capacity only grows until the array is dropped
//! - **Natural alignment only**: element types aligned beyond
//!   [`align::MAX_ALIGN`] are rejected at compile time
//! - **Lax deallocation**: [`TrackingResource`] ignores handles it did not issue
//!
//! ## Safety
//!
//! [`MemoryResource::deallocate`] is `unsafe` because an upstream such as
//! [`SystemResource`] cannot validate the handle it is given. Containers in
//! this crate uphold that contract; callers driving a resource by hand must
//! do the same.

pub mod align;
mod block;
mod counting;
mod error;
mod iter;
mod resource;
mod tracking;
mod vec;

pub use block::BlockHandle;
pub use counting::CountingResource;
pub use error::AllocError;
pub use iter::{Iter, IterMut};
pub use resource::{MemoryResource, SystemResource, default_resource};
pub use tracking::TrackingResource;
pub use vec::PmrVec;
