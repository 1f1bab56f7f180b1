use std::{any, ptr};

use libc::{c_void, free, malloc};

use crate::{block::BlockHandle, error::AllocError};

/// A source of raw storage blocks.
///
/// Containers hold a `&dyn MemoryResource` and route every allocation through
/// it, so the strategy behind it can be swapped without touching the
/// container. Blocks are aligned to at least [`MAX_ALIGN`](crate::align::MAX_ALIGN).
pub trait MemoryResource {
  /// Requests a block of `bytes` bytes.
  fn allocate(
    &self,
    bytes: usize,
  ) -> Result<BlockHandle, AllocError>;

  /// Returns a block to the resource.
  ///
  /// # Safety
  ///
  /// `handle` must have been returned by `allocate` on this same resource,
  /// with the same `bytes`, and not released since. Implementations may
  /// relax this (see [`TrackingResource`](crate::TrackingResource)).
  unsafe fn deallocate(
    &self,
    handle: BlockHandle,
    bytes: usize,
  );

  /// Name of the concrete resource type behind a reference.
  fn resource_type(&self) -> &'static str {
    any::type_name::<Self>()
  }

  /// Two resources are interchangeable only if they are the same instance:
  /// same address and same concrete type. The type check keeps a resource
  /// apart from an upstream it stores at offset zero.
  ///
  /// Zero-sized resources all share one address, so every
  /// [`SystemResource`] compares equal to every other.
  fn is_same_resource(
    &self,
    other: &dyn MemoryResource,
  ) -> bool {
    ptr::addr_eq(self as *const Self, other as *const dyn MemoryResource)
      && self.resource_type() == other.resource_type()
  }
}

impl<R: MemoryResource + ?Sized> MemoryResource for &R {
  fn allocate(
    &self,
    bytes: usize,
  ) -> Result<BlockHandle, AllocError> {
    (**self).allocate(bytes)
  }

  unsafe fn deallocate(
    &self,
    handle: BlockHandle,
    bytes: usize,
  ) {
    unsafe { (**self).deallocate(handle, bytes) }
  }

  fn resource_type(&self) -> &'static str {
    (**self).resource_type()
  }

  fn is_same_resource(
    &self,
    other: &dyn MemoryResource,
  ) -> bool {
    (**self).is_same_resource(other)
  }
}

/// The system allocator: `malloc` and `free` from libc.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResource;

impl MemoryResource for SystemResource {
  fn allocate(
    &self,
    bytes: usize,
  ) -> Result<BlockHandle, AllocError> {
    // malloc(0) may return null; ask for one byte so every grant is unique.
    let address = unsafe { malloc(bytes.max(1)) } as *mut u8;

    BlockHandle::from_raw(address).ok_or(AllocError::OutOfMemory { requested: bytes })
  }

  unsafe fn deallocate(
    &self,
    handle: BlockHandle,
    _bytes: usize,
  ) {
    unsafe { free(handle.as_ptr() as *mut c_void) }
  }
}

static DEFAULT_RESOURCE: SystemResource = SystemResource;

/// The process-wide resource used by containers built without an explicit
/// one. It is never torn down.
pub fn default_resource() -> &'static dyn MemoryResource {
  &DEFAULT_RESOURCE
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{CountingResource, TrackingResource};

  #[test]
  fn test_system_roundtrip() {
    let system = SystemResource;

    unsafe {
      let handle = system.allocate(8 * 6).unwrap();
      let words = handle.cast::<u64>().as_ptr();

      for i in 0..6 {
        words.add(i).write(i as u64 * 3);
      }

      for i in 0..6 {
        assert_eq!(i as u64 * 3, *words.add(i));
      }

      assert_eq!(handle.as_ptr() as usize % crate::align::MAX_ALIGN, 0);

      system.deallocate(handle, 8 * 6);
    }
  }

  #[test]
  fn test_zero_byte_request_is_unique() {
    let system = SystemResource;

    let first = system.allocate(0).unwrap();
    let second = system.allocate(0).unwrap();

    assert_ne!(first, second);

    unsafe {
      system.deallocate(first, 0);
      system.deallocate(second, 0);
    }
  }

  #[test]
  fn test_huge_request_fails() {
    let system = SystemResource;

    assert_eq!(
      system.allocate(usize::MAX),
      Err(AllocError::OutOfMemory { requested: usize::MAX })
    );
  }

  #[test]
  fn test_identity() {
    let first = TrackingResource::new();
    let second = TrackingResource::new();

    assert!(first.is_same_resource(&first));
    assert!(!first.is_same_resource(&second));

    let borrowed: &TrackingResource = &first;
    assert!(<&TrackingResource as MemoryResource>::is_same_resource(&borrowed, &first));
    assert!(default_resource().is_same_resource(default_resource()));
  }

  #[test]
  fn test_identity_distinguishes_inline_upstream() {
    let tracking = TrackingResource::with_upstream(CountingResource::new());
    let upstream = tracking.upstream();

    assert!(!tracking.is_same_resource(upstream));
    assert!(!upstream.is_same_resource(&tracking));
    assert!(upstream.is_same_resource(upstream));

    let handle = tracking.allocate(12).unwrap();
    assert_eq!(upstream.outstanding_bytes(), 12);

    unsafe { tracking.deallocate(handle, 12) };
    assert_eq!(upstream.outstanding_blocks(), 0);
  }

  #[test]
  fn test_resource_type() {
    let tracking = TrackingResource::new();
    let borrowed: &TrackingResource = &tracking;
    let erased: &dyn MemoryResource = &tracking;

    assert_eq!(borrowed.resource_type(), erased.resource_type());
    assert_ne!(SystemResource.resource_type(), erased.resource_type());
  }
}
