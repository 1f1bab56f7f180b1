use std::{fmt, ptr::NonNull};

/// Opaque handle to a block granted by a
/// [`MemoryResource`](crate::MemoryResource).
///
/// The handle is only an address; it does not own the block and does not free
/// it on drop. Pass it back to the resource that issued it to release it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHandle {
  ptr: NonNull<u8>,
}

impl BlockHandle {
  pub fn new(ptr: NonNull<u8>) -> Self {
    Self { ptr }
  }

  /// Wraps a raw pointer, returning `None` for null.
  pub fn from_raw(ptr: *mut u8) -> Option<Self> {
    NonNull::new(ptr).map(Self::new)
  }

  pub fn as_ptr(self) -> *mut u8 {
    self.ptr.as_ptr()
  }

  /// The block start cast to `T`.
  pub fn cast<T>(self) -> NonNull<T> {
    self.ptr.cast()
  }
}

impl fmt::Debug for BlockHandle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "BlockHandle({:p})", self.ptr)
  }
}
