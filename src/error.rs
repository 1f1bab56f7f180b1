use thiserror::Error;

/// Errors surfaced by a [`MemoryResource`](crate::MemoryResource) or by a
/// container growing through one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
  /// The upstream allocator could not satisfy the request.
  #[error("out of memory: failed to allocate {requested} bytes")]
  OutOfMemory {
    /// Number of bytes requested.
    requested: usize,
  },
  /// The requested capacity does not fit in `isize::MAX` bytes.
  #[error("capacity overflow")]
  CapacityOverflow,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display() {
    let err = AllocError::OutOfMemory { requested: 64 };
    assert_eq!(err.to_string(), "out of memory: failed to allocate 64 bytes");
    assert_eq!(AllocError::CapacityOverflow.to_string(), "capacity overflow");
  }
}
