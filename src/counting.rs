use std::cell::Cell;

use log::trace;

use crate::{
  block::BlockHandle,
  error::AllocError,
  resource::{MemoryResource, SystemResource},
};

/// Instrumentation wrapper around an upstream resource.
///
/// Counts outstanding blocks and bytes, and can refuse requests that would
/// take the outstanding total past a byte budget. A refused request fails with
/// [`AllocError::OutOfMemory`] exactly like a real upstream failure, which
/// makes it the tool for exercising failure paths.
#[derive(Debug, Default)]
pub struct CountingResource<U: MemoryResource = SystemResource> {
  upstream: U,
  budget: Cell<Option<usize>>,
  outstanding_blocks: Cell<usize>,
  outstanding_bytes: Cell<usize>,
  allocations: Cell<usize>,
  deallocations: Cell<usize>,
  failures: Cell<usize>,
}

impl CountingResource {
  pub fn new() -> Self {
    Self::with_upstream(SystemResource)
  }

  /// A counting system resource that refuses to hold more than `budget`
  /// bytes at once.
  pub fn with_budget(budget: usize) -> Self {
    let counting = Self::new();
    counting.set_budget(Some(budget));
    counting
  }
}

impl<U: MemoryResource> CountingResource<U> {
  pub fn with_upstream(upstream: U) -> Self {
    Self {
      upstream,
      budget: Cell::new(None),
      outstanding_blocks: Cell::new(0),
      outstanding_bytes: Cell::new(0),
      allocations: Cell::new(0),
      deallocations: Cell::new(0),
      failures: Cell::new(0),
    }
  }

  /// Replaces the byte budget. `None` removes the limit. Blocks already
  /// granted are unaffected.
  pub fn set_budget(
    &self,
    budget: Option<usize>,
  ) {
    self.budget.set(budget);
  }

  pub fn budget(&self) -> Option<usize> {
    self.budget.get()
  }

  pub fn outstanding_blocks(&self) -> usize {
    self.outstanding_blocks.get()
  }

  pub fn outstanding_bytes(&self) -> usize {
    self.outstanding_bytes.get()
  }

  pub fn total_allocations(&self) -> usize {
    self.allocations.get()
  }

  pub fn total_deallocations(&self) -> usize {
    self.deallocations.get()
  }

  pub fn failed_allocations(&self) -> usize {
    self.failures.get()
  }

  fn within_budget(
    &self,
    bytes: usize,
  ) -> bool {
    match self.budget.get() {
      None => true,
      Some(budget) => self
        .outstanding_bytes
        .get()
        .checked_add(bytes)
        .is_some_and(|total| total <= budget),
    }
  }
}

impl<U: MemoryResource> MemoryResource for CountingResource<U> {
  fn allocate(
    &self,
    bytes: usize,
  ) -> Result<BlockHandle, AllocError> {
    if !self.within_budget(bytes) {
      trace!("budget refused {} bytes", bytes);
      self.failures.set(self.failures.get() + 1);
      return Err(AllocError::OutOfMemory { requested: bytes });
    }

    let handle = self.upstream.allocate(bytes).inspect_err(|_| {
      self.failures.set(self.failures.get() + 1);
    })?;

    self.allocations.set(self.allocations.get() + 1);
    self.outstanding_blocks.set(self.outstanding_blocks.get() + 1);
    self.outstanding_bytes.set(self.outstanding_bytes.get() + bytes);

    Ok(handle)
  }

  unsafe fn deallocate(
    &self,
    handle: BlockHandle,
    bytes: usize,
  ) {
    unsafe { self.upstream.deallocate(handle, bytes) };

    self.deallocations.set(self.deallocations.get() + 1);
    self.outstanding_blocks.set(self.outstanding_blocks.get().saturating_sub(1));
    self.outstanding_bytes.set(self.outstanding_bytes.get().saturating_sub(bytes));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_counts() {
    let counting = CountingResource::new();

    let first = counting.allocate(10).unwrap();
    let second = counting.allocate(30).unwrap();

    assert_eq!(counting.outstanding_blocks(), 2);
    assert_eq!(counting.outstanding_bytes(), 40);

    unsafe { counting.deallocate(first, 10) };

    assert_eq!(counting.outstanding_blocks(), 1);
    assert_eq!(counting.outstanding_bytes(), 30);

    unsafe { counting.deallocate(second, 30) };

    assert_eq!(counting.total_allocations(), 2);
    assert_eq!(counting.total_deallocations(), 2);
    assert_eq!(counting.outstanding_bytes(), 0);
  }

  #[test]
  fn test_budget() {
    let counting = CountingResource::with_budget(100);
    assert_eq!(counting.budget(), Some(100));

    let handle = counting.allocate(60).unwrap();

    assert_eq!(
      counting.allocate(41),
      Err(AllocError::OutOfMemory { requested: 41 })
    );
    assert_eq!(counting.failed_allocations(), 1);

    let rest = counting.allocate(40).unwrap();

    counting.set_budget(None);
    assert_eq!(counting.budget(), None);
    let extra = counting.allocate(1000).unwrap();

    unsafe {
      counting.deallocate(handle, 60);
      counting.deallocate(rest, 40);
      counting.deallocate(extra, 1000);
    }

    assert_eq!(counting.outstanding_blocks(), 0);
  }

  #[test]
  fn test_upstream_failure_is_counted() {
    let counting = CountingResource::new();

    assert!(counting.allocate(usize::MAX).is_err());
    assert_eq!(counting.failed_allocations(), 1);
    assert_eq!(counting.total_allocations(), 0);
  }
}
