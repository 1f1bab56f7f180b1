use std::{cell::RefCell, collections::HashMap};

use log::{debug, trace, warn};

use crate::{
  block::BlockHandle,
  error::AllocError,
  resource::{MemoryResource, SystemResource},
};

/// A resource that remembers every block it hands out.
///
/// Each grant is recorded as `handle -> size` until it is deallocated. When
/// the resource is dropped, every block still recorded is returned to the
/// upstream, so containers that leak or are forgotten cannot leak memory past
/// the lifetime of the resource.
///
/// Deallocating a handle the resource does not know is ignored. The size
/// passed to `deallocate` is not trusted: the block goes back upstream with
/// the size recorded at allocation time.
///
/// Single-threaded only. The map lives in a `RefCell`, so the type is not
/// `Sync`.
pub struct TrackingResource<U: MemoryResource = SystemResource> {
  upstream: U,
  blocks: RefCell<HashMap<BlockHandle, usize>>,
}

impl TrackingResource {
  pub fn new() -> Self {
    Self::with_upstream(SystemResource)
  }
}

impl Default for TrackingResource {
  fn default() -> Self {
    Self::new()
  }
}

impl<U: MemoryResource> TrackingResource<U> {
  /// Creates a tracking resource that draws its blocks from `upstream`.
  pub fn with_upstream(upstream: U) -> Self {
    Self {
      upstream,
      blocks: RefCell::new(HashMap::new()),
    }
  }

  pub fn upstream(&self) -> &U {
    &self.upstream
  }

  /// Number of blocks granted and not yet released.
  pub fn live_blocks(&self) -> usize {
    self.blocks.borrow().len()
  }

  /// Sum of the requested sizes of all live blocks.
  pub fn live_bytes(&self) -> usize {
    self.blocks.borrow().values().sum()
  }

  pub fn is_live(
    &self,
    handle: BlockHandle,
  ) -> bool {
    self.blocks.borrow().contains_key(&handle)
  }

  /// The size recorded for `handle`, if it is live.
  pub fn block_size(
    &self,
    handle: BlockHandle,
  ) -> Option<usize> {
    self.blocks.borrow().get(&handle).copied()
  }

  /// Returns every live block to the upstream and forgets it.
  ///
  /// Taking `&mut self` guarantees no container still borrows the resource.
  /// Returns the number of blocks reclaimed.
  pub fn release_all(&mut self) -> usize {
    let blocks = std::mem::take(self.blocks.get_mut());
    let count = blocks.len();

    if count > 0 {
      debug!(
        "reclaiming {} outstanding block(s), {} bytes",
        count,
        blocks.values().sum::<usize>()
      );
    }

    for (handle, bytes) in blocks {
      trace!("reclaim {:?} ({} bytes)", handle, bytes);
      unsafe { self.upstream.deallocate(handle, bytes) };
    }

    count
  }
}

impl<U: MemoryResource> MemoryResource for TrackingResource<U> {
  fn allocate(
    &self,
    bytes: usize,
  ) -> Result<BlockHandle, AllocError> {
    let handle = self.upstream.allocate(bytes)?;

    self.blocks.borrow_mut().insert(handle, bytes);
    trace!("allocate {:?} ({} bytes)", handle, bytes);

    Ok(handle)
  }

  unsafe fn deallocate(
    &self,
    handle: BlockHandle,
    bytes: usize,
  ) {
    let recorded = self.blocks.borrow_mut().remove(&handle);

    let Some(recorded) = recorded else {
      warn!("ignoring deallocation of unknown block {:?}", handle);
      return;
    };

    if recorded != bytes {
      warn!(
        "block {:?} released with {} bytes, recorded {} bytes",
        handle, bytes, recorded
      );
    }

    trace!("deallocate {:?} ({} bytes)", handle, recorded);
    unsafe { self.upstream.deallocate(handle, recorded) };
  }
}

impl<U: MemoryResource> Drop for TrackingResource<U> {
  fn drop(&mut self) {
    self.release_all();
  }
}
