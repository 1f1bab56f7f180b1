use std::{
  alloc::Layout,
  fmt,
  marker::PhantomData,
  mem,
  ops::{Index, IndexMut},
  ptr::{self, NonNull},
  slice,
};

use log::trace;

use crate::{
  align::fits_max_align,
  block::BlockHandle,
  error::AllocError,
  iter::{Iter, IterMut},
  resource::{MemoryResource, default_resource},
};

/// A growable, contiguous array whose storage comes from a borrowed
/// [`MemoryResource`].
///
/// ```text
///   PmrVec                       buffer (from `resource`)
///   ┌──────────┐                 ┌────┬────┬────┬────┬────┬────┬────┬────┐
///   │ buf      │───────────────► │ e0 │ e1 │ e2 │ e3 │ e4 │ ·· │ ·· │ ·· │
///   │ len: 5   │                 └────┴────┴────┴────┴────┴────┴────┴────┘
///   │ cap: 8   │                  ◄──── live [0, len) ───►◄ uninit ─────►
///   │ resource │──► &dyn MemoryResource
///   └──────────┘
/// ```
///
/// The array owns its buffer; the resource is only borrowed and must outlive
/// the array, which the `'r` lifetime enforces. Capacity grows
/// `0 -> 1 -> 2 -> 4 -> ...` and never shrinks. The array is move-only: it
/// does not implement `Clone`.
pub struct PmrVec<'r, T> {
  buf: NonNull<T>,
  len: usize,
  cap: usize,
  resource: &'r dyn MemoryResource,
  _marker: PhantomData<T>,
}

impl<T> PmrVec<'static, T> {
  /// An empty array bound to [`default_resource`].
  pub fn new() -> Self {
    Self::new_in(default_resource())
  }
}

impl<T> Default for PmrVec<'static, T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<'r, T> PmrVec<'r, T> {
  /// An empty array bound to `resource`. Nothing is allocated until the
  /// first push.
  pub fn new_in(resource: &'r dyn MemoryResource) -> Self {
    const {
      assert!(
        fits_max_align::<T>(),
        "element alignment exceeds the alignment memory resources guarantee"
      )
    };

    Self {
      buf: NonNull::dangling(),
      len: 0,
      cap: 0,
      resource,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.cap
  }

  /// The resource this array allocates from.
  pub fn resource(&self) -> &'r dyn MemoryResource {
    self.resource
  }

  /// Appends `value`, growing the buffer first if it is full.
  ///
  /// If growth fails the array is left exactly as it was and `value` is
  /// dropped.
  pub fn push(
    &mut self,
    value: T,
  ) -> Result<(), AllocError> {
    if self.len == self.cap {
      self.grow()?;
    }

    unsafe { self.buf.as_ptr().add(self.len).write(value) };
    self.len += 1;

    Ok(())
  }

  /// Pushes every item of `iter` in order, stopping at the first failure.
  pub fn try_extend<I>(
    &mut self,
    iter: I,
  ) -> Result<(), AllocError>
  where
    I: IntoIterator<Item = T>,
  {
    for value in iter {
      self.push(value)?;
    }

    Ok(())
  }

  pub fn pop(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    self.len -= 1;
    Some(unsafe { self.buf.as_ptr().add(self.len).read() })
  }

  /// Drops every element. The buffer and capacity are kept.
  pub fn clear(&mut self) {
    let live = ptr::slice_from_raw_parts_mut(self.buf.as_ptr(), self.len);

    // Zero first so a panicking destructor cannot cause a double drop.
    self.len = 0;
    unsafe { ptr::drop_in_place(live) };
  }

  /// Moves the contents out, leaving `self` empty, without a buffer, and
  /// still bound to the same resource.
  pub fn take(&mut self) -> Self {
    let empty = Self::new_in(self.resource);
    mem::replace(self, empty)
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<&T> {
    self.as_slice().get(index)
  }

  pub fn get_mut(
    &mut self,
    index: usize,
  ) -> Option<&mut T> {
    self.as_mut_slice().get_mut(index)
  }

  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
  }

  pub fn iter(&self) -> Iter<'_, T> {
    unsafe { Iter::new(self.buf, self.len) }
  }

  pub fn iter_mut(&mut self) -> IterMut<'_, T> {
    unsafe { IterMut::new(self.buf, self.len) }
  }

  /// Size in bytes of a buffer holding `capacity` elements.
  fn buffer_bytes(capacity: usize) -> Result<usize, AllocError> {
    Layout::array::<T>(capacity)
      .map(|layout| layout.size())
      .map_err(|_| AllocError::CapacityOverflow)
  }

  /// Replaces the buffer with one twice as large (or of one element when
  /// there is none).
  ///
  /// The new block is obtained before anything is touched, so a failed
  /// request leaves the array unchanged.
  fn grow(&mut self) -> Result<(), AllocError> {
    let new_cap = if self.cap == 0 {
      1
    } else {
      self.cap.checked_mul(2).ok_or(AllocError::CapacityOverflow)?
    };
    let new_bytes = Self::buffer_bytes(new_cap)?;

    let new_buf = self.resource.allocate(new_bytes)?.cast::<T>();

    // Moving a value is a bitwise copy; the old slots are simply abandoned.
    unsafe { ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.len) };

    trace!("grow {} -> {} elements ({} bytes)", self.cap, new_cap, new_bytes);

    self.release_buffer();

    self.buf = new_buf;
    self.cap = new_cap;

    Ok(())
  }

  /// Hands the buffer back to the resource with the size it was allocated
  /// with. Leaves `buf` dangling and `cap` zero; the caller is responsible for
  /// the elements.
  fn release_buffer(&mut self) {
    if self.cap == 0 {
      return;
    }

    // Cannot overflow: the same size was computed when the block was granted.
    let bytes = self.cap * mem::size_of::<T>();
    let handle = BlockHandle::new(self.buf.cast());

    unsafe { self.resource.deallocate(handle, bytes) };

    self.buf = NonNull::dangling();
    self.cap = 0;
  }
}

impl<T> Drop for PmrVec<'_, T> {
  fn drop(&mut self) {
    self.clear();
    self.release_buffer();
  }
}

impl<T> Index<usize> for PmrVec<'_, T> {
  type Output = T;

  /// # Panics
  ///
  /// Panics if `index >= len()`.
  fn index(
    &self,
    index: usize,
  ) -> &T {
    &self.as_slice()[index]
  }
}

impl<T> IndexMut<usize> for PmrVec<'_, T> {
  fn index_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    &mut self.as_mut_slice()[index]
  }
}

impl<'a, T> IntoIterator for &'a PmrVec<'_, T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Iter<'a, T> {
    self.iter()
  }
}

impl<'a, T> IntoIterator for &'a mut PmrVec<'_, T> {
  type Item = &'a mut T;
  type IntoIter = IterMut<'a, T>;

  fn into_iter(self) -> IterMut<'a, T> {
    self.iter_mut()
  }
}

impl<T: fmt::Debug> fmt::Debug for PmrVec<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<'a, 'b, T: PartialEq<U>, U> PartialEq<PmrVec<'b, U>> for PmrVec<'a, T> {
  fn eq(
    &self,
    other: &PmrVec<'b, U>,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq> Eq for PmrVec<'_, T> {}

impl<T: PartialEq<U>, U> PartialEq<[U]> for PmrVec<'_, T> {
  fn eq(
    &self,
    other: &[U],
  ) -> bool {
    self.as_slice() == other
  }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for PmrVec<'_, T> {
  fn eq(
    &self,
    other: &[U; N],
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}
