use std::{fmt, iter::FusedIterator, marker::PhantomData, ptr::NonNull};

/// Forward cursor over the live elements of a [`PmrVec`](crate::PmrVec).
///
/// Holds a raw position into the buffer and a count of what is left; it owns
/// nothing. The borrow it carries keeps the buffer from being grown, cleared
/// or dropped while the cursor is alive.
pub struct Iter<'a, T> {
  ptr: NonNull<T>,
  remaining: usize,
  _marker: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
  /// # Safety
  ///
  /// `ptr` must point to `len` initialized values of `T` that stay valid and
  /// unaliased by writers for `'a`.
  pub(crate) unsafe fn new(
    ptr: NonNull<T>,
    len: usize,
  ) -> Self {
    Self {
      ptr,
      remaining: len,
      _marker: PhantomData,
    }
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  fn next(&mut self) -> Option<&'a T> {
    if self.remaining == 0 {
      return None;
    }

    unsafe {
      let current = &*self.ptr.as_ptr();
      self.ptr = self.ptr.add(1);
      self.remaining -= 1;
      Some(current)
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
  fn clone(&self) -> Self {
    Self {
      ptr: self.ptr,
      remaining: self.remaining,
      _marker: PhantomData,
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.clone()).finish()
  }
}

/// Mutable counterpart of [`Iter`].
pub struct IterMut<'a, T> {
  ptr: NonNull<T>,
  remaining: usize,
  _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
  /// # Safety
  ///
  /// Same as [`Iter::new`], and nothing else may access the values for `'a`.
  pub(crate) unsafe fn new(
    ptr: NonNull<T>,
    len: usize,
  ) -> Self {
    Self {
      ptr,
      remaining: len,
      _marker: PhantomData,
    }
  }
}

impl<'a, T> Iterator for IterMut<'a, T> {
  type Item = &'a mut T;

  fn next(&mut self) -> Option<&'a mut T> {
    if self.remaining == 0 {
      return None;
    }

    unsafe {
      let current = &mut *self.ptr.as_ptr();
      self.ptr = self.ptr.add(1);
      self.remaining -= 1;
      Some(current)
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}
