use std::mem;

/// Alignment every block from [`SystemResource`](crate::SystemResource) is
/// guaranteed to satisfy.
///
/// `malloc` aligns to `alignof(max_align_t)`, which is two machine words on
/// the supported targets.
pub const MAX_ALIGN: usize = 2 * mem::size_of::<usize>();

/// Returns `true` if values of `T` can live in a block handed out by a
/// resource without any extra alignment work.
///
/// # Examples
///
/// ```rust
/// use rresource::align::fits_max_align;
///
/// assert!(fits_max_align::<u64>());
/// assert!(fits_max_align::<(u8, u32, u16)>());
/// ```
pub const fn fits_max_align<T>() -> bool {
  mem::align_of::<T>() <= MAX_ALIGN
}
