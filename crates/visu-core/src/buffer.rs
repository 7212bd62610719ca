//! Shapeless views over solver-owned numeric buffers.

use std::ops::Deref;

/// A borrowed, shapeless run of values produced by the external solver.
///
/// Shape is reconstructed by the consumer from side-channel counts
/// (cell arity, component counts). The borrow ties the view to whoever
/// owns the storage, so a view can never outlive a buffer release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatBuffer<'a, T> {
    data: &'a [T],
}

impl<'a, T> FlatBuffer<'a, T> {
    /// Wrap a slice.
    pub const fn new(data: &'a [T]) -> Self {
        Self { data }
    }

    /// An empty buffer.
    pub const fn empty() -> Self {
        Self { data: &[] }
    }

    /// Number of scalar elements.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no elements.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying slice, with the original borrow lifetime.
    pub const fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

impl<T> Default for FlatBuffer<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for FlatBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.data
    }
}

impl<'a, T> From<&'a [T]> for FlatBuffer<'a, T> {
    fn from(data: &'a [T]) -> Self {
        Self::new(data)
    }
}

impl<'a, T> From<&'a Vec<T>> for FlatBuffer<'a, T> {
    fn from(data: &'a Vec<T>) -> Self {
        Self::new(data.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_slice_without_copying() {
        let data = vec![1.0f64, 2.0, 3.0];
        let buf = FlatBuffer::from(&data);
        assert_eq!(buf.len(), 3);
        assert!(std::ptr::eq(buf.as_slice(), data.as_slice()));
        assert_eq!(buf[1], 2.0);
    }

    #[test]
    fn empty_buffer() {
        let buf: FlatBuffer<'_, i32> = FlatBuffer::default();
        assert!(buf.is_empty());
        assert_eq!(buf.iter().count(), 0);
    }
}
