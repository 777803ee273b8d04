//! Field-major views over structure-of-arrays storage.
//!
//! [`SoaSlice`] and [`SoaSliceMut`] bundle one span per column, all of the
//! same length. They are what [`SoaArray::as_slice`](crate::SoaArray::as_slice)
//! hands out, and also the interchange format for bulk copies: any storage
//! that can lend per-field spans of matching element shape can be wrapped
//! with [`SoaSlice::new`] and fed to `append_soa` or `insert_multi`,
//! regardless of its own capacity or growth policy.
//!
//! Both views dereference to the derived span struct, so individual columns
//! are reached by field name (`view.mass`, `view.kind`).

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Deref, DerefMut};

use crate::element::SoaElement;
use crate::error::SoaError;
use crate::SoaArray;

/// A read-only view of `len` elements across every column.
pub struct SoaSlice<'a, T: SoaElement> {
    fields: T::Slices<'a>,
    len: usize,
}

impl<T: SoaElement> Clone for SoaSlice<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SoaElement> Copy for SoaSlice<'_, T> {}

impl<'a, T: SoaElement> SoaSlice<'a, T> {
    /// Wraps externally owned per-field spans.
    ///
    /// # Panics
    ///
    /// Panics if the spans differ in length.
    #[must_use]
    pub fn new(fields: T::Slices<'a>) -> Self {
        let len = T::slices_len(&fields);
        Self { fields, len }
    }

    /// Builds a view whose length is already known to match the spans.
    pub(crate) fn from_parts(fields: T::Slices<'a>, len: usize) -> Self {
        Self { fields, len }
    }

    /// Returns the number of elements in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gathers the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        assert!(index < self.len, "index out of bounds");
        T::read(&self.fields, index)
    }

    /// Returns the per-field spans, keeping the full `'a` lifetime.
    #[must_use]
    pub fn into_inner(self) -> T::Slices<'a> {
        self.fields
    }

    /// Returns an iterator gathering each element in order.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter {
            slice: *self,
            front: 0,
            back: self.len,
        }
    }

    /// Copies the view into a new `SoaArray` of capacity `M`.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `len > M`.
    pub fn to_soa_array<const M: usize>(&self) -> Result<SoaArray<T, M>, SoaError> {
        SoaArray::from_soa(*self)
    }
}

impl<'a, T: SoaElement> Deref for SoaSlice<'a, T> {
    type Target = T::Slices<'a>;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl<T: SoaElement + fmt::Debug> fmt::Debug for SoaSlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: SoaElement> IntoIterator for SoaSlice<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A mutable view of `len` elements across every column.
pub struct SoaSliceMut<'a, T: SoaElement> {
    fields: T::SlicesMut<'a>,
    len: usize,
}

impl<'a, T: SoaElement> SoaSliceMut<'a, T> {
    /// Wraps externally owned mutable per-field spans.
    ///
    /// # Panics
    ///
    /// Panics if the spans differ in length.
    #[must_use]
    pub fn new(fields: T::SlicesMut<'a>) -> Self {
        let len = T::slices_len(&T::reborrow(&fields));
        Self { fields, len }
    }

    pub(crate) fn from_parts(fields: T::SlicesMut<'a>, len: usize) -> Self {
        Self { fields, len }
    }

    /// Returns the number of elements in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gathers the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        assert!(index < self.len, "index out of bounds");
        T::read(&T::reborrow(&self.fields), index)
    }

    /// Scatters `value` into every column at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.len, "index out of bounds");
        T::write(&mut self.fields, index, value);
    }

    /// Reborrows as a read-only view.
    #[must_use]
    pub fn as_slice(&self) -> SoaSlice<'_, T> {
        SoaSlice::from_parts(T::reborrow(&self.fields), self.len)
    }

    /// Returns the mutable per-field spans, keeping the full `'a` lifetime.
    #[must_use]
    pub fn into_inner(self) -> T::SlicesMut<'a> {
        self.fields
    }
}

impl<'a, T: SoaElement> Deref for SoaSliceMut<'a, T> {
    type Target = T::SlicesMut<'a>;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl<T: SoaElement> DerefMut for SoaSliceMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fields
    }
}

impl<T: SoaElement + fmt::Debug> fmt::Debug for SoaSliceMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

/// Anything that can lend per-field spans of `T` elements.
///
/// Bulk operations such as [`SoaArray::append_multi`] accept any source,
/// so containers of different capacities interoperate directly.
pub trait SoaSource<T: SoaElement> {
    /// Returns a read-only view of the source's elements.
    fn soa_slice(&self) -> SoaSlice<'_, T>;
}

impl<T: SoaElement, const M: usize> SoaSource<T> for SoaArray<T, M> {
    fn soa_slice(&self) -> SoaSlice<'_, T> {
        self.as_slice()
    }
}

impl<T: SoaElement> SoaSource<T> for SoaSlice<'_, T> {
    fn soa_slice(&self) -> SoaSlice<'_, T> {
        SoaSlice::from_parts(T::narrow(&self.fields), self.len)
    }
}

impl<T: SoaElement> SoaSource<T> for SoaSliceMut<'_, T> {
    fn soa_slice(&self) -> SoaSlice<'_, T> {
        self.as_slice()
    }
}

/// Iterator gathering elements out of a [`SoaSlice`].
pub struct Iter<'a, T: SoaElement> {
    slice: SoaSlice<'a, T>,
    front: usize,
    back: usize,
}

impl<T: SoaElement> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = T::read(&self.slice.fields, self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: SoaElement> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(T::read(&self.slice.fields, self.back))
    }
}

impl<T: SoaElement> ExactSizeIterator for Iter<'_, T> {}

impl<T: SoaElement> FusedIterator for Iter<'_, T> {}
