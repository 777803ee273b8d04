//! Fixed-capacity structure-of-arrays container.
//!
//! This module provides [`SoaArray`], a vector-like sequence whose elements
//! are split into one `[F; N]` array per field. All columns share a single
//! length, and every operation moves the columns in lockstep so that slot
//! `i` of each column always belongs to the same logical element.
//!
//! # Capacity Management
//!
//! The capacity is a const generic parameter and never changes. Operations
//! that grow the container come in two flavours: a checked one returning
//! [`SoaError::CapacityExceeded`] (and leaving the container untouched), and
//! an `_assume_capacity` one that panics instead.
//!
//! # Performance
//!
//! - `append`/`pop`/`swap_remove`: O(fields)
//! - `insert`/`ordered_remove`: O(len * fields)
//! - `get`/`set`: O(fields), gathering or scattering one slot
//! - `as_slice`/`items`: O(1), no copying
//!
//! # Examples
//!
//! ```
//! use hadron_soa::{Soa, SoaArray};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Soa)]
//! struct Particle {
//!     mass: f32,
//!     kind: u8,
//! }
//!
//! let mut soa = SoaArray::<Particle, 16>::new();
//! soa.append(Particle { mass: 1.0, kind: 3 }).unwrap();
//! soa.append(Particle { mass: 2.5, kind: 1 }).unwrap();
//!
//! assert_eq!(soa.len(), 2);
//! assert_eq!(soa.get(1), Particle { mass: 2.5, kind: 1 });
//!
//! // Each field is a contiguous span.
//! assert_eq!(soa.items().kind, &[3, 1]);
//! ```

use core::fmt;
use core::ops::Range;

use crate::element::{CopyWithin, SoaElement, SwapSlots};
use crate::error::SoaError;
use crate::log::{soa_debug, soa_trace};
use crate::slice::{Iter, SoaSlice, SoaSliceMut, SoaSource};

/// A fixed-capacity sequence of `T` stored as one array per field.
///
/// # Type Parameters
///
/// - `T`: The element type, usually `#[derive(Soa)]`
/// - `N`: The maximum number of elements (capacity)
///
/// Slots past `len` hold stale or default values and are never observable
/// through the public API. Copying a `SoaArray` copies every column.
pub struct SoaArray<T: SoaElement, const N: usize> {
    arrays: T::Arrays<N>,
    len: usize,
}

impl<T: SoaElement, const N: usize> Clone for SoaArray<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SoaElement, const N: usize> Copy for SoaArray<T, N> {}

impl<T: SoaElement, const N: usize> Default for SoaArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SoaElement, const N: usize> SoaArray<T, N> {
    /// The fixed capacity.
    pub const CAPACITY: usize = N;

    /// Creates an empty `SoaArray`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arrays: T::new_arrays(),
            len: 0,
        }
    }

    /// Creates a `SoaArray` holding `len` elements with unspecified (but
    /// valid) contents, to be filled in with [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `len > N`.
    pub fn with_len(len: usize) -> Result<Self, SoaError> {
        if len > N {
            return Err(Self::exceeded("with_len", len));
        }
        Ok(Self {
            arrays: T::new_arrays(),
            len,
        })
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the `SoaArray` is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns how many more elements fit.
    #[must_use]
    pub fn unused_capacity(&self) -> usize {
        N - self.len
    }

    /// Returns the bytes of storage backing all `N` slots.
    #[must_use]
    pub fn capacity_in_bytes(&self) -> usize {
        N * T::SLOT_SIZE
    }

    /// Sets the length without touching any column.
    ///
    /// Growing exposes slots with unspecified contents; shrinking leaves the
    /// old contents in place but logically removed.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `new_len > N`.
    pub fn resize(&mut self, new_len: usize) -> Result<(), SoaError> {
        if new_len > N {
            return Err(Self::exceeded("resize", new_len));
        }
        self.len = new_len;
        Ok(())
    }

    /// Shortens to `len` elements. Does nothing if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Checks that `additional` more elements fit. Never mutates.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `len + additional > N`.
    pub fn ensure_unused_capacity(&self, additional: usize) -> Result<(), SoaError> {
        self.reserve("ensure_unused_capacity", additional)
    }

    /// Gathers the element at `index` from every column.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        self.as_slice().get(index)
    }

    /// Scatters `value` into every column at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: T) {
        self.as_mut_slice().set(index, value);
    }

    /// Returns the first element, or `None` if empty.
    #[must_use]
    pub fn first(&self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            Some(self.read_slot(0))
        }
    }

    /// Returns the last element, or `None` if empty.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            Some(self.read_slot(self.len - 1))
        }
    }

    /// Returns a read-only view of all elements, one span per column.
    #[must_use]
    pub fn as_slice(&self) -> SoaSlice<'_, T> {
        SoaSlice::from_parts(T::slices(&self.arrays, 0..self.len), self.len)
    }

    /// Returns a mutable view of all elements, one span per column.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> SoaSliceMut<'_, T> {
        let len = self.len;
        SoaSliceMut::from_parts(T::slices_mut(&mut self.arrays, 0..len), len)
    }

    /// Returns the per-field spans; pick a column by name (`soa.items().mass`).
    #[must_use]
    pub fn items(&self) -> T::Slices<'_> {
        T::slices(&self.arrays, 0..self.len)
    }

    /// Returns the mutable per-field spans (`soa.items_mut().mass[0] = 1.0`).
    #[must_use]
    pub fn items_mut(&mut self) -> T::SlicesMut<'_> {
        T::slices_mut(&mut self.arrays, 0..self.len)
    }

    /// Returns an iterator gathering each element in order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the `SoaArray` is full.
    pub fn append(&mut self, value: T) -> Result<(), SoaError> {
        self.reserve("append", 1)?;
        self.append_assume_capacity(value);
        Ok(())
    }

    /// Appends `value`.
    ///
    /// # Panics
    ///
    /// Panics if the `SoaArray` is full.
    pub fn append_assume_capacity(&mut self, value: T) {
        assert!(self.len < N, "SoaArray: ran out of capacity");
        self.write_slot(self.len, value);
        self.len += 1;
    }

    /// Reserves one slot at the end and returns its index. The slot's
    /// contents are unspecified until written with [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the `SoaArray` is full.
    pub fn add_one(&mut self) -> Result<usize, SoaError> {
        self.reserve("add_one", 1)?;
        Ok(self.add_one_assume_capacity())
    }

    /// Reserves one slot at the end and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the `SoaArray` is full.
    pub fn add_one_assume_capacity(&mut self) -> usize {
        assert!(self.len < N, "SoaArray: ran out of capacity");
        let index = self.len;
        self.len += 1;
        index
    }

    /// Removes and returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the `SoaArray` is empty.
    pub fn pop(&mut self) -> T {
        self.try_pop().expect("SoaArray: pop from empty array")
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn try_pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.read_slot(self.len))
    }

    /// Inserts `value` at `index`, shifting every later element right.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the `SoaArray` is full.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), SoaError> {
        self.reserve("insert", 1)?;
        self.insert_assume_capacity(index, value);
        Ok(())
    }

    /// Inserts `value` at `index`, shifting every later element right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or if the `SoaArray` is full.
    pub fn insert_assume_capacity(&mut self, index: usize, value: T) {
        assert!(index <= self.len, "index out of bounds");
        assert!(self.len < N, "SoaArray: ran out of capacity");
        // Only the displaced tail moves.
        self.shift(index..self.len, index + 1);
        self.write_slot(index, value);
        self.len += 1;
    }

    /// Inserts every element of `other` at `index`, preserving their order.
    ///
    /// `other` may be any [`SoaSource`], such as a `SoaArray` of a different
    /// capacity or a view over external spans.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the elements do not fit.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_multi<S>(&mut self, index: usize, other: &S) -> Result<(), SoaError>
    where
        S: SoaSource<T> + ?Sized,
    {
        assert!(index <= self.len, "index out of bounds");
        let src = other.soa_slice();
        self.reserve("insert_multi", src.len())?;
        self.splice_in(index, src);
        Ok(())
    }

    /// Appends every element of `other`.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the elements do not fit.
    pub fn append_multi<S>(&mut self, other: &S) -> Result<(), SoaError>
    where
        S: SoaSource<T> + ?Sized,
    {
        let src = other.soa_slice();
        self.reserve("append_multi", src.len())?;
        self.splice_in(self.len, src);
        Ok(())
    }

    /// Appends every element of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the elements do not fit.
    pub fn append_multi_assume_capacity<S>(&mut self, other: &S)
    where
        S: SoaSource<T> + ?Sized,
    {
        let src = other.soa_slice();
        assert!(src.len() <= N - self.len, "SoaArray: ran out of capacity");
        self.splice_in(self.len, src);
    }

    /// Appends every element of a field-major view.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the elements do not fit.
    pub fn append_soa(&mut self, view: SoaSlice<'_, T>) -> Result<(), SoaError> {
        self.reserve("append_soa", view.len())?;
        self.splice_in(self.len, view);
        Ok(())
    }

    /// Appends `count` copies of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if the copies do not fit.
    pub fn append_n_times(&mut self, value: T, count: usize) -> Result<(), SoaError> {
        self.reserve("append_n_times", count)?;
        self.append_n_times_assume_capacity(value, count);
        Ok(())
    }

    /// Appends `count` copies of `value`.
    ///
    /// # Panics
    ///
    /// Panics if the copies do not fit.
    pub fn append_n_times_assume_capacity(&mut self, value: T, count: usize) {
        assert!(count <= N - self.len, "SoaArray: ran out of capacity");
        let start = self.len;
        {
            let mut window = T::slices_mut(&mut self.arrays, start..start + count);
            for i in 0..count {
                T::write(&mut window, i, value);
            }
        }
        self.len += count;
    }

    /// Removes and returns the element at `index`, shifting every later
    /// element left. Preserves ordering.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn ordered_remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "index out of bounds");
        let value = self.read_slot(index);
        self.shift(index + 1..self.len, index);
        self.len -= 1;
        value
    }

    /// Removes the element at `index` by moving the last element into its
    /// slot. Does not preserve ordering.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "index out of bounds");
        let value = self.read_slot(index);
        let last = self.len - 1;
        if index != last {
            self.shift(last..self.len, index);
        }
        self.len = last;
        value
    }

    /// Swaps the elements at `a` and `b` in every column.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= len`.
    pub fn swap(&mut self, a: usize, b: usize) {
        assert!(a < self.len && b < self.len, "index out of bounds");
        if a != b {
            T::for_each_field(&mut self.columns_mut(), &mut SwapSlots { a, b });
        }
    }

    /// Reverses the order of the elements.
    pub fn reverse(&mut self) {
        let len = self.len;
        for i in 0..len / 2 {
            self.swap(i, len - i - 1);
        }
    }

    /// Builds a `SoaArray` from whole records, scattering each one.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `records.len() > N`.
    pub fn from_slice(records: &[T]) -> Result<Self, SoaError> {
        if records.len() > N {
            return Err(Self::exceeded("from_slice", records.len()));
        }
        let mut soa = Self::new();
        {
            let mut columns = T::slices_mut(&mut soa.arrays, 0..records.len());
            for (i, record) in records.iter().enumerate() {
                T::write(&mut columns, i, *record);
            }
        }
        soa.len = records.len();
        Ok(soa)
    }

    /// Builds a `SoaArray` from a field-major view, copying each column.
    ///
    /// # Errors
    ///
    /// Returns [`SoaError::CapacityExceeded`] if `view.len() > N`.
    pub fn from_soa(view: SoaSlice<'_, T>) -> Result<Self, SoaError> {
        if view.len() > N {
            return Err(Self::exceeded("from_soa", view.len()));
        }
        let mut soa = Self::new();
        soa.splice_in(0, view);
        Ok(soa)
    }

    /// Gathers every element into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst.len() != len`.
    pub fn copy_to_slice(&self, dst: &mut [T]) {
        assert_eq!(
            dst.len(),
            self.len,
            "destination and source slices have different lengths"
        );
        for (slot, value) in dst.iter_mut().zip(self.iter()) {
            *slot = value;
        }
    }

    fn reserve(&self, op: &'static str, additional: usize) -> Result<(), SoaError> {
        if additional > N - self.len {
            return Err(Self::exceeded(op, self.len.saturating_add(additional)));
        }
        Ok(())
    }

    fn exceeded(op: &'static str, requested: usize) -> SoaError {
        soa_debug!("{op}: {requested} slots requested, capacity is {}", N);
        SoaError::CapacityExceeded
    }

    /// All `N` slots of every column.
    fn columns_mut(&mut self) -> T::SlicesMut<'_> {
        T::slices_mut(&mut self.arrays, 0..N)
    }

    fn read_slot(&self, index: usize) -> T {
        T::read(&T::slices(&self.arrays, 0..N), index)
    }

    fn write_slot(&mut self, index: usize, value: T) {
        T::write(&mut self.columns_mut(), index, value);
    }

    /// Copies slots `src` to start at `dest`, in every column.
    fn shift(&mut self, src: Range<usize>, dest: usize) {
        if src.is_empty() || src.start == dest {
            return;
        }
        T::for_each_field(&mut self.columns_mut(), &mut CopyWithin { src, dest });
    }

    /// Opens a gap of `src.len()` slots at `index` and copies `src` into it.
    /// Capacity must already be checked.
    fn splice_in(&mut self, index: usize, src: SoaSlice<'_, T>) {
        let count = src.len();
        self.shift(index..self.len, index + count);
        T::copy_from(
            &mut T::slices_mut(&mut self.arrays, index..index + count),
            &src.into_inner(),
        );
        self.len += count;
        soa_trace!("spliced {count} elements at {index}, len now {}", self.len);
    }
}

impl<T: SoaElement + fmt::Debug, const N: usize> fmt::Debug for SoaArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize, const M: usize> PartialEq<SoaArray<T, M>> for SoaArray<T, N>
where
    T: SoaElement + PartialEq,
{
    fn eq(&self, other: &SoaArray<T, M>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: SoaElement + Eq, const N: usize> Eq for SoaArray<T, N> {}

impl<T: SoaElement, const N: usize> TryFrom<&[T]> for SoaArray<T, N> {
    type Error = SoaError;

    fn try_from(records: &[T]) -> Result<Self, Self::Error> {
        Self::from_slice(records)
    }
}

impl<T: SoaElement, const N: usize> TryFrom<SoaSlice<'_, T>> for SoaArray<T, N> {
    type Error = SoaError;

    fn try_from(view: SoaSlice<'_, T>) -> Result<Self, Self::Error> {
        Self::from_soa(view)
    }
}

impl<'a, T: SoaElement, const N: usize> IntoIterator for &'a SoaArray<T, N> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
