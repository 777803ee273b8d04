//! Tag and payload storage for enum elements.
//!
//! An enum element is stored as two columns: a small integer naming the
//! active variant, and a payload union holding that variant's fields without
//! the discriminant. Both columns are owned by this module. A variant number
//! and a payload are only ever created together by [`Slot`], written
//! together, and moved together, so no safe code can pair a payload with the
//! wrong variant number. `#[derive(Soa)]` builds on these types and emits no
//! `unsafe` of its own.
//!
//! # Payload layout
//!
//! The payload of an enum with variants `A(a..)`, `B(b..)`, `C(c..)` is
//! `Either<(a..), Either<(b..), Either<(c..), End>>>`. Every `Either` is a
//! `#[repr(C)]` union, so the whole chain is as large as the largest variant
//! tuple, exactly like a flat union with one member per variant.
//!
//! # Sealed columns
//!
//! The span types expose reads and whole-element writes only. Neither column
//! can be borrowed mutably on its own:
//!
//! ```compile_fail,E0616
//! use hadron_soa::{Soa, SoaArray};
//!
//! #[derive(Clone, Copy, Soa)]
//! enum Event {
//!     Key(u32),
//!     Move(f32),
//! }
//!
//! let mut soa = SoaArray::<Event, 4>::new();
//! soa.append(Event::Move(1.0)).unwrap();
//! soa.items_mut().index[0] = 0;
//! ```
//!
//! and spans cannot be assembled from arbitrary slices:
//!
//! ```compile_fail,E0451
//! use hadron_soa::{Soa, SoaSlice};
//!
//! #[derive(Clone, Copy, Soa)]
//! enum Event {
//!     Key(u32),
//!     Move(f32),
//! }
//!
//! let index = [1u8];
//! let view = SoaSlice::<Event>::new(EventSlices { index: &index, data: &[] });
//! ```

use core::fmt;
use core::ops::Range;

use crate::element::FieldVisitor;

mod sealed {
    pub trait Sealed {}
}

/// Integer type of an enum's variant-number column.
///
/// Implemented for `u8`, `u16` and `u32` only.
pub trait VariantIndex: Copy + Default + fmt::Debug + Eq + 'static + sealed::Sealed {
    /// Converts a variant number into a column entry.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit.
    fn from_usize(index: usize) -> Self;

    /// Converts a column entry back into a variant number.
    fn to_usize(self) -> usize;
}

macro_rules! variant_index {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}

        impl VariantIndex for $ty {
            #[inline]
            fn from_usize(index: usize) -> Self {
                Self::try_from(index).expect("variant number does not fit the index column")
            }

            #[inline]
            fn to_usize(self) -> usize {
                usize::try_from(self).expect("variant number does not fit in usize")
            }
        }
    )*};
}

variant_index!(u8, u16, u32);

/// Payload of one variant (`head`) or of one of the variants after it
/// (`tail`).
///
/// The members are private; values are only built through [`Slot`].
#[derive(Clone, Copy)]
#[repr(C)]
pub union Either<H: Copy, T: Copy> {
    head: H,
    tail: T,
}

/// Terminates an [`Either`] chain. Never holds a live payload.
#[derive(Debug, Clone, Copy)]
pub struct End;

/// A payload together with the number of the variant it holds.
///
/// For a `Slot<Either<H, T>>`, variant `0` means `head` is live and any other
/// number `k` means `tail` holds variant `k - 1` of `T`. The constructors
/// below are the only way to build a slot, and they keep that true.
#[derive(Clone, Copy)]
pub struct Slot<P> {
    index: usize,
    payload: P,
}

impl<P> Slot<P> {
    /// Number of the variant this slot holds.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<H: Copy, T: Copy> Slot<Either<H, T>> {
    /// Holds `value` as the first variant of the chain.
    #[inline]
    #[must_use]
    pub fn head(value: H) -> Self {
        Self {
            index: 0,
            payload: Either { head: value },
        }
    }

    /// Holds a slot of the remaining variants.
    #[inline]
    #[must_use]
    pub fn tail(rest: Slot<T>) -> Self {
        Self {
            index: rest.index + 1,
            payload: Either { tail: rest.payload },
        }
    }

    /// Returns the first variant's fields, or the slot of the remaining
    /// variants.
    #[inline]
    pub fn split(self) -> Result<H, Slot<T>> {
        if self.index == 0 {
            // SAFETY: variant 0 of an `Either` slot is only built by `head`.
            Ok(unsafe { self.payload.head })
        } else {
            // SAFETY: any other variant is only built by `tail`.
            let payload = unsafe { self.payload.tail };
            Err(Slot {
                index: self.index - 1,
                payload,
            })
        }
    }
}

impl Slot<End> {
    /// Ends a [`Slot::split`] chain.
    ///
    /// # Panics
    ///
    /// Always. A `Slot<End>` cannot be constructed, so this is never reached.
    pub fn exhausted(self) -> ! {
        unreachable!("variant number {} past the last variant", self.index)
    }
}

/// An enum whose variants are stored as a variant number plus payload.
///
/// Implemented by `#[derive(Soa)]`.
pub trait SoaVariants: Copy + 'static {
    /// Fieldless mirror of the enum, naming each variant.
    type Tag: Copy + fmt::Debug + Eq + 'static;
    /// Integer type of the variant-number column.
    type Index: VariantIndex;
    /// [`Either`] chain with one member per variant.
    type Payload: Copy + 'static;

    /// Tag of every variant, by variant number.
    const TAGS: &'static [Self::Tag];

    /// Splits a value into its variant number and payload.
    fn into_slot(self) -> Slot<Self::Payload>;

    /// Rebuilds a value from its variant number and payload.
    fn from_slot(slot: Slot<Self::Payload>) -> Self;
}

fn tag_of<E: SoaVariants>(index: E::Index) -> E::Tag {
    E::TAGS[index.to_usize()]
}

/// Fixed-capacity variant-number and payload columns.
pub struct VariantArrays<E: SoaVariants, const N: usize> {
    index: [E::Index; N],
    data: [E::Payload; N],
}

impl<E: SoaVariants, const N: usize> Clone for VariantArrays<E, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: SoaVariants, const N: usize> Copy for VariantArrays<E, N> {}

impl<E: SoaVariants, const N: usize> VariantArrays<E, N> {
    /// Creates columns with every slot holding `fill`.
    #[must_use]
    pub fn filled(fill: E) -> Self {
        let slot = fill.into_slot();
        Self {
            index: [E::Index::from_usize(slot.index); N],
            data: [slot.payload; N],
        }
    }

    /// Borrows `range` of both columns.
    #[inline]
    #[must_use]
    pub fn slices(&self, range: Range<usize>) -> VariantSlices<'_, E> {
        VariantSlices {
            index: &self.index[range.clone()],
            data: &self.data[range],
        }
    }

    /// Mutably borrows `range` of both columns.
    #[inline]
    pub fn slices_mut(&mut self, range: Range<usize>) -> VariantSlicesMut<'_, E> {
        VariantSlicesMut {
            index: &mut self.index[range.clone()],
            data: &mut self.data[range],
        }
    }
}

/// Read-only variant-number and payload spans of enum elements.
pub struct VariantSlices<'a, E: SoaVariants> {
    index: &'a [E::Index],
    data: &'a [E::Payload],
}

impl<E: SoaVariants> Clone for VariantSlices<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: SoaVariants> Copy for VariantSlices<'_, E> {}

impl<'a, E: SoaVariants> VariantSlices<'a, E> {
    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the variant held by slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn tag(&self, index: usize) -> E::Tag {
        tag_of::<E>(self.index[index])
    }

    /// Iterates over the variant held by every slot.
    pub fn tags(&self) -> impl DoubleEndedIterator<Item = E::Tag> + ExactSizeIterator + use<'a, E> {
        self.index.iter().map(|&i| tag_of::<E>(i))
    }

    /// Reads the element in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> E {
        E::from_slot(Slot {
            index: self.index[index].to_usize(),
            payload: self.data[index],
        })
    }
}

impl<E: SoaVariants> fmt::Debug for VariantSlices<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}

/// Mutable variant-number and payload spans of enum elements.
pub struct VariantSlicesMut<'a, E: SoaVariants> {
    index: &'a mut [E::Index],
    data: &'a mut [E::Payload],
}

impl<E: SoaVariants> VariantSlicesMut<'_, E> {
    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Reborrows as read-only spans.
    #[inline]
    #[must_use]
    pub fn as_slices(&self) -> VariantSlices<'_, E> {
        VariantSlices {
            index: &*self.index,
            data: &*self.data,
        }
    }

    /// Returns the variant held by slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn tag(&self, index: usize) -> E::Tag {
        tag_of::<E>(self.index[index])
    }

    /// Reads the element in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> E {
        self.as_slices().get(index)
    }

    /// Overwrites slot `index` with `value`, variant number and payload
    /// together.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, value: E) {
        let slot = value.into_slot();
        self.data[index] = slot.payload;
        self.index[index] = E::Index::from_usize(slot.index);
    }

    /// Copies every slot of the equally long `src`.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn copy_from(&mut self, src: &VariantSlices<'_, E>) {
        self.index.copy_from_slice(src.index);
        self.data.copy_from_slice(src.data);
    }

    /// Runs `visitor` on the variant-number column, then the payload column.
    ///
    /// [`FieldVisitor`] is sealed; every visitor applies the same slot
    /// movement to both columns.
    pub fn visit<V: FieldVisitor>(&mut self, visitor: &mut V) {
        visitor.visit(&mut *self.index);
        visitor.visit(&mut *self.data);
    }
}

impl<E: SoaVariants> fmt::Debug for VariantSlicesMut<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slices().fmt(f)
    }
}
