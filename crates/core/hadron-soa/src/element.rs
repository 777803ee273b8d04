//! Element schemas: how a value type is split into per-field columns.
//!
//! A [`SoaElement`] describes the column layout of one element type and the
//! gather/scatter hooks that move values in and out of those columns. It is
//! normally implemented with `#[derive(Soa)]`, which emits the companion
//! array and slice types alongside the impl.
//!
//! # Layout
//!
//! - A struct gets one column per field, in declaration order.
//! - An enum gets two columns: `tags`, the number of the active variant,
//!   and `data`, a `#[repr(C)]` union chain holding the variant fields
//!   without the discriminant (see [`crate::variant`]). A slot therefore
//!   costs `size_of::<Index>() + size_of::<Payload>()` bytes instead of the
//!   padded `size_of::<Enum>()`.

use core::ops::Range;

/// Static description of a single storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Column name: the field name, `_0`.. for tuple structs, or `tags` /
    /// `data` for enums.
    pub name: &'static str,
    /// Size of one column entry in bytes.
    pub size: usize,
    /// Alignment of the column's entry type.
    pub align: usize,
}

impl FieldInfo {
    /// Describes a column of `F` entries named `name`.
    #[must_use]
    pub const fn of<F>(name: &'static str) -> Self {
        Self {
            name,
            size: core::mem::size_of::<F>(),
            align: core::mem::align_of::<F>(),
        }
    }

    /// Returns true if the column occupies no memory.
    #[must_use]
    pub const fn is_zero_sized(&self) -> bool {
        self.size == 0
    }
}

/// Sums the entry sizes of a column list.
#[must_use]
pub const fn slot_size(fields: &[FieldInfo]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].size;
        i += 1;
    }
    total
}

mod sealed {
    pub trait Sealed {}
}

/// Callback run once per column with that column's mutable span.
///
/// This is how the container performs column-wise work (shifts, swaps)
/// without knowing the concrete field types. The trait is sealed: the only
/// visitors apply the same slot movement to every column, which keeps enum
/// variant numbers paired with their payloads.
pub trait FieldVisitor: sealed::Sealed {
    /// Visits one column.
    fn visit<F: Copy>(&mut self, items: &mut [F]);
}

/// A value type that can be stored in structure-of-arrays form.
///
/// Use `#[derive(Soa)]` rather than implementing this by hand. All span
/// parameters passed to the hooks have equal lengths across columns.
pub trait SoaElement: Copy + 'static {
    /// One `[F; N]` per column.
    type Arrays<const N: usize>: Copy;
    /// One `&[F]` per column.
    type Slices<'a>: Copy
    where
        Self: 'a;
    /// One `&mut [F]` per column.
    type SlicesMut<'a>
    where
        Self: 'a;

    /// Columns in storage order.
    const FIELDS: &'static [FieldInfo];
    /// Bytes used by one slot across all columns.
    const SLOT_SIZE: usize = slot_size(Self::FIELDS);

    /// Creates backing arrays whose every slot holds a valid default value.
    fn new_arrays<const N: usize>() -> Self::Arrays<N>;

    /// Borrows `range` of every column.
    fn slices<const N: usize>(arrays: &Self::Arrays<N>, range: Range<usize>) -> Self::Slices<'_>;

    /// Mutably borrows `range` of every column.
    fn slices_mut<const N: usize>(
        arrays: &mut Self::Arrays<N>,
        range: Range<usize>,
    ) -> Self::SlicesMut<'_>;

    /// Reborrows mutable spans as read-only spans.
    fn reborrow<'b>(slices: &'b Self::SlicesMut<'_>) -> Self::Slices<'b>;

    /// Shortens the lifetime of read-only spans.
    ///
    /// `Self::Slices<'a>` is invariant in `'a` when seen through the trait,
    /// so generic code cannot rely on subtyping to do this.
    fn narrow<'b>(slices: &'b Self::Slices<'_>) -> Self::Slices<'b>;

    /// Returns the common length of every span.
    ///
    /// # Panics
    ///
    /// Panics if the spans differ in length.
    fn slices_len(slices: &Self::Slices<'_>) -> usize;

    /// Gathers the element at `index` from every column.
    fn read(slices: &Self::Slices<'_>, index: usize) -> Self;

    /// Scatters `value` into every column at `index`.
    fn write(slices: &mut Self::SlicesMut<'_>, index: usize, value: Self);

    /// Copies every column of `src` into the equally long columns of `dst`.
    fn copy_from(dst: &mut Self::SlicesMut<'_>, src: &Self::Slices<'_>);

    /// Runs `visitor` on every column, in storage order.
    fn for_each_field<V: FieldVisitor>(slices: &mut Self::SlicesMut<'_>, visitor: &mut V);
}

/// Copies `src` to `dest` within every column.
pub(crate) struct CopyWithin {
    pub src: Range<usize>,
    pub dest: usize,
}

impl sealed::Sealed for CopyWithin {}

impl FieldVisitor for CopyWithin {
    fn visit<F: Copy>(&mut self, items: &mut [F]) {
        items.copy_within(self.src.clone(), self.dest);
    }
}

/// Swaps two slots within every column.
pub(crate) struct SwapSlots {
    pub a: usize,
    pub b: usize,
}

impl sealed::Sealed for SwapSlots {}

impl FieldVisitor for SwapSlots {
    fn visit<F: Copy>(&mut self, items: &mut [F]) {
        // Nothing to move for zero-sized columns.
        if core::mem::size_of::<F>() != 0 {
            items.swap(self.a, self.b);
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::Soa;

    #[derive(Clone, Copy, Soa)]
    struct Mixed {
        a: u8,
        b: u64,
        marker: (),
    }

    #[derive(Clone, Copy, Debug, PartialEq, Soa)]
    #[allow(dead_code)]
    enum Event {
        Key { code: u32, pressed: bool },
        Move(f32, f32),
        Idle,
    }

    #[test]
    fn struct_fields_in_declaration_order() {
        let names: [&str; 3] = [
            Mixed::FIELDS[0].name,
            Mixed::FIELDS[1].name,
            Mixed::FIELDS[2].name,
        ];
        assert_eq!(names, ["a", "b", "marker"]);
        assert_eq!(Mixed::FIELDS[1].size, 8);
        assert_eq!(Mixed::FIELDS[1].align, core::mem::align_of::<u64>());
        assert!(Mixed::FIELDS[2].is_zero_sized());
    }

    #[test]
    fn slot_size_has_no_padding() {
        assert_eq!(Mixed::SLOT_SIZE, 9);
        assert!(Mixed::SLOT_SIZE < core::mem::size_of::<Mixed>());
    }

    #[test]
    fn enum_splits_into_tags_and_data() {
        assert_eq!(Event::FIELDS.len(), 2);
        assert_eq!(Event::FIELDS[0].name, "tags");
        assert_eq!(Event::FIELDS[0].size, 1);
        assert_eq!(Event::FIELDS[1].name, "data");
        // Largest variant is `Key { u32, bool }` / `Move(f32, f32)`: 8 bytes.
        assert_eq!(Event::FIELDS[1].size, 8);
        assert_eq!(Event::SLOT_SIZE, 9);
        assert!(Event::SLOT_SIZE < core::mem::size_of::<Event>());
    }

    #[test]
    fn enum_columns_are_library_types() {
        let mut soa = crate::SoaArray::<Event, 4>::new();
        soa.append(Event::Move(1.0, 2.0)).unwrap();
        soa.append(Event::Idle).unwrap();
        let items: crate::variant::VariantSlices<'_, Event> = soa.items();
        assert_eq!(items.tag(0), EventTag::Move);
        assert_eq!(items.get(1), Event::Idle);
    }

    #[test]
    fn slot_size_sums_columns() {
        let fields = [FieldInfo::of::<u32>("x"), FieldInfo::of::<u16>("y")];
        assert_eq!(slot_size(&fields), 6);
        assert_eq!(slot_size(&[]), 0);
    }
}
