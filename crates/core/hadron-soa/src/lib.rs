//! Fixed-capacity structure-of-arrays storage for `no_std` environments.
//!
//! This crate provides [`SoaArray`], a vector-like container that stores each
//! field of its element type in a separate contiguous array. Iterating over a
//! single field touches only that field's memory, and mixed-size fields waste
//! no space on per-element padding.
//!
//! # Features
//!
//! - **No heap**: all storage is inline, sized by a const generic capacity
//! - **Derived schemas**: `#[derive(Soa)]` on a struct or enum generates the
//!   column layout and named per-field spans
//! - **Enums without padding**: a variant-number column plus an untagged
//!   payload column, kept in step by the library
//! - **Capacity interop**: bulk copies accept any [`SoaSource`], including
//!   containers of a different capacity and views over external spans
//! - **Synchronized sort**: comparators see whole columns, and every column
//!   is permuted together
//!
//! # Modules
//!
//! - [`array`]: the [`SoaArray`] container
//! - [`element`]: the [`SoaElement`] schema trait
//! - [`slice`]: field-major views ([`SoaSlice`], [`SoaSliceMut`])
//! - [`variant`]: variant and payload columns of enum elements
//! - [`error`]: [`SoaError`]
//! - [`log`]: optional diagnostics sink
//!
//! # Example
//!
//! ```
//! use hadron_soa::{Soa, SoaArray};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Soa)]
//! enum Shape {
//!     Circle { radius: f32 },
//!     Rect(f32, f32),
//!     Empty,
//! }
//!
//! let mut shapes = SoaArray::<Shape, 8>::new();
//! shapes.append(Shape::Rect(2.0, 3.0)).unwrap();
//! shapes.append(Shape::Circle { radius: 1.0 }).unwrap();
//! shapes.append(Shape::Empty).unwrap();
//!
//! assert_eq!(shapes.items().tag(1), ShapeTag::Circle);
//! assert_eq!(shapes.get(0), Shape::Rect(2.0, 3.0));
//! ```

#![no_std]

extern crate self as hadron_soa;

pub mod array;
pub mod element;
pub mod error;
pub mod log;
pub mod slice;
mod sort;
pub mod variant;

pub use array::SoaArray;
pub use element::{FieldInfo, FieldVisitor, SoaElement, slot_size};
pub use error::SoaError;
pub use hadron_soa_macros::Soa;
pub use slice::{Iter, SoaSlice, SoaSliceMut, SoaSource};
pub use variant::{SoaVariants, VariantSlices, VariantSlicesMut};
