//! Proc-macro crate for `#[derive(Soa)]`.
//!
//! Derives the structure-of-arrays schema of an element type: one fixed-size
//! array per struct field, or a variant-number array plus a payload union
//! array for enums. The generated types plug into `hadron_soa::SoaArray` through the
//! `hadron_soa::SoaElement` trait.

mod codegen;
mod parse;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

use crate::parse::ElementDef;

/// Derives `hadron_soa::SoaElement` for a struct or a data-carrying enum.
///
/// # Generated Items
///
/// For an element type `Foo` with visibility `vis`:
///
/// - `FooArrays<const N: usize>`: the backing arrays
/// - `FooSlices<'a>` / `FooSlicesMut<'a>`: the spans. For structs these are
///   structs with one public span per field; for enums they are aliases of
///   `hadron_soa::variant::VariantSlices`/`VariantSlicesMut`, which only
///   hand out whole elements and tags
/// - enums only: `vis enum FooTag` (the discriminant), `vis type FooPayload`
///   (a union chain of the variant fields minus the discriminant) and an impl
///   of `hadron_soa::variant::SoaVariants`
///
/// The expansion contains no `unsafe`, so it can be used from crates with
/// `#![forbid(unsafe_code)]`.
///
/// # Requirements
///
/// - The element must be `Copy`, and every field type must be `Copy + Default`.
/// - Structs must have at least one field; enums at least one variant.
/// - Untagged `union`s and generic types are rejected.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, Soa)]
/// pub struct Particle {
///     pub mass: f32,
///     pub kind: u8,
/// }
///
/// #[derive(Clone, Copy, Soa)]
/// pub enum Shape {
///     Circle { radius: f32 },
///     Rect(f32, f32),
///     Empty,
/// }
/// ```
#[proc_macro_derive(Soa)]
pub fn derive_soa(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let def = ElementDef::from_derive(input)?;
    Ok(codegen::generate(&def))
}
