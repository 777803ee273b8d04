//! Parsing of `#[derive(Soa)]` inputs.
//!
//! Lowers a [`DeriveInput`] into an [`ElementDef`]: the ordered field list of
//! a struct, or the variant list of an enum together with its discriminant
//! representation. All shape rejections happen here.

use proc_macro2::Span;
use syn::{Data, DeriveInput, Expr, Fields, Ident, Type, Visibility};

/// A parsed element type.
pub struct ElementDef {
    /// Visibility of the element, reused for every generated item.
    pub vis: Visibility,
    /// Name of the element type.
    pub name: Ident,
    /// Struct fields or enum variants.
    pub kind: ElementKind,
}

/// The shape of an element type.
pub enum ElementKind {
    /// A struct with named or positional fields.
    Struct {
        style: FieldStyle,
        fields: Vec<FieldDef>,
    },
    /// An enum with an explicit tag.
    Enum {
        /// Integer type of the generated tag enum.
        repr: Ident,
        /// Integer type of the stored variant numbers.
        index: Ident,
        variants: Vec<VariantDef>,
    },
}

/// How the fields of a struct or variant are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// `{ a: A, b: B }`
    Named,
    /// `(A, B)`
    Unnamed,
    /// No fields.
    Unit,
}

/// A single field.
pub struct FieldDef {
    /// Name of the field on the element (`None` for positional fields).
    pub ident: Option<Ident>,
    /// Name of the span on the generated slice structs.
    pub span_name: Ident,
    /// Field type.
    pub ty: Type,
}

/// A single enum variant.
pub struct VariantDef {
    /// Variant name, reused for the tag variant.
    pub name: Ident,
    pub style: FieldStyle,
    pub fields: Vec<FieldDef>,
    /// Explicit discriminant, carried over to the tag enum.
    pub discriminant: Option<Expr>,
}

impl ElementDef {
    /// Validates and lowers a derive input.
    pub fn from_derive(input: &DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "Soa cannot be derived for generic types",
            ));
        }

        let kind = match &input.data {
            Data::Struct(data) => {
                let (style, fields) = lower_fields(&data.fields);
                if fields.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "Soa requires a struct with at least one field",
                    ));
                }
                ElementKind::Struct { style, fields }
            }
            Data::Enum(data) => {
                if data.variants.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "Soa requires an enum with at least one variant",
                    ));
                }
                let variants = data
                    .variants
                    .iter()
                    .map(|variant| {
                        let (style, fields) = lower_fields(&variant.fields);
                        VariantDef {
                            name: variant.ident.clone(),
                            style,
                            fields,
                            discriminant: variant.discriminant.as_ref().map(|(_, e)| e.clone()),
                        }
                    })
                    .collect::<Vec<_>>();
                let repr = match tag_repr(input)? {
                    Some(repr) => repr,
                    // Explicit discriminants without a repr are `isize` in the element too.
                    None if variants.iter().any(|v| v.discriminant.is_some()) => {
                        Ident::new("isize", Span::call_site())
                    }
                    None => default_repr(variants.len()),
                };
                let index = default_repr(variants.len());
                ElementKind::Enum {
                    repr,
                    index,
                    variants,
                }
            }
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Soa cannot be derived for untagged unions; use an enum so every slot \
                     carries a discriminant",
                ));
            }
        };

        Ok(Self {
            vis: input.vis.clone(),
            name: input.ident.clone(),
            kind,
        })
    }
}

fn lower_fields(fields: &Fields) -> (FieldStyle, Vec<FieldDef>) {
    match fields {
        Fields::Named(named) => (
            FieldStyle::Named,
            named
                .named
                .iter()
                .map(|f| {
                    let ident = f.ident.clone().expect("named field has an ident");
                    FieldDef {
                        span_name: ident.clone(),
                        ident: Some(ident),
                        ty: f.ty.clone(),
                    }
                })
                .collect(),
        ),
        Fields::Unnamed(unnamed) => (
            FieldStyle::Unnamed,
            unnamed
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, f)| FieldDef {
                    ident: None,
                    span_name: Ident::new(&format!("_{i}"), Span::call_site()),
                    ty: f.ty.clone(),
                })
                .collect(),
        ),
        Fields::Unit => (FieldStyle::Unit, Vec::new()),
    }
}

/// Reads an integer `#[repr(..)]` from the element, if any.
fn tag_repr(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    const INT_REPRS: &[&str] = &[
        "u8", "u16", "u32", "u64", "usize", "i8", "i16", "i32", "i64", "isize",
    ];

    let mut repr = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            // `align(N)` / `packed(N)` carry arguments we do not care about.
            if meta.input.peek(syn::token::Paren) {
                let _args;
                syn::parenthesized!(_args in meta.input);
                return Ok(());
            }
            if let Some(ident) = meta.path.get_ident() {
                if INT_REPRS.contains(&ident.to_string().as_str()) {
                    repr = Some(ident.clone());
                }
            }
            Ok(())
        })?;
    }
    Ok(repr)
}

/// Smallest unsigned integer type able to number `count` variants.
fn default_repr(count: usize) -> Ident {
    let name = if count <= 1 << 8 {
        "u8"
    } else if count <= 1 << 16 {
        "u16"
    } else {
        "u32"
    };
    Ident::new(name, Span::call_site())
}
