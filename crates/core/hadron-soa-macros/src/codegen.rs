//! Code generation for `#[derive(Soa)]`.
//!
//! A struct lowers to a flat list of storage columns, one per field, and the
//! array, slice and visitor plumbing is emitted from that list. An enum is
//! stored in the library's variant columns instead: the derive only emits the
//! tag enum, the payload chain type and the conversions to and from a
//! `Slot`, so no `unsafe` ends up in the deriving crate.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::parse::{ElementDef, ElementKind, FieldDef, FieldStyle, VariantDef};

/// One storage column of the generated layout.
struct Column {
    name: Ident,
    ty: TokenStream,
    /// Expression producing the value fresh slots are filled with.
    init: TokenStream,
}

/// Names of the generated companion types.
struct Names {
    arrays: Ident,
    slices: Ident,
    slices_mut: Ident,
}

/// Generates the complete derive output for an element.
pub fn generate(def: &ElementDef) -> TokenStream {
    let names = Names {
        arrays: format_ident!("{}Arrays", def.name),
        slices: format_ident!("{}Slices", def.name),
        slices_mut: format_ident!("{}SlicesMut", def.name),
    };

    match &def.kind {
        ElementKind::Struct { style, fields } => generate_struct(def, &names, *style, fields),
        ElementKind::Enum {
            repr,
            index,
            variants,
        } => generate_enum(def, &names, repr, index, variants),
    }
}

fn generate_struct(
    def: &ElementDef,
    names: &Names,
    style: FieldStyle,
    fields: &[FieldDef],
) -> TokenStream {
    let vis = &def.vis;
    let name = &def.name;
    let Names {
        arrays,
        slices,
        slices_mut,
    } = names;

    let columns: Vec<Column> = fields
        .iter()
        .map(|f| {
            let ty = &f.ty;
            Column {
                name: f.span_name.clone(),
                ty: quote! { #ty },
                init: quote! { <#ty as ::core::default::Default>::default() },
            }
        })
        .collect();

    let span_names: Vec<&Ident> = columns.iter().map(|c| &c.name).collect();
    let span_tys: Vec<&TokenStream> = columns.iter().map(|c| &c.ty).collect();
    let span_strs = columns.iter().map(|c| c.name.to_string());
    let bindings = bindings(fields.len());

    let slices_doc = format!("Read-only per-field spans of [`{name}`] elements.");
    let slices_mut_doc = format!("Mutable per-field spans of [`{name}`] elements.");

    let gathered = construct(&quote! { Self }, style, fields, |i| {
        let span = &fields[i].span_name;
        quote! { slices.#span[index] }
    });
    let pattern = construct(&quote! { Self }, style, fields, |i| {
        let binding = &bindings[i];
        quote! { #binding }
    });

    let storage = generate_storage(def, arrays, &columns);
    let common = generate_common_fns(names, &columns);

    quote! {
        #storage

        #[doc = #slices_doc]
        #[allow(missing_docs)]
        #[derive(Clone, Copy)]
        #vis struct #slices<'a> {
            #( pub #span_names: &'a [#span_tys], )*
        }

        #[doc = #slices_mut_doc]
        #[allow(missing_docs)]
        #vis struct #slices_mut<'a> {
            #( pub #span_names: &'a mut [#span_tys], )*
        }

        #[automatically_derived]
        impl ::hadron_soa::SoaElement for #name {
            type Arrays<const N: usize> = #arrays<N>;
            type Slices<'a> = #slices<'a> where Self: 'a;
            type SlicesMut<'a> = #slices_mut<'a> where Self: 'a;

            const FIELDS: &'static [::hadron_soa::FieldInfo] = &[
                #( ::hadron_soa::FieldInfo::of::<#span_tys>(#span_strs), )*
            ];

            #[inline]
            fn read(slices: &Self::Slices<'_>, index: usize) -> Self {
                #gathered
            }

            #[inline]
            fn write(slices: &mut Self::SlicesMut<'_>, index: usize, value: Self) {
                let #pattern = value;
                #( slices.#span_names[index] = #bindings; )*
            }

            #common
        }
    }
}

fn generate_enum(
    def: &ElementDef,
    names: &Names,
    repr: &Ident,
    index: &Ident,
    variants: &[VariantDef],
) -> TokenStream {
    let vis = &def.vis;
    let name = &def.name;
    let Names {
        arrays,
        slices,
        slices_mut,
    } = names;
    let tag = format_ident!("{}Tag", name);
    let payload = format_ident!("{}Payload", name);
    let soa = quote! { ::hadron_soa::variant };

    let tag_variants = variants.iter().enumerate().map(|(i, v)| {
        let vname = &v.name;
        let default_attr = (i == 0).then(|| quote! { #[default] });
        match &v.discriminant {
            Some(expr) => quote! { #default_attr #vname = #expr },
            None => quote! { #default_attr #vname },
        }
    });
    let variant_names = variants.iter().map(|v| &v.name);

    // Either<V0, Either<V1, .. Either<Vn, End>>>
    let payload_ty = variants
        .iter()
        .rev()
        .fold(quote! { #soa::End }, |rest, v| {
            let tys = v.fields.iter().map(|f| &f.ty);
            quote! { #soa::Either<( #( #tys, )* ), #rest> }
        });

    let first = &variants[0];
    let first_name = &first.name;
    let first_default = construct(&quote! { Self::#first_name }, first.style, &first.fields, |i| {
        let ty = &first.fields[i].ty;
        quote! { <#ty as ::core::default::Default>::default() }
    });

    let into_arms = variants.iter().enumerate().map(|(depth, v)| {
        let vname = &v.name;
        let bindings = bindings(v.fields.len());
        let pattern = construct(&quote! { Self::#vname }, v.style, &v.fields, |i| {
            let binding = &bindings[i];
            quote! { #binding }
        });
        let slot = (0..depth).fold(
            quote! { #soa::Slot::head(( #( #bindings, )* )) },
            |inner, _| quote! { #soa::Slot::tail(#inner) },
        );
        quote! { #pattern => #slot, }
    });

    let last = variants.len() - 1;
    let from_steps = variants.iter().enumerate().map(|(depth, v)| {
        let vname = &v.name;
        let bindings = bindings(v.fields.len());
        let value = construct(&quote! { Self::#vname }, v.style, &v.fields, |i| {
            let binding = &bindings[i];
            quote! { #binding }
        });
        if depth == last {
            quote! {
                match slot.split() {
                    ::core::result::Result::Ok(( #( #bindings, )* )) => #value,
                    ::core::result::Result::Err(rest) => rest.exhausted(),
                }
            }
        } else {
            quote! {
                let slot = match slot.split() {
                    ::core::result::Result::Ok(( #( #bindings, )* )) => return #value,
                    ::core::result::Result::Err(rest) => rest,
                };
            }
        }
    });

    let tag_doc = format!("Discriminant of a [`{name}`] slot.");
    let payload_doc = format!("Variant fields of a [`{name}`] slot, without the discriminant.");
    let arrays_doc = format!("Fixed-capacity variant and payload columns of [`{name}`] elements.");
    let slices_doc = format!("Read-only variant and payload spans of [`{name}`] elements.");
    let slices_mut_doc = format!("Mutable variant and payload spans of [`{name}`] elements.");

    quote! {
        #[doc = #tag_doc]
        #[allow(missing_docs)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
        #[repr(#repr)]
        #vis enum #tag {
            #( #tag_variants, )*
        }

        #[doc = #payload_doc]
        #vis type #payload = #payload_ty;

        #[doc = #arrays_doc]
        #vis type #arrays<const N: usize> = #soa::VariantArrays<#name, N>;

        #[doc = #slices_doc]
        #vis type #slices<'a> = #soa::VariantSlices<'a, #name>;

        #[doc = #slices_mut_doc]
        #vis type #slices_mut<'a> = #soa::VariantSlicesMut<'a, #name>;

        #[automatically_derived]
        impl #soa::SoaVariants for #name {
            type Tag = #tag;
            type Index = #index;
            type Payload = #payload;

            const TAGS: &'static [#tag] = &[ #( #tag::#variant_names, )* ];

            #[inline]
            fn into_slot(self) -> #soa::Slot<#payload> {
                match self {
                    #( #into_arms )*
                }
            }

            #[inline]
            fn from_slot(slot: #soa::Slot<#payload>) -> Self {
                #( #from_steps )*
            }
        }

        #[automatically_derived]
        impl ::hadron_soa::SoaElement for #name {
            type Arrays<const N: usize> = #arrays<N>;
            type Slices<'a> = #slices<'a> where Self: 'a;
            type SlicesMut<'a> = #slices_mut<'a> where Self: 'a;

            const FIELDS: &'static [::hadron_soa::FieldInfo] = &[
                ::hadron_soa::FieldInfo::of::<#index>("tags"),
                ::hadron_soa::FieldInfo::of::<#payload>("data"),
            ];

            fn new_arrays<const N: usize>() -> Self::Arrays<N> {
                #soa::VariantArrays::filled(#first_default)
            }

            #[inline]
            fn slices<const N: usize>(
                arrays: &Self::Arrays<N>,
                range: ::core::ops::Range<usize>,
            ) -> Self::Slices<'_> {
                arrays.slices(range)
            }

            #[inline]
            fn slices_mut<const N: usize>(
                arrays: &mut Self::Arrays<N>,
                range: ::core::ops::Range<usize>,
            ) -> Self::SlicesMut<'_> {
                arrays.slices_mut(range)
            }

            #[inline]
            fn reborrow<'b>(slices: &'b Self::SlicesMut<'_>) -> Self::Slices<'b> {
                slices.as_slices()
            }

            #[inline]
            fn narrow<'b>(slices: &'b Self::Slices<'_>) -> Self::Slices<'b> {
                *slices
            }

            fn slices_len(slices: &Self::Slices<'_>) -> usize {
                slices.len()
            }

            #[inline]
            fn read(slices: &Self::Slices<'_>, index: usize) -> Self {
                slices.get(index)
            }

            #[inline]
            fn write(slices: &mut Self::SlicesMut<'_>, index: usize, value: Self) {
                slices.set(index, value);
            }

            fn copy_from(dst: &mut Self::SlicesMut<'_>, src: &Self::Slices<'_>) {
                dst.copy_from(src);
            }

            fn for_each_field<V: ::hadron_soa::FieldVisitor>(
                slices: &mut Self::SlicesMut<'_>,
                visitor: &mut V,
            ) {
                slices.visit(visitor);
            }
        }
    }
}

/// Emits the backing array struct.
fn generate_storage(def: &ElementDef, arrays: &Ident, columns: &[Column]) -> TokenStream {
    let vis = &def.vis;
    let doc = format!(
        "Fixed-capacity backing arrays of [`{}`] elements, one per column.",
        def.name
    );
    let span_names = columns.iter().map(|c| &c.name);
    let span_tys = columns.iter().map(|c| &c.ty);

    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy)]
        #vis struct #arrays<const N: usize> {
            #( #span_names: [#span_tys; N], )*
        }
    }
}

/// Emits the `SoaElement` methods that only depend on the column list.
fn generate_common_fns(names: &Names, columns: &[Column]) -> TokenStream {
    let Names {
        arrays,
        slices,
        slices_mut,
    } = names;
    let span_names: Vec<&Ident> = columns.iter().map(|c| &c.name).collect();
    let inits = columns.iter().map(|c| &c.init);
    let first = span_names[0];
    let rest = &span_names[1..];

    quote! {
        fn new_arrays<const N: usize>() -> Self::Arrays<N> {
            #arrays {
                #( #span_names: [#inits; N], )*
            }
        }

        #[inline]
        fn slices<const N: usize>(
            arrays: &Self::Arrays<N>,
            range: ::core::ops::Range<usize>,
        ) -> Self::Slices<'_> {
            #slices {
                #( #span_names: &arrays.#span_names[range.clone()], )*
            }
        }

        #[inline]
        fn slices_mut<const N: usize>(
            arrays: &mut Self::Arrays<N>,
            range: ::core::ops::Range<usize>,
        ) -> Self::SlicesMut<'_> {
            #slices_mut {
                #( #span_names: &mut arrays.#span_names[range.clone()], )*
            }
        }

        #[inline]
        fn reborrow<'b>(slices: &'b Self::SlicesMut<'_>) -> Self::Slices<'b> {
            #slices {
                #( #span_names: &*slices.#span_names, )*
            }
        }

        #[inline]
        fn narrow<'b>(slices: &'b Self::Slices<'_>) -> Self::Slices<'b> {
            *slices
        }

        fn slices_len(slices: &Self::Slices<'_>) -> usize {
            let len = slices.#first.len();
            #(
                assert!(
                    slices.#rest.len() == len,
                    "field spans differ in length",
                );
            )*
            len
        }

        fn copy_from(dst: &mut Self::SlicesMut<'_>, src: &Self::Slices<'_>) {
            #( dst.#span_names.copy_from_slice(src.#span_names); )*
        }

        fn for_each_field<V: ::hadron_soa::FieldVisitor>(
            slices: &mut Self::SlicesMut<'_>,
            visitor: &mut V,
        ) {
            #( visitor.visit(&mut *slices.#span_names); )*
        }
    }
}

/// Local binding names `__field_0`, `__field_1`, ...
fn bindings(count: usize) -> Vec<Ident> {
    (0..count).map(|i| format_ident!("__field_{}", i)).collect()
}

/// Builds a constructor expression or pattern for `path` in the given style,
/// taking the value of field `i` from `value(i)`.
fn construct(
    path: &TokenStream,
    style: FieldStyle,
    fields: &[FieldDef],
    value: impl Fn(usize) -> TokenStream,
) -> TokenStream {
    match style {
        FieldStyle::Named => {
            let entries = fields.iter().enumerate().map(|(i, f)| {
                let ident = f.ident.as_ref().unwrap_or(&f.span_name);
                let v = value(i);
                quote! { #ident: #v }
            });
            quote! { #path { #( #entries, )* } }
        }
        FieldStyle::Unnamed => {
            let entries = (0..fields.len()).map(value);
            quote! { #path( #( #entries, )* ) }
        }
        FieldStyle::Unit => quote! { #path },
    }
}
