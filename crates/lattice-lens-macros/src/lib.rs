//! Procedural macros for lattice-lens field introspection.
//!
//! This crate provides the `#[derive(Reflect)]` macro, which generates the
//! `Reflect` and `Record` implementations the lattice-lens models use to
//! enumerate, name, and read the fields of a struct.
//!
//! # Attributes
//!
//! ## `#[lens(...)]`
//!
//! Field-level configuration:
//!
//! ```ignore
//! #[derive(Reflect)]
//! struct Account {
//!     #[lens(rename = "Login")]
//!     user: String,
//!
//!     #[lens(skip)]
//!     secret: Vec<u8>,
//!
//!     #[lens(flatten)]
//!     audit: Audit,
//!
//!     #[lens(tag = "Balance,cents")]
//!     balance: i64,
//! }
//! ```
//!
//! Field attributes:
//! - `skip`: Excludes the field. Its type does not need to implement `Reflect`.
//! - `rename = "Name"`: Displays the field as `Name`
//! - `tag = "Name,rest"`: Sets the raw annotation string; the first element renames
//! - `flatten`: Splices the fields of an embedded record into the parent.
//!   A flattened field that also carries a name is shown as a single field,
//!   as is one whose type is not a record type (`Box<dyn Reflect>`) or is
//!   already being flattened further out.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, LitStr};

/// Derive `Reflect` and `Record` for a struct with named fields.
///
/// This macro generates:
/// - A static `RecordInfo` describing every field in declaration order
/// - An implementation of `Reflect` reporting `Shape::Record`
/// - An implementation of `Record` giving indexed access to the fields
///
/// # Example
///
/// ```ignore
/// use lattice_lens::Reflect;
///
/// #[derive(Reflect)]
/// struct Person {
///     #[lens(rename = "Name")]
///     name: String,
///     age: u32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(lens))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[lens(...)]` configuration of one field.
#[derive(Default)]
struct LensAttrs {
    skip: bool,
    flatten: bool,
    tag: Option<String>,
}

fn impl_derive_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect derive does not support generic structs; implement Reflect by hand",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Reflect derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Reflect derive only supports structs",
            ))
        }
    };

    let mut field_infos = Vec::with_capacity(fields.len());
    let mut accessors = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let attrs = parse_lens_attrs(field)?;
        field_infos.push(generate_field_info(field, &attrs));
        if !attrs.skip {
            let ident = &field.ident;
            accessors.push(quote! {
                #index => ::core::option::Option::Some(&self.#ident),
            });
        }
    }

    let expanded = quote! {
        const _: () = {
            static RECORD: ::lattice_lens::reflect::RecordInfo = ::lattice_lens::reflect::RecordInfo {
                type_name: stringify!(#struct_name),
                fields: &[#(#field_infos),*],
            };

            impl ::lattice_lens::reflect::Reflect for #struct_name {
                fn shape() -> ::lattice_lens::reflect::Shape {
                    ::lattice_lens::reflect::Shape::Record(&RECORD)
                }

                fn reflect(&self) -> ::lattice_lens::reflect::ValueRef<'_> {
                    ::lattice_lens::reflect::ValueRef::Record(self)
                }
            }

            impl ::lattice_lens::reflect::Record for #struct_name {
                fn record_info(&self) -> &'static ::lattice_lens::reflect::RecordInfo {
                    &RECORD
                }

                fn field(
                    &self,
                    index: usize,
                ) -> ::core::option::Option<&dyn ::lattice_lens::reflect::Reflect> {
                    match index {
                        #(#accessors)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        };
    };

    Ok(expanded)
}

/// Generate the `FieldInfo` literal for one field.
fn generate_field_info(field: &Field, attrs: &LensAttrs) -> TokenStream2 {
    let name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();
    let tag = if attrs.skip {
        "-".to_string()
    } else {
        attrs.tag.clone().unwrap_or_default()
    };
    let embedded = attrs.flatten;
    let shape = if attrs.skip {
        quote! { ::lattice_lens::reflect::Shape::opaque }
    } else {
        let ty = &field.ty;
        quote! { <#ty as ::lattice_lens::reflect::Reflect>::shape }
    };

    quote! {
        ::lattice_lens::reflect::FieldInfo {
            name: #name,
            tag: #tag,
            embedded: #embedded,
            shape: #shape,
        }
    }
}

/// Parse the `#[lens(...)]` attributes of a field.
fn parse_lens_attrs(field: &Field) -> syn::Result<LensAttrs> {
    let mut result = LensAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("lens") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("flatten") {
                result.flatten = true;
            } else if meta.path.is_ident("rename") || meta.path.is_ident("tag") {
                if result.tag.is_some() {
                    return Err(meta.error("field name is already set by `rename` or `tag`"));
                }
                let value: LitStr = meta.value()?.parse()?;
                if value.value() == "-" {
                    return Err(syn::Error::new_spanned(
                        &value,
                        "use `#[lens(skip)]` to exclude a field",
                    ));
                }
                result.tag = Some(value.value());
            } else {
                return Err(meta.error("unsupported lens attribute; expected `skip`, `rename`, `tag`, or `flatten`"));
            }
            Ok(())
        })?;
    }

    if result.skip && (result.flatten || result.tag.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` cannot be combined with `rename`, `tag`, or `flatten`",
        ));
    }

    Ok(result)
}
