//! Procedural macros for the `fastdao` data-access layer.
//!
//! `#[derive(Entity)]` inspects a struct with named fields and generates the
//! `fastdao_core::Entity` registration for it:
//! - the field named `id` becomes the primary-key accessor (`String` or `Option<String>`);
//! - every other field is registered under its lowerCamel name (`user_name` -> `userName`),
//!   in declaration order;
//! - `#[entity(table = "...")]` overrides the table name;
//! - `#[fetch(skip)]` leaves a field out of the mapping.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Token,
};

use inflections::Inflect;

// --- Helper Structs & Functions for Parsing ---

/// A helper struct for parsing `key = "value"` style meta attributes.
struct MetaNameValue {
    pub path: syn::Path,
    pub _eq_token: Token![=],
    pub value: LitStr,
}

impl Parse for MetaNameValue {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Self {
            path: input.parse()?,
            _eq_token: input.parse()?,
            value: input.parse()?,
        })
    }
}

/// Holds parsed metadata about a single struct field.
struct FieldMetadata {
    ident: Ident,
    field_name: String,
    is_skipped: bool,
}

/// The Rust identifier without a raw-identifier prefix.
fn unraw(ident: &Ident) -> String {
    let s = ident.to_string();
    s.strip_prefix("r#").map(str::to_string).unwrap_or(s)
}

/// Parses all named fields from a `DeriveInput` struct.
fn parse_field_metadata(input: &DeriveInput) -> syn::Result<Vec<FieldMetadata>> {
    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Entity)] only supports structs with named fields.",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Entity)] can only be used on structs.",
            ))
        }
    };

    let mut out = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let mut is_skipped = false;
        for attr in &field.attrs {
            if attr.path().is_ident("fetch") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        is_skipped = true;
                        Ok(())
                    } else {
                        Err(meta.error("unsupported #[fetch(...)] option; expected `skip`"))
                    }
                })?;
            }
        }
        let raw = unraw(&ident);
        let field_name = if raw == "id" { raw } else { raw.to_camel_case() };
        out.push(FieldMetadata {
            ident,
            field_name,
            is_skipped,
        });
    }
    Ok(out)
}

/// Reads `#[entity(table = "...")]`, rejecting an empty table name.
fn parse_table_override(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        let MetaNameValue { path, value, .. } = attr.parse_args()?;
        if !path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                path,
                "unsupported #[entity(...)] option; expected `table = \"...\"`",
            ));
        }
        if value.value().trim().is_empty() {
            return Err(syn::Error::new_spanned(
                value,
                "#[entity(table = \"...\")] must not be empty",
            ));
        }
        table = Some(value.value());
    }
    Ok(table)
}

// --- `Entity` derive macro ---

#[proc_macro_derive(Entity, attributes(entity, fetch))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_entity(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand_entity(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let fields_metadata = parse_field_metadata(input)?;
    let table_name_override = parse_table_override(input)?;

    let table_call = table_name_override.map(|t| quote! { .table(#t) });

    let id_call = fields_metadata
        .iter()
        .find(|f| f.field_name == "id" && !f.is_skipped)
        .map(|f| {
            let ident = &f.ident;
            quote! {
                .id(
                    |e| ::fastdao_core::EntityId::to_id(&e.#ident),
                    |e, v| e.#ident = ::fastdao_core::EntityId::from_id(v),
                )
            }
        });

    let field_calls = fields_metadata
        .iter()
        .filter(|f| f.field_name != "id" && !f.is_skipped)
        .map(|f| {
            let ident = &f.ident;
            let name = &f.field_name;
            quote! {
                .field(
                    #name,
                    |e| ::fastdao_core::Value::from(::core::clone::Clone::clone(&e.#ident)),
                    |e, v| {
                        e.#ident = ::fastdao_core::FromValue::from_value(v)?;
                        ::core::result::Result::Ok(())
                    },
                )
            }
        });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::fastdao_core::Entity for #struct_name #ty_generics #where_clause {
            fn declare() -> ::fastdao_core::EntityDef<Self> {
                ::fastdao_core::EntityDef::<Self>::new(#type_name)
                    #table_call
                    #id_call
                    #(#field_calls)*
            }
        }
    })
}
