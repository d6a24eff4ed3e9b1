//! Derive macros for Potash.
//!
//! ## `Convertible`
//!
//! Converts a struct with named fields into a document value holding one
//! field per struct field, and back. Every field type must itself be
//! `Convertible`. Fields listed in `#[converter(ignored = "a, b")]` are not
//! stored and are filled with `Default::default()` when read. Fields missing
//! from a stored document are read as null, and stored fields without a
//! struct counterpart are ignored.
//!
//! Enums are stored as `{ "variant": name, "value": data }`.
//!
//! ## `PotashEntity`
//!
//! Declares a struct as a repository entity.
//!
//! ```rust,ignore
//! use potash::collection::PotashId;
//! use potash_derive::{Convertible, PotashEntity};
//!
//! #[derive(Convertible, PotashEntity)]
//! #[entity(
//!     name = "books",
//!     id(field = "isbn"),
//!     index(fields = "author"),
//!     index(fields = "year, title", index_type = "non-unique")
//! )]
//! pub struct Book {
//!     isbn: String,
//!     author: String,
//!     title: String,
//!     year: i32,
//! }
//! ```
//!
//! - `name` defaults to the struct name.
//! - `id(field = ..)` names the id field. A field of type `PotashId` (or
//!   `Option<PotashId>`) mirrors the document id; any other type gets a
//!   unique index. Without an id the entity is looked up by document id.
//! - `index(fields = .., index_type = ..)` may repeat; the type defaults to
//!   `unique`.

extern crate proc_macro;
mod convertible;
mod potash_entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::potash_entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Convertible cannot be derived for unions",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

#[proc_macro_derive(PotashEntity, attributes(entity))]
pub fn derive_potash_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_entity_for_struct(&ast, data),
        _ => Err(syn::Error::new_spanned(
            &ast,
            "PotashEntity can only be derived for structs with named fields",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}
