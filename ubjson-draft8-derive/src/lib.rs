//! Derive macro for `ubjson_draft8::Encode`.

extern crate proc_macro;

mod attrs;
mod encode;
mod types;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

use crate::encode::{encode_enum, encode_struct};

/// Derive `ubjson_draft8::Encode`.
///
/// - named struct: sized object, fields in declaration order
/// - tuple struct: sized array
/// - newtype struct: the inner value
/// - unit struct: null
/// - unit variant: its name as text
/// - data variant: one-entry object from the name to the payload
///
/// Fields accept `#[ubjson(rename = "...")]` and `#[ubjson(skip)]`; variants accept `rename`.
#[proc_macro_derive(Encode, attributes(ubjson))]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = match &input.data {
        Data::Struct(data) => encode_struct(&input.ident, &input.generics, data),
        Data::Enum(data) => encode_enum(&input.ident, &input.generics, data),
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span,
            "ubjson Encode is not supported for unions",
        )),
    };
    TokenStream::from(out.unwrap_or_else(syn::Error::into_compile_error))
}
