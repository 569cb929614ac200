use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DataEnum, DataStruct, Fields, FieldsNamed, FieldsUnnamed, Generics, Ident, LitStr, Type};

use crate::attrs::{ensure_no_ubjson_attrs, parse_field_attrs, parse_variant_rename};
use crate::types::{type_mentions_self, where_with_bounds};

/// Key/value statements for the non-skipped named fields, plus the identifiers they bind.
fn named_entries<'a, F>(
    name: &Ident,
    fields: &'a FieldsNamed,
    bounds: &mut Vec<&'a Type>,
    value: F,
) -> syn::Result<(Vec<&'a Ident>, Vec<TokenStream>)>
where
    F: Fn(&Ident) -> TokenStream,
{
    let mut pats = Vec::new();
    let mut entries = Vec::new();

    for field in &fields.named {
        let attr = parse_field_attrs(&field.attrs)?;
        let Some(f_ident) = field.ident.as_ref() else {
            continue;
        };
        if attr.skip {
            continue;
        }
        pats.push(f_ident);

        let key = attr
            .rename
            .unwrap_or_else(|| LitStr::new(&f_ident.unraw().to_string(), f_ident.span()));

        if !type_mentions_self(&field.ty, name) {
            bounds.push(&field.ty);
        }

        let value_ts = value(f_ident);
        entries.push(quote! {
            enc.text(#key)?;
            ::ubjson_draft8::Encode::encode(#value_ts, enc)?;
        });
    }

    Ok((pats, entries))
}

fn tuple_items<'a>(
    name: &Ident,
    fields: &'a FieldsUnnamed,
    bounds: &mut Vec<&'a Type>,
    ctx: &str,
) -> syn::Result<(Vec<Ident>, Vec<TokenStream>)> {
    let mut pats = Vec::new();
    let mut items = Vec::new();

    for (idx, field) in fields.unnamed.iter().enumerate() {
        ensure_no_ubjson_attrs(&field.attrs, ctx)?;
        let var = format_ident!("v{idx}");
        if !type_mentions_self(&field.ty, name) {
            bounds.push(&field.ty);
        }
        items.push(quote! { ::ubjson_draft8::Encode::encode(#var, enc)?; });
        pats.push(var);
    }

    Ok((pats, items))
}

fn wrap_impl(
    name: &Ident,
    generics: &Generics,
    bounds: &[&Type],
    body: &TokenStream,
    is_text: Option<TokenStream>,
) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let wc = where_with_bounds(where_clause, bounds, &quote!(::ubjson_draft8::Encode));
    let is_text = is_text.map(|ts| {
        quote! {
            fn is_text(&self) -> bool {
                #ts
            }
        }
    });

    quote! {
        impl #impl_generics ::ubjson_draft8::Encode for #name #ty_generics #wc {
            fn encode<__S: ::ubjson_draft8::Sink>(
                &self,
                enc: &mut ::ubjson_draft8::Encoder<__S>,
            ) -> ::core::result::Result<(), ::ubjson_draft8::UbjsonError> {
                #body
            }

            #is_text
        }
    }
}

pub(crate) fn encode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<TokenStream> {
    let mut bounds = Vec::new();

    match &data.fields {
        Fields::Named(fields) => {
            let (_, entries) =
                named_entries(name, fields, &mut bounds, |ident| quote!(&self.#ident))?;
            let len = entries.len();
            let body = quote! {
                enc.begin_object(#len)?;
                #(#entries)*
                ::core::result::Result::Ok(())
            };
            Ok(wrap_impl(name, generics, &bounds, &body, None))
        }

        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let field = &fields.unnamed[0];
            ensure_no_ubjson_attrs(&field.attrs, "newtype struct fields")?;
            if !type_mentions_self(&field.ty, name) {
                bounds.push(&field.ty);
            }
            let body = quote! { ::ubjson_draft8::Encode::encode(&self.0, enc) };
            let is_text = quote! { ::ubjson_draft8::Encode::is_text(&self.0) };
            Ok(wrap_impl(name, generics, &bounds, &body, Some(is_text)))
        }

        Fields::Unnamed(fields) => {
            let (pats, items) = tuple_items(name, fields, &mut bounds, "tuple struct fields")?;
            let len = items.len();
            let body = quote! {
                let Self( #(#pats),* ) = self;
                enc.begin_array(#len)?;
                #(#items)*
                ::core::result::Result::Ok(())
            };
            Ok(wrap_impl(name, generics, &bounds, &body, None))
        }

        Fields::Unit => Ok(wrap_impl(name, generics, &bounds, &quote!(enc.null()), None)),
    }
}

pub(crate) fn encode_enum(
    name: &Ident,
    generics: &Generics,
    data: &DataEnum,
) -> syn::Result<TokenStream> {
    let mut arms = Vec::new();
    let mut unit_idents = Vec::new();
    let mut bounds = Vec::new();

    for variant in &data.variants {
        let vname = parse_variant_rename(&variant.attrs)?.unwrap_or_else(|| {
            LitStr::new(&variant.ident.unraw().to_string(), variant.ident.span())
        });
        let ident = &variant.ident;

        match &variant.fields {
            Fields::Unit => {
                unit_idents.push(ident);
                arms.push(quote! { Self::#ident => enc.text(#vname) });
            }

            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                let (_, items) = tuple_items(name, fields, &mut bounds, "tuple enum variant fields")?;
                arms.push(quote! {
                    Self::#ident(v0) => {
                        enc.begin_object(1)?;
                        enc.text(#vname)?;
                        #(#items)*
                        ::core::result::Result::Ok(())
                    }
                });
            }

            Fields::Unnamed(fields) => {
                let (pats, items) =
                    tuple_items(name, fields, &mut bounds, "tuple enum variant fields")?;
                let len = items.len();
                arms.push(quote! {
                    Self::#ident( #(#pats),* ) => {
                        enc.begin_object(1)?;
                        enc.text(#vname)?;
                        enc.begin_array(#len)?;
                        #(#items)*
                        ::core::result::Result::Ok(())
                    }
                });
            }

            Fields::Named(fields) => {
                let (pats, entries) =
                    named_entries(name, fields, &mut bounds, |ident| quote!(#ident))?;
                let len = entries.len();
                arms.push(quote! {
                    Self::#ident { #(#pats,)* .. } => {
                        enc.begin_object(1)?;
                        enc.text(#vname)?;
                        enc.begin_object(#len)?;
                        #(#entries)*
                        ::core::result::Result::Ok(())
                    }
                });
            }
        }
    }

    let body = if arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#arms),*
            }
        }
    };
    // Unit variants are plain text, so they may serve as object keys.
    let is_text = if unit_idents.is_empty() {
        None
    } else {
        Some(quote! { matches!(self, #(Self::#unit_idents)|*) })
    };

    Ok(wrap_impl(name, generics, &bounds, &body, is_text))
}
