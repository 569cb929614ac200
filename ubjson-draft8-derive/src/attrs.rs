use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr};

#[derive(Default, Clone)]
pub(crate) struct FieldAttr {
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
}

pub(crate) fn ensure_no_ubjson_attrs(attrs: &[Attribute], ctx: &str) -> syn::Result<()> {
    for a in attrs {
        if a.path().is_ident("ubjson") {
            return Err(syn::Error::new(
                a.span(),
                format!("`#[ubjson(...)]` is not supported on {ctx}"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("ubjson") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                if out.skip {
                    return Err(meta.error("duplicate `ubjson(skip)`"));
                }
                out.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `ubjson(rename=...)`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit);
                return Ok(());
            }
            Err(meta.error("unsupported `ubjson(...)` field attribute (allowed: rename, skip)"))
        })?;
    }

    if out.skip && out.rename.is_some() {
        return Err(syn::Error::new(
            Span::call_site(),
            "`ubjson(skip)` cannot be combined with `rename`",
        ));
    }

    Ok(out)
}

pub(crate) fn parse_variant_rename(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("ubjson") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if rename.is_some() {
                    return Err(meta.error("duplicate `ubjson(rename=...)` on variant"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit);
                return Ok(());
            }
            if meta.path.is_ident("skip") {
                return Err(meta.error("`ubjson(skip)` is not valid on enum variants"));
            }
            Err(meta.error("unsupported `ubjson(...)` variant attribute (allowed: rename)"))
        })?;
    }
    Ok(rename)
}
