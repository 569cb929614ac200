use proc_macro2::TokenStream;
use syn::{parse_quote, GenericArgument, Ident, PathArguments, Type, WhereClause, WherePredicate};

/// Whether `ty` names the type being derived, directly or inside generic arguments.
///
/// Such fields get no `Encode` bound; the bound would be cyclic.
pub(crate) fn type_mentions_self(ty: &Type, self_ident: &Ident) -> bool {
    match ty {
        Type::Path(tp) => {
            if tp.qself.is_none() && tp.path.is_ident(self_ident) {
                return true;
            }
            if tp.path.segments.len() == 1 && tp.path.segments[0].ident == "Self" {
                return true;
            }
            if let Some(q) = &tp.qself {
                if type_mentions_self(&q.ty, self_ident) {
                    return true;
                }
            }
            tp.path.segments.iter().any(|seg| match &seg.arguments {
                PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| match arg {
                    GenericArgument::Type(inner) => type_mentions_self(inner, self_ident),
                    _ => false,
                }),
                _ => false,
            })
        }
        Type::Reference(tr) => type_mentions_self(&tr.elem, self_ident),
        Type::Tuple(tt) => tt.elems.iter().any(|t| type_mentions_self(t, self_ident)),
        Type::Array(ta) => type_mentions_self(&ta.elem, self_ident),
        Type::Slice(ts) => type_mentions_self(&ts.elem, self_ident),
        Type::Group(tg) => type_mentions_self(&tg.elem, self_ident),
        Type::Paren(tp) => type_mentions_self(&tp.elem, self_ident),
        _ => false,
    }
}

pub(crate) fn where_with_bounds(
    base: Option<&WhereClause>,
    bounds: &[&Type],
    bound: &TokenStream,
) -> Option<WhereClause> {
    let mut wc = base.cloned();
    if bounds.is_empty() {
        return wc;
    }
    let clause = wc.get_or_insert_with(|| WhereClause {
        where_token: Default::default(),
        predicates: Default::default(),
    });
    for ty in bounds {
        let pred: WherePredicate = parse_quote!(#ty: #bound);
        clause.predicates.push(pred);
    }
    wc
}
