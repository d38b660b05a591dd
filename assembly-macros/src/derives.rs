use syn::{Attribute, Token, punctuated::Punctuated};

// 将已有 derive 与必需 derive 合并为一个属性，按末段标识去重
pub(crate) fn merge_into(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let mut existing: Vec<syn::Path> = Vec::new();
    attrs.retain(|attr| {
        if !attr.path().is_ident("derive") {
            return true;
        }
        if let Ok(list) = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
        {
            existing.extend(list);
        }
        false
    });

    let mut seen = std::collections::HashSet::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(last_ident(p)))
        .collect();

    attrs.insert(0, syn::parse_quote!(#[derive(#(#merged),*)]));
}

fn last_ident(p: &syn::Path) -> String {
    p.segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_default()
}
