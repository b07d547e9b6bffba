use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Lit, Meta, PathArguments, Type};

/// Derive macro that declares the column layout of a result source.
///
/// For each field, extracts:
/// - Column name (respects #[serde(rename = "...")])
/// - Kind (numeric for integer/float fields, date for `NaiveDate`, text otherwise)
/// - Nullable (true if `Option<T>`)
/// - Description (from doc comments)
///
/// Implements `SourceColumns` for the struct. `SourceColumns`, `ColumnSpec`
/// and `ColumnKind` must be in scope at the derive site.
#[proc_macro_derive(SourceColumns, attributes(serde))]
pub fn derive_source_columns(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "SourceColumns only supports named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "SourceColumns only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let entries = fields.iter().filter_map(|field| {
        let ident = field.ident.as_ref()?;
        let column = get_serde_rename(&field.attrs).unwrap_or_else(|| ident.to_string());
        let (nullable, inner) = match option_inner(&field.ty) {
            Some(inner) => (true, inner),
            None => (false, &field.ty),
        };
        let kind = match column_kind(inner) {
            Kind::Numeric => quote! { ColumnKind::Numeric },
            Kind::Date => quote! { ColumnKind::Date },
            Kind::Text => quote! { ColumnKind::Text },
        };
        let doc = get_doc_comment(&field.attrs);

        Some(quote! {
            ColumnSpec {
                name: #column,
                kind: #kind,
                nullable: #nullable,
                description: #doc,
            }
        })
    });

    let expanded = quote! {
        impl SourceColumns for #name {
            fn columns() -> &'static [ColumnSpec] {
                static COLUMNS: &[ColumnSpec] = &[
                    #(#entries),*
                ];
                COLUMNS
            }
        }
    };

    TokenStream::from(expanded)
}

enum Kind {
    Numeric,
    Date,
    Text,
}

fn column_kind(ty: &Type) -> Kind {
    let ident = match ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => segment.ident.to_string(),
            None => return Kind::Text,
        },
        _ => return Kind::Text,
    };
    match ident.as_str() {
        "f32" | "f64" | "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            Kind::Numeric
        }
        "NaiveDate" => Kind::Date,
        _ => Kind::Text,
    }
}

fn get_serde_rename(attrs: &[syn::Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        if let Meta::List(meta_list) = &attr.meta {
            let tokens = meta_list.tokens.to_string();
            // Simple parsing: look for rename = "..."
            if let Some(start) = tokens.find("rename") {
                let rest = &tokens[start..];
                if let Some(eq_pos) = rest.find('=') {
                    let after_eq = rest[eq_pos + 1..].trim();
                    if let Some(stripped) = after_eq.strip_prefix('"') {
                        if let Some(end_quote) = stripped.find('"') {
                            return Some(stripped[..end_quote].to_string());
                        }
                    }
                }
            }
        }
    }
    None
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `T` for `Option<T>`, `None` for any other type.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
