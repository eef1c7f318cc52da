//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates an implementation of the `Record` trait (schema and
//! field accessor) and field name constants for type-safe query building.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result,
    Type,
};

use super::attrs::{parse_container_attrs, parse_field_attrs, FieldType};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut nested_lookups: Vec<TokenStream> = Vec::new();
    let mut schema_fields: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut query_names: Vec<String> = Vec::new();
    let mut marked_id: Option<String> = None;

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // Fields without a type are not queryable
        let field_type = match attrs.field_type {
            Some(t) => t,
            None => {
                if attrs.id {
                    return Err(Error::new(
                        field.span(),
                        "the id field needs a type, e.g. #[record(Number, id)]",
                    ));
                }
                continue;
            }
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let (optional, inner_ty) = match option_inner(&field.ty) {
            Some(inner) => (true, inner),
            None => (false, &field.ty),
        };

        if attrs.id {
            if field_type == FieldType::Nested {
                return Err(Error::new(attrs.span, "a nested record cannot be the id field"));
            }
            if marked_id.is_some() {
                return Err(Error::new(field.span(), "only one field can be marked id"));
            }
            marked_id = Some(query_name.clone());
        }

        if field_type == FieldType::Nested {
            let prefix = format!("{}.", query_name);
            schema_fields.push(quote! {
                .nest(#query_name, <#inner_ty as ::prospect_query::Record>::schema())
            });
            let lookup = if optional {
                quote! {
                    match &self.#field_name {
                        Some(inner) => ::prospect_query::Record::field_value(inner, rest),
                        None => ::prospect_query::Value::None,
                    }
                }
            } else {
                quote! { ::prospect_query::Record::field_value(&self.#field_name, rest) }
            };
            nested_lookups.push(quote! {
                if let Some(rest) = field.strip_prefix(#prefix) {
                    return #lookup;
                }
            });
            continue;
        }

        let kind = format_ident!("{}", field_type.kind_ident().unwrap_or("Text"));
        schema_fields.push(quote! {
            .field(#query_name, ::prospect_query::FieldKind::#kind)
        });

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            /// Field name constant for type-safe queries.
            pub const #const_name: &'static str = #query_name;
        });

        let value_expr = if optional {
            let wrapped = value_of(field_type, quote! { v }, true);
            quote! {
                match &self.#field_name {
                    Some(v) => #wrapped,
                    None => ::prospect_query::Value::None,
                }
            }
        } else {
            value_of(field_type, quote! { self.#field_name }, false)
        };

        field_matches.push(quote! {
            #query_name => #value_expr,
        });
        query_names.push(query_name);
    }

    let id_field = match container.id.or(marked_id) {
        Some(id) => id,
        None if query_names.iter().any(|n| n == "id") => "id".to_string(),
        None => {
            return Err(Error::new(
                input.span(),
                "Record needs an identifier: add a queryable `id` field, mark one with #[record(id)], or set #[record(id = \"...\")] on the struct",
            ))
        }
    };
    if !query_names.contains(&id_field) {
        return Err(Error::new(
            input.span(),
            format!("identifier field '{}' is not a queryable field", id_field),
        ));
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::prospect_query::Record for #struct_name #ty_generics #where_clause {
            const ID_FIELD: &'static str = #id_field;

            fn schema() -> ::prospect_query::Schema {
                ::prospect_query::Schema::new()
                    #(#schema_fields)*
            }

            fn field_value(&self, field: &str) -> ::prospect_query::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => {
                        #(#nested_lookups)*
                        ::prospect_query::Value::None
                    }
                }
            }
        }
    };

    Ok(expanded)
}

/// Accessor expression for a scalar field. `by_ref` is set when `place` is
/// already a reference (the binding of an `Option` match).
fn value_of(field_type: FieldType, place: TokenStream, by_ref: bool) -> TokenStream {
    let borrowed = if by_ref {
        place.clone()
    } else {
        quote! { &#place }
    };
    let copied = if by_ref {
        quote! { *#place }
    } else {
        place.clone()
    };

    match field_type {
        FieldType::Text => quote! {
            ::prospect_query::Value::String(::core::convert::AsRef::<str>::as_ref(#borrowed))
        },
        FieldType::Number => quote! {
            ::prospect_query::Value::Number(::prospect_query::Number::from(#copied))
        },
        FieldType::Timestamp => quote! {
            ::prospect_query::Value::Timestamp(
                ::prospect_query::RecordTimestamp::record_timestamp(#borrowed)
            )
        },
        FieldType::Enum => quote! {
            ::prospect_query::Value::Enum(::prospect_query::RecordEnum::label(#borrowed))
        },
        FieldType::Bool => quote! { ::prospect_query::Value::Bool(#copied) },
        FieldType::List => quote! {
            ::prospect_query::Value::List(::core::convert::AsRef::<[String]>::as_ref(#borrowed))
        },
        FieldType::Nested => quote! { ::prospect_query::Value::None },
    }
}

/// Returns `T` when `ty` is written as `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("due_date"), "DUE_DATE");
        assert_eq!(to_screaming_snake_case("predictiveScore"), "PREDICTIVE_SCORE");
        assert_eq!(to_screaming_snake_case("lead-source"), "LEAD_SOURCE");
    }

    #[test]
    fn test_option_inner() {
        let ty: Type = syn::parse_str("Option<String>").unwrap();
        let inner = option_inner(&ty).unwrap();
        assert_eq!(quote!(#inner).to_string(), "String");

        let ty: Type = syn::parse_str("std::option::Option<u8>").unwrap();
        assert!(option_inner(&ty).is_some());

        let ty: Type = syn::parse_str("Vec<String>").unwrap();
        assert!(option_inner(&ty).is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let input: DeriveInput = syn::parse_str(
            r#"
            struct Note {
                #[record(Text)]
                body: String,
            }
            "#,
        )
        .unwrap();
        let err = record_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("identifier"));
    }

    #[test]
    fn test_generates_nested_lookup() {
        let input: DeriveInput = syn::parse_str(
            r#"
            struct Contact {
                #[record(Text, id)]
                email: String,
                #[record(nested)]
                account: Option<Account>,
            }
            "#,
        )
        .unwrap();
        let tokens = record_derive_impl(input).unwrap().to_string();
        assert!(tokens.contains("strip_prefix"));
        assert!(tokens.contains("\"account.\""));
        assert!(tokens.contains("ID_FIELD"));
        assert!(tokens.contains("\"email\""));
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = syn::parse_str("enum Status { Open, Closed }").unwrap();
        assert!(record_derive_impl(input).is_err());
    }
}
