//! Attribute parsing for the Record derive macro.
//!
//! Parses the `#[record(...)]` attributes, both on the struct (container
//! options) and on its fields.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// The kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Text field: `#[record(Text)]` or `#[record(String)]`
    Text,
    /// Number field: `#[record(Number)]`
    Number,
    /// Timestamp field: `#[record(Timestamp)]`
    Timestamp,
    /// Enum field, read through its label: `#[record(Enum)]`
    Enum,
    /// Boolean field: `#[record(Bool)]`
    Bool,
    /// List of strings: `#[record(List)]`
    List,
    /// Nested record addressed with dotted paths: `#[record(nested)]`
    Nested,
}

impl FieldType {
    pub fn parse(name: &str, span: Span) -> Result<Self> {
        match name {
            "Text" | "text" | "String" | "string" => Ok(FieldType::Text),
            "Number" | "number" => Ok(FieldType::Number),
            "Timestamp" | "timestamp" => Ok(FieldType::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldType::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldType::Bool),
            "List" | "list" => Ok(FieldType::List),
            "nested" | "Nested" => Ok(FieldType::Nested),
            other => Err(Error::new(
                span,
                format!(
                    "unknown record type: '{}'. Expected one of: Text, Number, Timestamp, Enum, Bool, List, nested",
                    other
                ),
            )),
        }
    }

    /// The `prospect_query::FieldKind` variant name, for non-nested fields.
    pub fn kind_ident(self) -> Option<&'static str> {
        match self {
            FieldType::Text => Some("Text"),
            FieldType::Number => Some("Number"),
            FieldType::Timestamp => Some("Timestamp"),
            FieldType::Enum => Some("Enum"),
            FieldType::Bool => Some("Bool"),
            FieldType::List => Some("List"),
            FieldType::Nested => None,
        }
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    pub field_type: Option<FieldType>,
    pub skip: bool,
    /// Marks the identifier field.
    pub id: bool,
    /// Custom field name for queries (default: field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            field_type: None,
            skip: false,
            id: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if p.is_ident("id") {
                        attr.id = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.field_type = Some(FieldType::parse(&ident.to_string(), ident.span())?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected record type: Text, Number, Timestamp, Enum, Bool, List, nested, id, or skip",
                        ));
                    }
                }

                // rename = "custom_name" or ty = "enum"
                Meta::NameValue(nv) => {
                    let value = string_value(&nv.value)?;
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(value.value());
                    } else if nv.path.is_ident("ty") {
                        attr.field_type = Some(FieldType::parse(&value.value(), value.span())?);
                        attr.span = value.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected a type, id, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Struct-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Query name of the identifier field.
    pub id: Option<String>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("id") => {
                    attr.id = Some(string_value(&nv.value)?.value());
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: id = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn string_value(expr: &Expr) -> Result<&LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(other.span(), "expected a string literal")),
    }
}

/// Extract `#[record(...)]` attributes from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// Extract `#[record(...)]` attributes from the struct itself.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
