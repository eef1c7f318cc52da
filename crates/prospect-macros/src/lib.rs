//! Proc macros for Prospect.
//!
//! # Available Macros
//!
//! - [`Record`] - Generate the `prospect_query::Record` impl and field name
//!   constants from struct field annotations
//!
//! # Examples
//!
//! For working examples, see `prospect-crm/src/records.rs` and
//! `prospect-crm/tests/record_derive.rs`.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for queryable structs.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `Text` / `String` | Text field (`String`, `&str`) |
/// | `Number` | Numeric field (any primitive integer or float) |
/// | `Timestamp` | Timestamp field - requires `RecordTimestamp` impl |
/// | `Enum` | Enum field read through its label - requires `RecordEnum` impl |
/// | `Bool` | Boolean field |
/// | `List` | List of strings (`Vec<String>`) |
/// | `nested` | A field whose type also derives `Record`, queried as `field.inner` |
/// | `id` | Marks the identifier field |
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom name for queries |
///
/// Any of these may wrap its type in `Option<...>`; `None` reads as a
/// missing value. Fields without an attribute are not queryable.
///
/// # Container Attributes
///
/// `#[record(id = "...")]` on the struct names the identifier field. Without
/// it, the field marked `id` is used, or else a queryable field named `id`.
///
/// # Generated Code
///
/// The macro generates:
///
/// 1. Field name constants (e.g., `Lead::NAME`, `Lead::SCORE`)
/// 2. `Record::ID_FIELD`, `Record::schema()` and `Record::field_value()`
///
/// # Example
///
/// ```ignore
/// use prospect_macros::Record;
/// use prospect_query::{Bounds, QueryConfig, RecordEnum};
///
/// #[derive(Clone, Copy)]
/// enum Priority { High, Low }
///
/// impl RecordEnum for Priority {
///     fn label(&self) -> &'static str {
///         match self {
///             Priority::High => "high",
///             Priority::Low => "low",
///         }
///     }
/// }
///
/// #[derive(Record)]
/// struct Account {
///     #[record(Text, id)]
///     name: String,
/// }
///
/// #[derive(Record)]
/// struct Task {
///     #[record(Number)]
///     id: u32,
///
///     #[record(Text)]
///     title: String,
///
///     #[record(Enum)]
///     priority: Priority,
///
///     #[record(Number, rename = "predictiveScore")]
///     score: Option<u8>,
///
///     #[record(nested)]
///     account: Option<Account>,
///
///     #[record(skip)]
///     notes: String,
/// }
///
/// let config = QueryConfig::<Task>::new()
///     .equals(Task::PRIORITY, "high")
///     .range(Task::PREDICTIVE_SCORE, Bounds::at_least(70))
///     .contains("account.name", "acme");
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
