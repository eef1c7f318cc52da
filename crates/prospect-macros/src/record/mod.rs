//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates the `prospect_query::Record` impl (schema and field accessor)
//! and field name constants from struct annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
