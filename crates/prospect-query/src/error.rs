//! Error types for the query engine.
//!
//! Every error here is a configuration error: it is raised while a query is
//! validated, before any record is looked at. A query that matches nothing
//! is not an error; see [`QueryResult::is_empty`](crate::QueryResult::is_empty).

use thiserror::Error;

/// Errors raised while validating or loading a query configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A rule names a field the record type does not declare.
    #[error("unknown field '{field}' referenced by {rule} rule")]
    UnknownField { field: String, rule: &'static str },

    /// Operator is not valid for the kind of field it targets.
    #[error("operator '{op}' is not valid for {kind} field '{field}'")]
    InvalidOperatorForType {
        op: &'static str,
        kind: &'static str,
        field: String,
    },

    /// The rule value cannot be compared with the field.
    #[error("type mismatch on '{field}': field expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Range bounds that can never be evaluated.
    #[error("invalid range on '{field}': {reason}")]
    InvalidRange { field: String, reason: String },

    /// An aggregate that cannot be computed.
    #[error("invalid aggregate '{label}': {reason}")]
    InvalidAggregate { label: String, reason: String },

    /// Bucket order names an aggregate the group rule does not compute.
    #[error("bucket order references unknown aggregate '{0}'")]
    UnknownAggregate(String),

    /// The field cannot partition records into buckets.
    #[error("cannot group by {kind} field '{field}'")]
    InvalidGroupField { field: String, kind: &'static str },

    /// A saved view could not be parsed.
    #[error("invalid saved view: {0}")]
    InvalidView(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidView(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::InvalidView(err.to_string())
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
