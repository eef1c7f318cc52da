//! Prospect query - filter, sort and group engine for record collections.
//!
//! Prospect evaluates a declarative [`QueryConfig`] against an in-memory
//! slice of records and returns a derived view, either a flat ordered list
//! or ordered buckets with aggregates. It supports:
//!
//! - Free-text search OR-ed across several fields
//! - Equality, substring, numeric range and set-membership filters
//! - Multi-key stable sorting with rank tables for enum fields
//! - Grouping by field or derived key, with count, sum and conditional-count
//!   aggregates and bucket ordering
//! - Saved views loaded from JSON or YAML
//!
//! # Quick Start
//!
//! ```rust
//! use prospect_query::{
//!     run_query, FieldKind, Number, QueryConfig, RankMap, Record, Schema, SortRule, Value,
//! };
//!
//! struct Task {
//!     id: u32,
//!     title: String,
//!     priority: &'static str,
//! }
//!
//! impl Record for Task {
//!     const ID_FIELD: &'static str = "id";
//!
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field("id", FieldKind::Number)
//!             .field("title", FieldKind::Text)
//!             .field("priority", FieldKind::Enum)
//!     }
//!
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "id" => Value::Number(Number::from(self.id)),
//!             "title" => Value::String(&self.title),
//!             "priority" => Value::Enum(self.priority),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { id: 1, title: "Call Acme".into(), priority: "low" },
//!     Task { id: 2, title: "Send proposal".into(), priority: "high" },
//!     Task { id: 3, title: "Call Globex".into(), priority: "medium" },
//! ];
//!
//! let config = QueryConfig::new()
//!     .search(["title"], "call")
//!     .sort_by(SortRule::desc("priority").ranked(RankMap::priority()));
//!
//! let result = run_query(&tasks, &config).unwrap();
//! assert_eq!(result.ids(), vec!["3", "1"]);
//! ```
//!
//! # Query Semantics
//!
//! ```text
//! keep = (search term blank OR any search field contains the term)
//!      ∧ (every active filter rule matches)
//! ```
//!
//! A rule with no effective value (empty text, empty set, fully open range)
//! is inactive and skipped. Configurations are validated against the record
//! [`Schema`] before any record is read; an invalid one is a [`ConfigError`],
//! never a silently empty result.
//!
//! # Field Kinds and Predicates
//!
//! | Kind | Predicates |
//! |------|-----------|
//! | Text | `equals`, `contains`, `in-set` |
//! | Enum | `equals`, `contains`, `in-set` |
//! | Number | `equals`, `range`, `in-set` |
//! | Timestamp | `equals`, `range`, `in-set` |
//! | Bool | `equals`, `in-set` |
//! | List | `equals`, `contains`, `in-set` (any element) |

mod error;
mod filter;
mod group;
mod query;
mod record;
mod saved;
mod schema;
mod sort;
mod value;

// Re-export public API
pub use error::{ConfigError, Result};
pub use filter::{Bounds, FilterOp, FilterRule, RuleValue, SearchRule};
pub use group::{
    Aggregate, AggregateKind, Aggregates, Bucket, BucketKey, BucketOrder, GroupKey, GroupRule,
};
pub use query::{run_query, QueryConfig, QueryResult};
pub use record::{Record, RecordEnum, RecordTimestamp};
pub use saved::{SavedGrouping, SavedView};
pub use schema::{FieldDef, FieldKind, Schema};
pub use sort::{collate, compare_by_rules, compare_values, Dir, RankMap, SortRule};
pub use value::{Number, Timestamp, Value};
