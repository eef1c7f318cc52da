//! Traits for derive macro support.
//!
//! This module provides the [`Record`] trait which is implemented by
//! the `#[derive(Record)]` macro to expose a struct to the query engine.

use crate::schema::Schema;
use crate::value::{Timestamp, Value};

/// A record type the query engine can filter, sort and group.
///
/// This trait is typically derived using `#[derive(Record)]` from the
/// `prospect-macros` crate, but can also be implemented manually.
///
/// # Manual Implementation
///
/// ```
/// use prospect_query::{FieldKind, Number, Record, Schema, Value};
///
/// struct Lead {
///     id: u32,
///     name: String,
///     score: u8,
/// }
///
/// impl Record for Lead {
///     const ID_FIELD: &'static str = "id";
///
///     fn schema() -> Schema {
///         Schema::new()
///             .field("id", FieldKind::Number)
///             .field("name", FieldKind::Text)
///             .field("score", FieldKind::Number)
///     }
///
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "id" => Value::Number(Number::from(self.id)),
///             "name" => Value::String(&self.name),
///             "score" => Value::Number(Number::from(self.score)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Name of the stable unique identifier field.
    const ID_FIELD: &'static str;

    /// The declared shape used to validate query rules.
    fn schema() -> Schema
    where
        Self: Sized;

    /// Returns the value of a field, or [`Value::None`] if the field is
    /// missing, null, or not declared.
    ///
    /// Nested records are addressed with dotted paths such as `account.name`.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Returns the identifier of this record.
    fn record_id(&self) -> Value<'_> {
        self.field_value(Self::ID_FIELD)
    }
}

/// Helper trait for enum fields, mapping each variant to a stable label.
///
/// Labels are what filters compare against and what grouping uses as the
/// bucket key.
///
/// ```
/// use prospect_query::RecordEnum;
///
/// #[derive(Clone, Copy)]
/// enum Priority {
///     High,
///     Medium,
///     Low,
/// }
///
/// impl RecordEnum for Priority {
///     fn label(&self) -> &'static str {
///         match self {
///             Priority::High => "high",
///             Priority::Medium => "medium",
///             Priority::Low => "low",
///         }
///     }
/// }
/// ```
pub trait RecordEnum {
    fn label(&self) -> &'static str;
}

/// Helper trait for converting datetime types to timestamps.
///
/// Used by the derive macro for fields marked `#[record(Timestamp)]`.
pub trait RecordTimestamp {
    /// Converts this value to a [`Timestamp`] for comparison.
    fn record_timestamp(&self) -> Timestamp;
}

impl RecordTimestamp for i64 {
    fn record_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl RecordTimestamp for u64 {
    fn record_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self as i64)
    }
}

impl RecordTimestamp for Timestamp {
    fn record_timestamp(&self) -> Timestamp {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use crate::Number;

    struct Contact {
        id: String,
        visits: i32,
    }

    impl Record for Contact {
        const ID_FIELD: &'static str = "id";

        fn schema() -> Schema {
            Schema::new()
                .field("id", FieldKind::Text)
                .field("visits", FieldKind::Number)
        }

        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "id" => Value::String(&self.id),
                "visits" => Value::Number(Number::from(self.visits)),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn manual_impl() {
        let contact = Contact {
            id: "c-1".to_string(),
            visits: 4,
        };

        assert_eq!(contact.record_id(), Value::String("c-1"));
        assert_eq!(contact.field_value("visits"), Value::Number(Number::I64(4)));
        assert_eq!(contact.field_value("unknown"), Value::None);
        assert_eq!(Contact::schema().len(), 2);
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(1000i64.record_timestamp(), Timestamp(1000));
        assert_eq!(1000u64.record_timestamp(), Timestamp(1000));
        assert_eq!(Timestamp(5).record_timestamp(), Timestamp(5));
    }
}
