//! Grouping and per-bucket aggregation.
//!
//! A [`GroupRule`] partitions the filtered records into buckets keyed by a
//! field or a derived key function. Each bucket orders its members with the
//! query's sort rules and carries the aggregates the rule asks for. Buckets
//! are then ordered by a [`BucketOrder`]; records without a key land in the
//! ungrouped bucket, which always comes last.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::filter::FilterRule;
use crate::record::Record;
use crate::schema::{FieldKind, Schema};
use crate::sort::{collate, compare_by_rules, Dir, SortRule};

type KeyFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// What a record is grouped by.
pub enum GroupKey<T> {
    /// The string form of a field value.
    Field(String),
    /// A key computed from the whole record.
    Derived { name: String, key: KeyFn<T> },
}

impl<T: Record> GroupKey<T> {
    /// Bucket key of a record. A missing or empty key sends it to the
    /// ungrouped bucket.
    pub fn key_of(&self, record: &T) -> Option<String> {
        let key = match self {
            GroupKey::Field(field) => record
                .field_value(field)
                .to_key_string()
                .map(|key| key.into_owned()),
            GroupKey::Derived { key, .. } => key(record),
        };
        key.filter(|k| !k.is_empty())
    }

    pub fn name(&self) -> &str {
        match self {
            GroupKey::Field(field) => field,
            GroupKey::Derived { name, .. } => name,
        }
    }
}

impl<T> Clone for GroupKey<T> {
    fn clone(&self) -> Self {
        match self {
            GroupKey::Field(field) => GroupKey::Field(field.clone()),
            GroupKey::Derived { name, key } => GroupKey::Derived {
                name: name.clone(),
                key: Arc::clone(key),
            },
        }
    }
}

impl<T> fmt::Debug for GroupKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Field(field) => f.debug_tuple("Field").field(field).finish(),
            GroupKey::Derived { name, .. } => f.debug_struct("Derived").field("name", name).finish(),
        }
    }
}

/// How a bucket-level aggregate is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AggregateKind {
    /// Number of members.
    Count,
    /// Total of a numeric field over the members; missing values add nothing.
    Sum { field: String },
    /// Number of members matching a rule.
    CountWhere { rule: FilterRule },
}

/// A labelled aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub label: String,
    #[serde(flatten)]
    pub kind: AggregateKind,
}

impl Aggregate {
    pub fn count(label: impl Into<String>) -> Self {
        Aggregate {
            label: label.into(),
            kind: AggregateKind::Count,
        }
    }

    pub fn sum(label: impl Into<String>, field: impl Into<String>) -> Self {
        Aggregate {
            label: label.into(),
            kind: AggregateKind::Sum {
                field: field.into(),
            },
        }
    }

    pub fn count_where(label: impl Into<String>, rule: FilterRule) -> Self {
        Aggregate {
            label: label.into(),
            kind: AggregateKind::CountWhere { rule },
        }
    }

    fn compute<T: Record>(&self, members: &[&T]) -> f64 {
        match &self.kind {
            AggregateKind::Count => members.len() as f64,
            AggregateKind::Sum { field } => members
                .iter()
                .filter_map(|m| m.field_value(field).numeric())
                .map(|n| n.to_f64())
                .sum(),
            AggregateKind::CountWhere { rule } => members
                .iter()
                .filter(|m| !rule.is_active() || rule.matches_record(**m))
                .count() as f64,
        }
    }

    fn validate(&self, schema: &Schema) -> Result<()> {
        match &self.kind {
            AggregateKind::Count => Ok(()),
            AggregateKind::Sum { field } => {
                let kind = schema
                    .kind_of(field)
                    .ok_or_else(|| ConfigError::UnknownField {
                        field: field.clone(),
                        rule: "aggregate",
                    })?;
                if kind.is_numeric() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidAggregate {
                        label: self.label.clone(),
                        reason: format!("cannot sum {} field '{}'", kind, field),
                    })
                }
            }
            AggregateKind::CountWhere { rule } => rule.validate(schema),
        }
    }
}

/// Computed aggregate values of one bucket, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    values: Vec<(String, f64)>,
}

impl Aggregates {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Order of the named buckets. The ungrouped bucket is always last.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "camelCase")]
pub enum BucketOrder {
    /// Order in which keys were first seen.
    #[default]
    Discovery,
    /// By bucket key.
    Key {
        #[serde(default)]
        dir: Dir,
    },
    /// By an aggregate value.
    Aggregate {
        label: String,
        #[serde(default)]
        dir: Dir,
    },
    /// By an aggregate divided by the member count, e.g. an average score.
    Mean {
        label: String,
        #[serde(default)]
        dir: Dir,
    },
}

impl BucketOrder {
    fn label(&self) -> Option<&str> {
        match self {
            BucketOrder::Aggregate { label, .. } | BucketOrder::Mean { label, .. } => Some(label),
            _ => None,
        }
    }

    fn compare<T>(&self, a: &Bucket<'_, T>, b: &Bucket<'_, T>) -> Ordering {
        match self {
            BucketOrder::Discovery => Ordering::Equal,
            BucketOrder::Key { dir } => {
                let ka = a.key.as_str().unwrap_or_default();
                let kb = b.key.as_str().unwrap_or_default();
                dir.apply(collate(ka, kb))
            }
            BucketOrder::Aggregate { label, dir } => {
                let va = a.aggregates.get(label).unwrap_or(0.0);
                let vb = b.aggregates.get(label).unwrap_or(0.0);
                dir.apply(va.total_cmp(&vb))
            }
            BucketOrder::Mean { label, dir } => {
                let va = a.mean(label).unwrap_or(0.0);
                let vb = b.mean(label).unwrap_or(0.0);
                dir.apply(va.total_cmp(&vb))
            }
        }
    }
}

/// Key of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Named(String),
    /// Records whose group key is missing.
    Ungrouped,
}

impl BucketKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BucketKey::Named(key) => Some(key),
            BucketKey::Ungrouped => None,
        }
    }

    pub fn is_ungrouped(&self) -> bool {
        matches!(self, BucketKey::Ungrouped)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Named(key) => f.write_str(key),
            BucketKey::Ungrouped => f.write_str("(ungrouped)"),
        }
    }
}

/// A named group of records sharing a key, with computed aggregates.
#[derive(Debug, Clone)]
pub struct Bucket<'a, T> {
    pub key: BucketKey,
    pub members: Vec<&'a T>,
    pub aggregates: Aggregates,
}

impl<'a, T> Bucket<'a, T> {
    fn new(key: BucketKey) -> Self {
        Bucket {
            key,
            members: Vec::new(),
            aggregates: Aggregates::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// An aggregate divided by the member count.
    pub fn mean(&self, label: &str) -> Option<f64> {
        if self.members.is_empty() {
            return None;
        }
        self.aggregates
            .get(label)
            .map(|v| v / self.members.len() as f64)
    }
}

/// Partitions records into buckets.
///
/// # Example
///
/// ```
/// use prospect_query::{Aggregate, BucketOrder, Dir, GroupRule};
/// # use prospect_query::{FieldKind, Number, Record, Schema, Value};
/// # struct Task { campaign: Option<String>, score: u8 }
/// # impl Record for Task {
/// #     const ID_FIELD: &'static str = "campaign";
/// #     fn schema() -> Schema {
/// #         Schema::new().field("campaign", FieldKind::Text).field("score", FieldKind::Number)
/// #     }
/// #     fn field_value(&self, field: &str) -> Value<'_> {
/// #         match (field, &self.campaign) {
/// #             ("campaign", Some(c)) => Value::String(c),
/// #             ("score", _) => Value::Number(Number::from(self.score)),
/// #             _ => Value::None,
/// #         }
/// #     }
/// # }
///
/// let rule: GroupRule<Task> = GroupRule::by_field("campaign")
///     .count("tasks")
///     .sum("score_total", "score")
///     .order(BucketOrder::Mean { label: "score_total".into(), dir: Dir::Desc });
/// ```
pub struct GroupRule<T> {
    pub key: GroupKey<T>,
    pub aggregates: Vec<Aggregate>,
    pub order: BucketOrder,
}

impl<T> Clone for GroupRule<T> {
    fn clone(&self) -> Self {
        GroupRule {
            key: self.key.clone(),
            aggregates: self.aggregates.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T> fmt::Debug for GroupRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRule")
            .field("key", &self.key)
            .field("aggregates", &self.aggregates)
            .field("order", &self.order)
            .finish()
    }
}

impl<T: Record> GroupRule<T> {
    pub fn new(key: GroupKey<T>) -> Self {
        GroupRule {
            key,
            aggregates: Vec::new(),
            order: BucketOrder::default(),
        }
    }

    /// Groups by the value of a field.
    pub fn by_field(field: impl Into<String>) -> Self {
        GroupRule::new(GroupKey::Field(field.into()))
    }

    /// Groups by a key computed from the record.
    pub fn by<F>(name: impl Into<String>, key: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        GroupRule::new(GroupKey::Derived {
            name: name.into(),
            key: Arc::new(key),
        })
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    pub fn count(self, label: impl Into<String>) -> Self {
        self.aggregate(Aggregate::count(label))
    }

    pub fn sum(self, label: impl Into<String>, field: impl Into<String>) -> Self {
        self.aggregate(Aggregate::sum(label, field))
    }

    pub fn count_where(self, label: impl Into<String>, rule: FilterRule) -> Self {
        self.aggregate(Aggregate::count_where(label, rule))
    }

    pub fn order(mut self, order: BucketOrder) -> Self {
        self.order = order;
        self
    }

    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if let GroupKey::Field(field) = &self.key {
            match schema.kind_of(field) {
                None => {
                    return Err(ConfigError::UnknownField {
                        field: field.clone(),
                        rule: "group",
                    })
                }
                Some(FieldKind::List) => {
                    return Err(ConfigError::InvalidGroupField {
                        field: field.clone(),
                        kind: FieldKind::List.as_str(),
                    })
                }
                Some(_) => {}
            }
        }

        for (i, aggregate) in self.aggregates.iter().enumerate() {
            if self.aggregates[..i].iter().any(|a| a.label == aggregate.label) {
                return Err(ConfigError::InvalidAggregate {
                    label: aggregate.label.clone(),
                    reason: "duplicate label".to_string(),
                });
            }
            aggregate.validate(schema)?;
        }

        if let Some(label) = self.order.label() {
            if !self.aggregates.iter().any(|a| a.label == label) {
                return Err(ConfigError::UnknownAggregate(label.to_string()));
            }
        }
        Ok(())
    }

    /// Buckets `records` (already filtered), orders each bucket's members by
    /// `sort`, computes aggregates, then orders the buckets.
    pub fn apply<'a>(&self, records: Vec<&'a T>, sort: &[SortRule]) -> Vec<Bucket<'a, T>> {
        let mut buckets: Vec<Bucket<'a, T>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut ungrouped = Bucket::new(BucketKey::Ungrouped);

        for record in records {
            match self.key.key_of(record) {
                Some(key) => {
                    let slot = *index.entry(key.clone()).or_insert_with(|| {
                        buckets.push(Bucket::new(BucketKey::Named(key)));
                        buckets.len() - 1
                    });
                    buckets[slot].members.push(record);
                }
                None => ungrouped.members.push(record),
            }
        }

        if !ungrouped.is_empty() {
            buckets.push(ungrouped);
        }

        for bucket in &mut buckets {
            if !sort.is_empty() {
                bucket
                    .members
                    .sort_by(|a, b| compare_by_rules(*a, *b, sort));
            }
            bucket.aggregates = Aggregates {
                values: self
                    .aggregates
                    .iter()
                    .map(|a| (a.label.clone(), a.compute(&bucket.members)))
                    .collect(),
            };
        }

        buckets.sort_by(|a, b| match (a.key.is_ungrouped(), b.key.is_ungrouped()) {
            (false, false) => self.order.compare(a, b),
            (x, y) => x.cmp(&y),
        });
        buckets
    }
}
