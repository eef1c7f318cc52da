//! Sort rules and comparator resolution.
//!
//! Provides [`Dir`] for sort direction, [`RankMap`] for enums with an
//! explicit order, and [`SortRule`] for field-based ordering.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::record::Record;
use crate::schema::{FieldKind, Schema};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// The opposite direction, for a second click on a column header.
    pub fn toggle(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit rank table for enum-like text fields.
///
/// Labels not in the table rank below every mapped label.
///
/// ```
/// use prospect_query::{RankMap, Value};
///
/// let ranks = RankMap::priority();
/// assert_eq!(ranks.rank_of(&Value::Enum("high")), Some(3));
/// assert_eq!(ranks.rank_of(&Value::Enum("urgent")), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankMap {
    ranks: BTreeMap<String, i64>,
}

impl RankMap {
    pub fn new<I, S>(ranks: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        RankMap {
            ranks: ranks.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// `high=3, medium=2, low=1`.
    pub fn priority() -> Self {
        RankMap::new([("high", 3), ("medium", 2), ("low", 1)])
    }

    pub fn rank_of(&self, value: &Value<'_>) -> Option<i64> {
        value.as_str().and_then(|label| self.ranks.get(label).copied())
    }
}

/// A single sort key: a field, a direction and an optional rank table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(default)]
    pub dir: Dir,
    /// Rank table overriding natural ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<RankMap>,
}

impl SortRule {
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        SortRule {
            field: field.into(),
            dir,
            rank: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        SortRule::new(field, Dir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortRule::new(field, Dir::Desc)
    }

    /// Orders the field through a rank table instead of its natural order.
    pub fn ranked(mut self, rank: RankMap) -> Self {
        self.rank = Some(rank);
        self
    }

    /// The same rule with the direction flipped.
    pub fn toggled(mut self) -> Self {
        self.dir = self.dir.toggle();
        self
    }

    /// Compares two records by this rule.
    ///
    /// Missing values sort after present ones whatever the direction.
    pub fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        let va = a.field_value(&self.field);
        let vb = b.field_value(&self.field);

        match (va.is_none(), vb.is_none()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let base = match &self.rank {
            Some(rank) => rank.rank_of(&va).cmp(&rank.rank_of(&vb)),
            None => compare_values(&va, &vb),
        };
        self.dir.apply(base)
    }

    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let kind = schema
            .kind_of(&self.field)
            .ok_or_else(|| ConfigError::UnknownField {
                field: self.field.clone(),
                rule: "sort",
            })?;
        if self.rank.is_some() && !matches!(kind, FieldKind::Text | FieldKind::Enum) {
            return Err(ConfigError::InvalidOperatorForType {
                op: "rank",
                kind: kind.as_str(),
                field: self.field.clone(),
            });
        }
        Ok(())
    }
}

/// Natural ordering of two present values.
///
/// Values of different types are compared through their string form.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(x) | Value::Enum(x), Value::String(y) | Value::Enum(y)) => collate(x, y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(*y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Number(_), Value::Timestamp(_)) | (Value::Timestamp(_), Value::Number(_)) => {
            match (a.numeric(), b.numeric()) {
                (Some(x), Some(y)) => x.total_cmp(y),
                _ => Ordering::Equal,
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::List(x), Value::List(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(p, q)| collate(p, q))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => {
            tracing::trace!(
                left = a.type_name(),
                right = b.type_name(),
                "comparing mixed types as strings"
            );
            match (a.to_key_string(), b.to_key_string()) {
                (Some(x), Some(y)) => collate(&x, &y),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            }
        }
    }
}

/// Compares two records using a list of sort rules.
///
/// The first rule is the primary key, the next one breaks its ties, and so on.
pub fn compare_by_rules<T: Record>(a: &T, b: &T, rules: &[SortRule]) -> Ordering {
    rules
        .iter()
        .map(|rule| rule.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Locale-style string collation.
///
/// Strings are first compared transliterated to ASCII and case-folded, so
/// `"émile" < "Frank"`. Strings equal under that folding are ordered
/// character by character with lowercase before uppercase and unaccented
/// before accented, so two different strings never compare equal.
///
/// ```
/// use std::cmp::Ordering;
/// use prospect_query::collate;
///
/// assert_eq!(collate("apple", "Banana"), Ordering::Less);
/// assert_eq!(collate("a", "A"), Ordering::Less);
/// assert_eq!(collate("Émile", "Frank"), Ordering::Less);
/// ```
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.chars().map(char_key).cmp(b.chars().map(char_key)))
}

fn fold(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

fn char_key(c: char) -> (char, bool, char) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    (lower, c.is_uppercase(), c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    #[test]
    fn dir_apply_and_toggle() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Asc.toggle(), Dir::Desc);
        assert_eq!(Dir::Desc.toggle().toggle(), Dir::Desc);
    }

    #[test]
    fn collation() {
        assert_eq!(collate("apple", "banana"), Ordering::Less);
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Apple", "apple"), Ordering::Greater);
        assert_eq!(collate("apple", "apple"), Ordering::Equal);
        assert_eq!(collate("resume", "résumé"), Ordering::Less);
        assert_eq!(collate("Zoë", "zoe"), Ordering::Greater);
    }

    #[test]
    fn compare_numbers_and_timestamps() {
        let a = Value::Number(Number::I64(10));
        let b = Value::Number(Number::F64(20.5));
        assert_eq!(compare_values(&a, &b), Ordering::Less);

        let t = Value::Timestamp(Timestamp(5));
        assert_eq!(compare_values(&t, &a), Ordering::Less);
    }

    #[test]
    fn compare_nan_is_total() {
        let nan = Value::Number(Number::F64(f64::NAN));
        let one = Value::Number(Number::F64(1.0));
        assert_eq!(compare_values(&nan, &one), Ordering::Greater);
        assert_eq!(compare_values(&one, &nan), Ordering::Less);
    }

    #[test]
    fn compare_mixed_types_as_strings() {
        let s = Value::String("75");
        let n = Value::Number(Number::I64(100));
        // "100" < "75" as strings
        assert_eq!(compare_values(&n, &s), Ordering::Less);

        let b = Value::Bool(true);
        assert_eq!(compare_values(&b, &Value::String("apple")), Ordering::Greater);
    }

    #[test]
    fn compare_lists() {
        let a = vec!["alpha".to_string()];
        let b = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(
            compare_values(&Value::List(&a), &Value::List(&b)),
            Ordering::Less
        );
    }

    #[test]
    fn rank_map_ranks_unmapped_lowest() {
        let ranks = RankMap::priority();
        assert!(ranks.rank_of(&Value::Enum("low")) > ranks.rank_of(&Value::Enum("someday")));
        assert_eq!(ranks.rank_of(&Value::Number(Number::I64(3))), None);
    }

    #[test]
    fn rank_map_deserializes_from_object() {
        let ranks: RankMap = serde_json::from_str(r#"{"high":3,"medium":2,"low":1}"#).unwrap();
        assert_eq!(ranks, RankMap::priority());
    }

    #[test]
    fn sort_rule_validation() {
        let schema = Schema::new()
            .field("score", FieldKind::Number)
            .field("priority", FieldKind::Enum);

        assert!(SortRule::desc("score").validate(&schema).is_ok());
        assert!(SortRule::desc("priority")
            .ranked(RankMap::priority())
            .validate(&schema)
            .is_ok());
        assert!(matches!(
            SortRule::asc("missing").validate(&schema),
            Err(ConfigError::UnknownField { rule: "sort", .. })
        ));
        assert!(SortRule::asc("score")
            .ranked(RankMap::priority())
            .validate(&schema)
            .is_err());
    }
}
