//! Filter rules and the free-text search rule.
//!
//! A [`FilterRule`] is a single field-level inclusion condition: a field
//! name, a predicate kind and a value. A [`SearchRule`] matches a term
//! against several text fields at once.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::record::Record;
use crate::schema::{FieldKind, Schema};
use crate::value::{Number, Timestamp, Value};

/// Predicate kind of a filter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOp {
    /// Exact match. Valid for every field kind.
    Equals,
    /// Case-insensitive substring match. Valid for text, enum and list fields.
    Contains,
    /// Inclusive numeric bounds. Valid for number and timestamp fields.
    Range,
    /// Value is one of a set.
    InSet,
}

impl FilterOp {
    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::Contains => "contains",
            FilterOp::Range => "range",
            FilterOp::InSet => "in-set",
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric bounds; either side may be open.
///
/// With both sides open the range is the "default range" and the rule
/// is skipped. A range with `min > max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<Number>,
    #[serde(default)]
    pub max: Option<Number>,
}

impl Bounds {
    pub fn new(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        Bounds {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn at_least(min: impl Into<Number>) -> Self {
        Bounds {
            min: Some(min.into()),
            max: None,
        }
    }

    pub fn at_most(max: impl Into<Number>) -> Self {
        Bounds {
            min: None,
            max: Some(max.into()),
        }
    }

    /// Returns `true` if neither side is bounded.
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns `true` if `n` lies within the bounds. NaN never does.
    pub fn contains(&self, n: Number) -> bool {
        let above_min = match self.min {
            Some(min) => matches!(
                n.compare(min),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            None => !n.is_nan(),
        };
        let below_max = match self.max {
            Some(max) => matches!(
                n.compare(max),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            None => !n.is_nan(),
        };
        above_min && below_max
    }
}

/// Owned value stored in a rule.
///
/// Unlike [`Value`], which borrows from the record, `RuleValue` owns its
/// data so it can live in a query configuration. In serialized form the
/// variant is picked from the shape of the data: a string is text, a number
/// is a number, an object is a range and an array is a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Number(Number),
    Text(String),
    Set(Vec<RuleValue>),
    Range(Bounds),
    Timestamp(Timestamp),
}

impl RuleValue {
    /// Returns `true` when the value is "unset" and the rule should be skipped.
    pub fn is_unset(&self) -> bool {
        match self {
            RuleValue::Text(s) => s.is_empty(),
            RuleValue::Set(items) => items.is_empty(),
            RuleValue::Range(bounds) => bounds.is_open(),
            _ => false,
        }
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RuleValue::Bool(_) => "bool",
            RuleValue::Number(_) => "number",
            RuleValue::Text(_) => "text",
            RuleValue::Set(_) => "set",
            RuleValue::Range(_) => "range",
            RuleValue::Timestamp(_) => "timestamp",
        }
    }

    /// Exact equality against a field value.
    fn equals(&self, field: &Value<'_>) -> bool {
        match (self, field) {
            (RuleValue::Text(v), Value::String(s) | Value::Enum(s)) => v == s,
            (RuleValue::Text(v), Value::List(items)) => items.iter().any(|item| item == v),
            (RuleValue::Number(v), _) => field
                .numeric()
                .and_then(|n| n.compare(*v))
                .is_some_and(|o| o.is_eq()),
            (RuleValue::Timestamp(v), _) => field
                .numeric()
                .and_then(|n| n.compare(Number::I64(v.as_millis())))
                .is_some_and(|o| o.is_eq()),
            (RuleValue::Bool(v), Value::Bool(b)) => v == b,
            _ => false,
        }
    }

    /// Whether this scalar value can be compared with a field of `kind`.
    fn fits(&self, kind: FieldKind) -> bool {
        match self {
            RuleValue::Text(_) => kind.is_textual(),
            RuleValue::Number(_) | RuleValue::Timestamp(_) => kind.is_numeric(),
            RuleValue::Bool(_) => kind == FieldKind::Bool,
            RuleValue::Set(_) | RuleValue::Range(_) => false,
        }
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Text(s.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::Text(s)
    }
}

impl From<bool> for RuleValue {
    fn from(b: bool) -> Self {
        RuleValue::Bool(b)
    }
}

impl From<Timestamp> for RuleValue {
    fn from(t: Timestamp) -> Self {
        RuleValue::Timestamp(t)
    }
}

impl From<Bounds> for RuleValue {
    fn from(b: Bounds) -> Self {
        RuleValue::Range(b)
    }
}

macro_rules! rule_value_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for RuleValue {
                fn from(n: $source) -> Self {
                    RuleValue::Number(Number::from(n))
                }
            }
        )*
    };
}

rule_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Number> for RuleValue {
    fn from(n: Number) -> Self {
        RuleValue::Number(n)
    }
}

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use prospect_query::{Bounds, FilterRule, Number, Value};
///
/// let rule = FilterRule::range("score", Bounds::new(70, 100));
/// assert!(rule.matches(&Value::Number(Number::I64(70))));
/// assert!(!rule.matches(&Value::Number(Number::I64(60))));
/// assert!(!rule.matches(&Value::None));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// The field name to compare.
    pub field: String,
    /// The predicate kind.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: RuleValue,
}

impl FilterRule {
    /// Creates a new rule.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<RuleValue>) -> Self {
        FilterRule {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<RuleValue>) -> Self {
        FilterRule::new(field, FilterOp::Equals, value)
    }

    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        FilterRule::new(field, FilterOp::Contains, RuleValue::Text(term.into()))
    }

    pub fn range(field: impl Into<String>, bounds: Bounds) -> Self {
        FilterRule::new(field, FilterOp::Range, RuleValue::Range(bounds))
    }

    pub fn in_set<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<RuleValue>,
    {
        let set = values.into_iter().map(Into::into).collect();
        FilterRule::new(field, FilterOp::InSet, RuleValue::Set(set))
    }

    /// Returns `false` when the rule's value is unset and the rule is a no-op.
    pub fn is_active(&self) -> bool {
        !self.value.is_unset()
    }

    /// Evaluates this rule against a field value.
    ///
    /// A missing value never matches; neither does a value of the wrong type.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        if field_value.is_none() {
            return false;
        }
        match (self.op, &self.value) {
            (FilterOp::Equals, value) => value.equals(field_value),
            (FilterOp::Contains, RuleValue::Text(term)) => contains_folded(field_value, term),
            (FilterOp::Range, RuleValue::Range(bounds)) => field_value
                .numeric()
                .is_some_and(|n| bounds.contains(n)),
            (FilterOp::InSet, RuleValue::Set(set)) => set.iter().any(|v| v.equals(field_value)),
            _ => false,
        }
    }

    /// Evaluates this rule against a record.
    pub fn matches_record<T: Record>(&self, record: &T) -> bool {
        self.matches(&record.field_value(&self.field))
    }

    /// Checks the rule against a record schema.
    ///
    /// An inactive rule only needs its field to exist.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let kind = schema
            .kind_of(&self.field)
            .ok_or_else(|| ConfigError::UnknownField {
                field: self.field.clone(),
                rule: "filter",
            })?;

        if !self.is_active() {
            return Ok(());
        }

        match self.op {
            FilterOp::Equals => self.check_scalar(&self.value, kind),
            FilterOp::Contains => {
                if !kind.is_textual() {
                    return Err(self.invalid_op(kind));
                }
                match &self.value {
                    RuleValue::Text(_) => Ok(()),
                    other => Err(self.mismatch("text", other)),
                }
            }
            FilterOp::Range => {
                if !kind.is_numeric() {
                    return Err(ConfigError::InvalidRange {
                        field: self.field.clone(),
                        reason: format!("bounds on {} field", kind),
                    });
                }
                match &self.value {
                    RuleValue::Range(bounds) => {
                        let nan = [bounds.min, bounds.max]
                            .into_iter()
                            .flatten()
                            .any(Number::is_nan);
                        if nan {
                            return Err(ConfigError::InvalidRange {
                                field: self.field.clone(),
                                reason: "bound is not a number".to_string(),
                            });
                        }
                        Ok(())
                    }
                    other => Err(self.mismatch("range", other)),
                }
            }
            FilterOp::InSet => match &self.value {
                RuleValue::Set(items) => items
                    .iter()
                    .try_for_each(|item| self.check_scalar(item, kind)),
                other => Err(self.mismatch("set", other)),
            },
        }
    }

    fn check_scalar(&self, value: &RuleValue, kind: FieldKind) -> Result<()> {
        if value.fits(kind) {
            Ok(())
        } else {
            Err(self.mismatch(kind.as_str(), value))
        }
    }

    fn invalid_op(&self, kind: FieldKind) -> ConfigError {
        ConfigError::InvalidOperatorForType {
            op: self.op.as_str(),
            kind: kind.as_str(),
            field: self.field.clone(),
        }
    }

    fn mismatch(&self, expected: &'static str, actual: &RuleValue) -> ConfigError {
        ConfigError::TypeMismatch {
            field: self.field.clone(),
            expected,
            actual: actual.type_name(),
        }
    }
}

/// Free-text search: matches when any of the listed fields contains the
/// term, ignoring case.
///
/// ```
/// use prospect_query::SearchRule;
///
/// let search = SearchRule::new(["name", "company", "email"], "  acme ");
/// assert_eq!(search.term(), "acme");
/// assert!(search.is_active());
/// assert!(!SearchRule::new(["name"], "   ").is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRule {
    pub fields: Vec<String>,
    pub term: String,
}

impl SearchRule {
    pub fn new<I, S>(fields: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchRule {
            fields: fields.into_iter().map(Into::into).collect(),
            term: term.into(),
        }
    }

    /// The trimmed search term.
    pub fn term(&self) -> &str {
        self.term.trim()
    }

    /// An empty or whitespace-only term matches everything.
    pub fn is_active(&self) -> bool {
        !self.term().is_empty()
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        let term = self.term();
        self.fields
            .iter()
            .any(|field| contains_folded(&record.field_value(field), term))
    }

    /// Every searched field must exist and be text-like.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        for field in &self.fields {
            let kind = schema
                .kind_of(field)
                .ok_or_else(|| ConfigError::UnknownField {
                    field: field.clone(),
                    rule: "search",
                })?;
            if !kind.is_textual() {
                return Err(ConfigError::InvalidOperatorForType {
                    op: "search",
                    kind: kind.as_str(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

fn contains_folded(value: &Value<'_>, term: &str) -> bool {
    let needle = term.to_lowercase();
    match value {
        Value::String(s) | Value::Enum(s) => s.to_lowercase().contains(&needle),
        Value::List(items) => items
            .iter()
            .any(|item| item.to_lowercase().contains(&needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_text_is_case_sensitive() {
        let rule = FilterRule::equals("status", "qualified");
        assert!(rule.matches(&Value::String("qualified")));
        assert!(rule.matches(&Value::Enum("qualified")));
        assert!(!rule.matches(&Value::String("Qualified")));
    }

    #[test]
    fn equals_numbers_across_representations() {
        let rule = FilterRule::equals("score", 90i64);
        assert!(rule.matches(&Value::Number(Number::U64(90))));
        assert!(rule.matches(&Value::Number(Number::F64(90.0))));
        assert!(!rule.matches(&Value::Number(Number::I64(91))));
    }

    #[test]
    fn equals_on_list_checks_membership() {
        let tags = vec!["enterprise".to_string(), "hot".to_string()];
        assert!(FilterRule::equals("tags", "hot").matches(&Value::List(&tags)));
        assert!(!FilterRule::equals("tags", "ho").matches(&Value::List(&tags)));
    }

    #[test]
    fn contains_ignores_case() {
        let rule = FilterRule::contains("company", "ACME");
        assert!(rule.matches(&Value::String("Acme Corp")));
        assert!(rule.matches(&Value::String("the acme")));
        assert!(!rule.matches(&Value::String("Globex")));
    }

    #[test]
    fn contains_on_list_matches_any_element() {
        let tags = vec!["Enterprise".to_string(), "renewal".to_string()];
        assert!(FilterRule::contains("tags", "prise").matches(&Value::List(&tags)));
        assert!(!FilterRule::contains("tags", "churn").matches(&Value::List(&tags)));
    }

    #[test]
    fn range_is_inclusive() {
        let rule = FilterRule::range("score", Bounds::new(70, 100));
        assert!(rule.matches(&Value::Number(Number::I64(70))));
        assert!(rule.matches(&Value::Number(Number::I64(100))));
        assert!(!rule.matches(&Value::Number(Number::I64(69))));
        assert!(!rule.matches(&Value::Number(Number::I64(101))));
    }

    #[test]
    fn empty_range_matches_nothing() {
        let rule = FilterRule::range("score", Bounds::new(80, 20));
        for n in [0i64, 20, 50, 80, 100] {
            assert!(!rule.matches(&Value::Number(Number::I64(n))));
        }
    }

    #[test]
    fn half_open_ranges() {
        let rule = FilterRule::range("score", Bounds::at_least(50));
        assert!(rule.matches(&Value::Number(Number::I64(1000))));
        assert!(!rule.matches(&Value::Number(Number::I64(49))));

        let rule = FilterRule::range("score", Bounds::at_most(50));
        assert!(rule.matches(&Value::Number(Number::I64(-3))));
        assert!(!rule.matches(&Value::Number(Number::F64(f64::NAN))));
    }

    #[test]
    fn range_on_timestamps_uses_millis() {
        let rule = FilterRule::range("due", Bounds::new(1000, 2000));
        assert!(rule.matches(&Value::Timestamp(Timestamp(1500))));
        assert!(!rule.matches(&Value::Timestamp(Timestamp(2500))));
    }

    #[test]
    fn in_set() {
        let rule = FilterRule::in_set("priority", ["high", "medium"]);
        assert!(rule.matches(&Value::Enum("high")));
        assert!(rule.matches(&Value::Enum("medium")));
        assert!(!rule.matches(&Value::Enum("low")));
    }

    #[test]
    fn missing_value_never_matches() {
        let rules = [
            FilterRule::equals("name", "x"),
            FilterRule::contains("name", "x"),
            FilterRule::range("score", Bounds::new(0, 10)),
            FilterRule::in_set("status", ["open"]),
        ];
        for rule in rules {
            assert!(!rule.matches(&Value::None), "{} matched None", rule.op);
        }
    }

    #[test]
    fn unset_values_are_inactive() {
        assert!(!FilterRule::equals("status", "").is_active());
        assert!(!FilterRule::contains("name", "").is_active());
        assert!(!FilterRule::range("score", Bounds::default()).is_active());
        assert!(!FilterRule::in_set("status", Vec::<&str>::new()).is_active());
        assert!(FilterRule::equals("done", false).is_active());
    }

    fn schema() -> Schema {
        Schema::new()
            .field("name", FieldKind::Text)
            .field("score", FieldKind::Number)
            .field("priority", FieldKind::Enum)
            .field("done", FieldKind::Bool)
    }

    #[test]
    fn validate_unknown_field() {
        let err = FilterRule::equals("nonexistent", "x")
            .validate(&schema())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownField { rule: "filter", .. }));
    }

    #[test]
    fn validate_range_on_text_field() {
        let err = FilterRule::range("name", Bounds::new(1, 2))
            .validate(&schema())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn validate_nan_bound() {
        let err = FilterRule::range("score", Bounds::new(f64::NAN, 2.0))
            .validate(&schema())
            .unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn validate_contains_on_number() {
        let err = FilterRule::contains("score", "9")
            .validate(&schema())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOperatorForType { op: "contains", .. }));
    }

    #[test]
    fn validate_type_mismatch() {
        let err = FilterRule::equals("done", "yes")
            .validate(&schema())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch {
                expected: "bool",
                actual: "text",
                ..
            }
        ));
        assert!(FilterRule::in_set("priority", ["high"]).validate(&schema()).is_ok());
        assert!(FilterRule::in_set("priority", [1i64]).validate(&schema()).is_err());
    }

    #[test]
    fn search_validation() {
        let ok = SearchRule::new(["name", "priority"], "x");
        assert!(ok.validate(&schema()).is_ok());

        let err = SearchRule::new(["name", "score"], "x")
            .validate(&schema())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOperatorForType { op: "search", .. }));
    }

    #[test]
    fn rule_deserializes_from_shape() {
        let rule: FilterRule =
            serde_json::from_str(r#"{"field":"score","op":"range","value":{"min":70,"max":100}}"#)
                .unwrap();
        assert_eq!(rule, FilterRule::range("score", Bounds::new(70i64, 100i64)));

        let rule: FilterRule =
            serde_json::from_str(r#"{"field":"priority","op":"in-set","value":["high","low"]}"#)
                .unwrap();
        assert_eq!(rule, FilterRule::in_set("priority", ["high", "low"]));
    }
}
