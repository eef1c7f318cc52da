//! Saved views: query configurations in serialized form.
//!
//! A [`SavedView`] holds everything a [`QueryConfig`] holds except derived
//! group keys, which are closures. It round-trips through JSON and YAML so
//! filter bars and presets can be stored and reloaded.
//!
//! ```
//! use prospect_query::SavedView;
//!
//! let view = SavedView::from_yaml(r#"
//! name: hot leads
//! search:
//!   fields: [name, company]
//!   term: acme
//! filters:
//!   - field: score
//!     op: range
//!     value: { min: 70 }
//! sort:
//!   - field: score
//!     dir: desc
//! "#).unwrap();
//!
//! assert_eq!(view.name.as_deref(), Some("hot leads"));
//! assert_eq!(view.filters.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::{FilterRule, SearchRule};
use crate::group::{Aggregate, BucketOrder, GroupKey, GroupRule};
use crate::query::QueryConfig;
use crate::record::Record;
use crate::sort::SortRule;

/// Serializable form of a field-based group rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGrouping {
    pub field: String,
    #[serde(default)]
    pub aggregates: Vec<Aggregate>,
    #[serde(default)]
    pub order: BucketOrder,
}

/// Serializable query configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchRule>,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    #[serde(default)]
    pub sort: Vec<SortRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<SavedGrouping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl SavedView {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builds the query configuration. Rules are not validated here; that
    /// happens when the query runs.
    pub fn into_config<T: Record>(self) -> QueryConfig<T> {
        let mut config = QueryConfig::new();
        if let Some(search) = self.search {
            config = config.search(search.fields, search.term);
        }
        for rule in self.filters {
            config = config.filter(rule);
        }
        for rule in self.sort {
            config = config.sort_by(rule);
        }
        if let Some(grouping) = self.group {
            let mut group = GroupRule::new(GroupKey::Field(grouping.field)).order(grouping.order);
            for aggregate in grouping.aggregates {
                group = group.aggregate(aggregate);
            }
            config = config.group(group);
        }
        if let Some(limit) = self.limit {
            config = config.limit(limit);
        }
        if let Some(offset) = self.offset {
            config = config.offset(offset);
        }
        config
    }

    /// Captures a configuration. Returns `None` when it groups by a derived
    /// key, which cannot be serialized.
    pub fn from_config<T: Record>(config: &QueryConfig<T>) -> Option<Self> {
        let group = match config.group_rule() {
            None => None,
            Some(rule) => match &rule.key {
                GroupKey::Field(field) => Some(SavedGrouping {
                    field: field.clone(),
                    aggregates: rule.aggregates.clone(),
                    order: rule.order.clone(),
                }),
                GroupKey::Derived { .. } => return None,
            },
        };
        Some(SavedView {
            name: None,
            search: config.search_rule().cloned(),
            filters: config.filters().to_vec(),
            sort: config.sort_rules().to_vec(),
            group,
            limit: config.get_limit(),
            offset: config.get_offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::filter::{Bounds, FilterOp};
    use crate::schema::{FieldKind, Schema};
    use crate::sort::Dir;
    use crate::value::{Number, Value};

    #[derive(Debug)]
    struct Lead {
        id: u32,
        status: &'static str,
        score: u8,
    }

    impl Record for Lead {
        const ID_FIELD: &'static str = "id";

        fn schema() -> Schema {
            Schema::new()
                .field("id", FieldKind::Number)
                .field("status", FieldKind::Enum)
                .field("score", FieldKind::Number)
        }

        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "id" => Value::Number(Number::from(self.id)),
                "status" => Value::Enum(self.status),
                "score" => Value::Number(Number::from(self.score)),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn json_view_runs() {
        let view = SavedView::from_json(
            r#"{
                "filters": [{"field": "status", "op": "in-set", "value": ["new", "qualified"]}],
                "sort": [{"field": "score", "dir": "desc"}],
                "group": {
                    "field": "status",
                    "aggregates": [{"label": "n", "kind": "count"}],
                    "order": {"by": "aggregate", "label": "n", "dir": "desc"}
                }
            }"#,
        )
        .unwrap();

        let leads = vec![
            Lead { id: 1, status: "new", score: 20 },
            Lead { id: 2, status: "qualified", score: 80 },
            Lead { id: 3, status: "lost", score: 99 },
            Lead { id: 4, status: "qualified", score: 60 },
        ];

        let result = view.into_config::<Lead>().run(&leads).unwrap();
        let buckets = result.as_grouped().unwrap();
        assert_eq!(buckets[0].key.as_str(), Some("qualified"));
        assert_eq!(result.ids(), vec!["2", "4", "1"]);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = SavedView::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidView(_)));
    }

    #[test]
    fn invalid_rule_surfaces_when_run() {
        let view = SavedView {
            filters: vec![FilterRule::new("nope", FilterOp::Equals, "x")],
            ..SavedView::default()
        };
        let leads: Vec<Lead> = Vec::new();
        let err = view.into_config::<Lead>().run(&leads).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownField { .. }));
    }

    #[test]
    fn blank_dropdown_on_number_field_is_ignored() {
        let view =
            SavedView::from_json(r#"{"filters":[{"field":"score","op":"equals","value":""}]}"#)
                .unwrap();
        let leads = vec![
            Lead { id: 1, status: "new", score: 20 },
            Lead { id: 2, status: "lost", score: 80 },
        ];
        let result = view.into_config::<Lead>().run(&leads).unwrap();
        assert_eq!(result.ids(), vec!["1", "2"]);
    }

    #[test]
    fn captures_config() {
        let config = QueryConfig::<Lead>::new()
            .range("score", Bounds::new(10, 20))
            .sort("score", Dir::Desc)
            .limit(3);
        let view = SavedView::from_config(&config).unwrap();
        assert_eq!(view.filters.len(), 1);
        assert_eq!(view.sort[0].dir, Dir::Desc);
        assert_eq!(view.limit, Some(3));

        let json = view.to_json().unwrap();
        assert_eq!(SavedView::from_json(&json).unwrap(), view);

        let derived = QueryConfig::<Lead>::new()
            .group(GroupRule::by("band", |l: &Lead| Some((l.score / 10).to_string())));
        assert!(SavedView::from_config(&derived).is_none());
    }
}
