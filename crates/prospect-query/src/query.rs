//! Query configuration builder and executor.
//!
//! [`QueryConfig`] provides a fluent builder for describing a derived view of
//! a record collection, and [`run_query`] evaluates it.

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;
use crate::filter::{Bounds, FilterRule, RuleValue, SearchRule};
use crate::group::{Bucket, GroupRule};
use crate::record::Record;
use crate::sort::{compare_by_rules, Dir, SortRule};

/// A declarative query over a collection of `T`.
///
/// The evaluation order is fixed:
///
/// ```text
/// filter (search AND every active rule)
///   -> group (optional, first-seen key order)
///   -> sort members (stable, by the sort rules in order)
///   -> order buckets (ungrouped bucket last)
/// ```
///
/// Without a group rule the filtered records are sorted, then `offset` and
/// `limit` apply.
///
/// # Example
///
/// ```
/// use prospect_query::{Bounds, QueryConfig, run_query};
/// # use prospect_query::{FieldKind, Number, Record, Schema, Value};
/// # struct Lead { id: u32, name: String, score: u8 }
/// # impl Record for Lead {
/// #     const ID_FIELD: &'static str = "id";
/// #     fn schema() -> Schema {
/// #         Schema::new()
/// #             .field("id", FieldKind::Number)
/// #             .field("name", FieldKind::Text)
/// #             .field("score", FieldKind::Number)
/// #     }
/// #     fn field_value(&self, field: &str) -> Value<'_> {
/// #         match field {
/// #             "id" => Value::Number(Number::from(self.id)),
/// #             "name" => Value::String(&self.name),
/// #             "score" => Value::Number(Number::from(self.score)),
/// #             _ => Value::None,
/// #         }
/// #     }
/// # }
///
/// let leads = vec![
///     Lead { id: 1, name: "Ada".into(), score: 90 },
///     Lead { id: 2, name: "Bob".into(), score: 60 },
///     Lead { id: 3, name: "Cy".into(), score: 75 },
/// ];
///
/// let config = QueryConfig::<Lead>::new()
///     .range("score", Bounds::new(70, 100))
///     .sort_desc("score");
///
/// let result = run_query(&leads, &config).unwrap();
/// assert_eq!(result.ids(), vec!["1", "3"]);
/// ```
pub struct QueryConfig<T> {
    search: Option<SearchRule>,
    filters: Vec<FilterRule>,
    sort: Vec<SortRule>,
    group: Option<GroupRule<T>>,
    limit: Option<usize>,
    offset: Option<usize>,
    _record: PhantomData<fn(&T)>,
}

impl<T> Default for QueryConfig<T> {
    fn default() -> Self {
        QueryConfig {
            search: None,
            filters: Vec::new(),
            sort: Vec::new(),
            group: None,
            limit: None,
            offset: None,
            _record: PhantomData,
        }
    }
}

impl<T> Clone for QueryConfig<T> {
    fn clone(&self) -> Self {
        QueryConfig {
            search: self.search.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            group: self.group.clone(),
            limit: self.limit,
            offset: self.offset,
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for QueryConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("search", &self.search)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("group", &self.group)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Record> QueryConfig<T> {
    /// Creates an empty query, which returns every record in input order.
    pub fn new() -> Self {
        QueryConfig::default()
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Sets the free-text search rule.
    pub fn search<I, S>(mut self, fields: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(SearchRule::new(fields, term));
        self
    }

    /// Adds a filter rule, AND-combined with the others.
    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filters.push(rule);
        self
    }

    pub fn equals(self, field: &str, value: impl Into<RuleValue>) -> Self {
        self.filter(FilterRule::equals(field, value))
    }

    pub fn contains(self, field: &str, term: impl Into<String>) -> Self {
        self.filter(FilterRule::contains(field, term))
    }

    pub fn range(self, field: &str, bounds: Bounds) -> Self {
        self.filter(FilterRule::range(field, bounds))
    }

    pub fn in_set<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<RuleValue>,
    {
        self.filter(FilterRule::in_set(field, values))
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Adds a sort rule. The first one added is the primary key; later ones
    /// only break ties.
    pub fn sort_by(mut self, rule: SortRule) -> Self {
        self.sort.push(rule);
        self
    }

    pub fn sort(self, field: &str, dir: Dir) -> Self {
        self.sort_by(SortRule::new(field, dir))
    }

    pub fn sort_asc(self, field: &str) -> Self {
        self.sort(field, Dir::Asc)
    }

    pub fn sort_desc(self, field: &str) -> Self {
        self.sort(field, Dir::Desc)
    }

    // ========================================================================
    // Grouping and paging
    // ========================================================================

    pub fn group(mut self, rule: GroupRule<T>) -> Self {
        self.group = Some(rule);
        self
    }

    /// Maximum number of records returned by an ungrouped query.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Number of records an ungrouped query skips.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn search_rule(&self) -> Option<&SearchRule> {
        self.search.as_ref()
    }

    pub fn filters(&self) -> &[FilterRule] {
        &self.filters
    }

    pub fn sort_rules(&self) -> &[SortRule] {
        &self.sort
    }

    pub fn group_rule(&self) -> Option<&GroupRule<T>> {
        self.group.as_ref()
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    // ========================================================================
    // Validation and execution
    // ========================================================================

    /// Checks every rule against `T`'s schema.
    pub fn validate(&self) -> Result<()> {
        let schema = T::schema();
        if let Some(search) = &self.search {
            search.validate(&schema)?;
        }
        for rule in &self.filters {
            rule.validate(&schema)?;
        }
        for rule in &self.sort {
            rule.validate(&schema)?;
        }
        if let Some(group) = &self.group {
            group.validate(&schema)?;
        }
        Ok(())
    }

    /// Tests a single record against the search and filter rules.
    ///
    /// Assumes the configuration is valid; see [`QueryConfig::validate`].
    pub fn matches(&self, record: &T) -> bool {
        if let Some(search) = &self.search {
            if search.is_active() && !search.matches(record) {
                return false;
            }
        }
        self.filters
            .iter()
            .filter(|rule| rule.is_active())
            .all(|rule| rule.matches_record(record))
    }

    /// Counts matching records.
    pub fn count(&self, records: &[T]) -> Result<usize> {
        self.validate()?;
        Ok(records.iter().filter(|r| self.matches(r)).count())
    }

    /// Validates and evaluates this query. Same as [`run_query`].
    pub fn run<'a>(&self, records: &'a [T]) -> Result<QueryResult<'a, T>> {
        run_query(records, self)
    }
}

/// Evaluates a query against a collection.
///
/// The configuration is validated before any record is read; an invalid
/// configuration is an error, a query matching nothing is an empty result.
/// `records` is only borrowed, and the result refers into it.
pub fn run_query<'a, T: Record>(
    records: &'a [T],
    config: &QueryConfig<T>,
) -> Result<QueryResult<'a, T>> {
    config.validate()?;

    if tracing::enabled!(tracing::Level::TRACE) {
        let skipped = config.filters.iter().filter(|r| !r.is_active()).count();
        let search_skipped = config.search.as_ref().is_some_and(|s| !s.is_active());
        tracing::trace!(skipped, search_skipped, "inactive rules skipped");
    }

    let mut matched: Vec<&'a T> = records.iter().filter(|r| config.matches(r)).collect();

    let result = match &config.group {
        Some(group) => {
            let buckets = group.apply(matched, &config.sort);
            tracing::debug!(
                records = records.len(),
                buckets = buckets.len(),
                group = group.key.name(),
                "grouped query evaluated"
            );
            QueryResult::Grouped(buckets)
        }
        None => {
            if !config.sort.is_empty() {
                matched.sort_by(|a, b| compare_by_rules(*a, *b, &config.sort));
            }
            let matched_len = matched.len();
            let page: Vec<&'a T> = matched
                .into_iter()
                .skip(config.offset.unwrap_or(0))
                .take(config.limit.unwrap_or(usize::MAX))
                .collect();
            tracing::debug!(
                records = records.len(),
                matched = matched_len,
                returned = page.len(),
                "query evaluated"
            );
            QueryResult::Flat(page)
        }
    };
    Ok(result)
}

/// Output of [`run_query`].
#[derive(Debug, Clone)]
pub enum QueryResult<'a, T> {
    /// Ordered records of an ungrouped query.
    Flat(Vec<&'a T>),
    /// Ordered buckets of a grouped query.
    Grouped(Vec<Bucket<'a, T>>),
}

impl<'a, T: Record> QueryResult<'a, T> {
    /// Returns `true` if no record matched. Callers render their
    /// "no results" state on this.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in the result, across all buckets.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Flat(records) => records.len(),
            QueryResult::Grouped(buckets) => buckets.iter().map(Bucket::len).sum(),
        }
    }

    /// All records in result order; grouped results are read bucket by bucket.
    pub fn records(&self) -> Vec<&'a T> {
        match self {
            QueryResult::Flat(records) => records.clone(),
            QueryResult::Grouped(buckets) => buckets
                .iter()
                .flat_map(|b| b.members.iter().copied())
                .collect(),
        }
    }

    /// Identifiers of the records in result order, in string form.
    pub fn ids(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| r.record_id().to_key_string().map(|id| id.into_owned()))
            .collect()
    }

    pub fn as_flat(&self) -> Option<&[&'a T]> {
        match self {
            QueryResult::Flat(records) => Some(records),
            QueryResult::Grouped(_) => None,
        }
    }

    pub fn as_grouped(&self) -> Option<&[Bucket<'a, T>]> {
        match self {
            QueryResult::Grouped(buckets) => Some(buckets),
            QueryResult::Flat(_) => None,
        }
    }
}
