//! View presets: the query configurations behind the dashboard's tables and
//! grouped task lists.
//!
//! Table presets turn the state of a filter bar ([`LeadFilters`],
//! [`ContactFilters`], [`TaskFilters`]) into a [`QueryConfig`]. Grouped
//! presets bucket tasks by campaign, account or contact and rank the
//! buckets by their average predictive score.

use prospect_query::{
    Bounds, Bucket, BucketOrder, Dir, FilterRule, GroupRule, QueryConfig, RecordEnum, SortRule,
};
use serde::{Deserialize, Serialize};

use crate::records::{Contact, Lead, LeadStatus, Priority, Task, TaskStatus};

/// Fields the lead table's search box looks in.
pub const LEAD_SEARCH_FIELDS: [&str; 4] = [Lead::NAME, Lead::TITLE, Lead::COMPANY, Lead::EMAIL];

/// Fields the contact table's search box looks in.
pub const CONTACT_SEARCH_FIELDS: [&str; 4] =
    [Contact::NAME, Contact::EMAIL, Contact::COMPANY, Contact::TITLE];

/// Fields the task list's search box looks in.
pub const TASK_SEARCH_FIELDS: [&str; 2] = [Task::TITLE, Task::DESCRIPTION];

/// Labels of the aggregates computed by the grouped task presets.
pub mod aggregate {
    pub const TASKS: &str = "tasks";
    pub const SCORE_TOTAL: &str = "score_total";
    pub const COMPLETED: &str = "completed";
    pub const HIGH_PRIORITY: &str = "high_priority";
}

/// Sort column of a table and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub column: String,
    #[serde(default)]
    pub dir: Dir,
}

impl ColumnSort {
    pub fn new(column: impl Into<String>, dir: Dir) -> Self {
        ColumnSort {
            column: column.into(),
            dir,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        ColumnSort::new(column, Dir::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        ColumnSort::new(column, Dir::Desc)
    }

    /// State after a click on a column header: the same column flips
    /// direction, another column starts ascending.
    pub fn click(&self, column: &str) -> ColumnSort {
        if self.column == column {
            ColumnSort::new(column, self.dir.toggle())
        } else {
            ColumnSort::asc(column)
        }
    }

    fn rule(&self) -> SortRule {
        SortRule::new(self.column.as_str(), self.dir)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Filter bar of the lead table. `None` on a dropdown means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilters {
    pub search: String,
    pub status: Option<LeadStatus>,
    pub score: Bounds,
    pub tag: Option<String>,
    pub sort: Option<ColumnSort>,
}

/// Lead table: sorted by score, highest first, unless a column is picked.
/// Name breaks ties.
pub fn lead_table(filters: &LeadFilters) -> QueryConfig<Lead> {
    let mut config = QueryConfig::new()
        .search(LEAD_SEARCH_FIELDS, filters.search.as_str())
        .range(Lead::SCORE, filters.score);

    if let Some(status) = filters.status {
        config = config.equals(Lead::STATUS, status.label());
    }
    if let Some(tag) = &filters.tag {
        config = config.equals(Lead::TAGS, tag.as_str());
    }

    let sort = filters
        .sort
        .clone()
        .unwrap_or_else(|| ColumnSort::desc(Lead::SCORE));
    config.sort_by(sort.rule()).sort_asc(Lead::NAME)
}

/// Filter bar of the contact table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFilters {
    pub search: String,
    pub company: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<ColumnSort>,
}

/// Contact table: alphabetical by name unless a column is picked.
pub fn contact_table(filters: &ContactFilters) -> QueryConfig<Contact> {
    let mut config =
        QueryConfig::new().search(CONTACT_SEARCH_FIELDS, filters.search.as_str());

    if let Some(company) = &filters.company {
        config = config.equals(Contact::COMPANY, company.as_str());
    }
    if let Some(tag) = &filters.tag {
        config = config.equals(Contact::TAGS, tag.as_str());
    }

    match &filters.sort {
        Some(sort) => config.sort_by(sort.rule()).sort_asc(Contact::NAME),
        None => config.sort_asc(Contact::NAME),
    }
}

/// Filter bar of the task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilters {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Bounds on the predictive score.
    pub score: Bounds,
    pub hide_completed: bool,
    pub sort: Option<ColumnSort>,
}

/// Task list: by priority, highest first, then by due date. Sorting on the
/// priority column goes through the priority rank table.
pub fn task_list(filters: &TaskFilters) -> QueryConfig<Task> {
    let mut config = QueryConfig::new()
        .search(TASK_SEARCH_FIELDS, filters.search.as_str())
        .range(Task::PREDICTIVE_SCORE, filters.score);

    if let Some(status) = filters.status {
        config = config.equals(Task::STATUS, status.label());
    }
    if let Some(priority) = filters.priority {
        config = config.equals(Task::PRIORITY, priority.label());
    }
    if filters.hide_completed {
        config = config.equals(Task::COMPLETED, false);
    }

    let sort = filters
        .sort
        .clone()
        .unwrap_or_else(|| ColumnSort::desc(Task::PRIORITY));
    let rule = if sort.column == Task::PRIORITY {
        sort.rule().ranked(Priority::ranks())
    } else {
        sort.rule()
    };
    config.sort_by(rule).sort_asc(Task::DUE_DATE)
}

// ============================================================================
// Grouped task lists
// ============================================================================

/// Entity a grouped task list buckets by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGrouping {
    Campaign,
    Account,
    Contact,
}

impl TaskGrouping {
    /// The task field holding the bucket key.
    pub fn field(self) -> &'static str {
        match self {
            TaskGrouping::Campaign => Task::CAMPAIGN,
            TaskGrouping::Account => "account.name",
            TaskGrouping::Contact => Task::CONTACT,
        }
    }

    /// Title of the bucket holding tasks with no related entity.
    pub fn empty_label(self) -> &'static str {
        match self {
            TaskGrouping::Campaign => "No campaign",
            TaskGrouping::Account => "No account",
            TaskGrouping::Contact => "No contact",
        }
    }

    /// Members ordered by predictive score, highest first; buckets ordered
    /// by average predictive score, highest first.
    pub fn config(self) -> QueryConfig<Task> {
        QueryConfig::new().sort_desc(Task::PREDICTIVE_SCORE).group(
            GroupRule::by_field(self.field())
                .count(aggregate::TASKS)
                .sum(aggregate::SCORE_TOTAL, Task::PREDICTIVE_SCORE)
                .count_where(
                    aggregate::COMPLETED,
                    FilterRule::equals(Task::COMPLETED, true),
                )
                .count_where(
                    aggregate::HIGH_PRIORITY,
                    FilterRule::equals(Task::PRIORITY, Priority::High.label()),
                )
                .order(BucketOrder::Mean {
                    label: aggregate::SCORE_TOTAL.to_string(),
                    dir: Dir::Desc,
                }),
        )
    }

    /// Display title of a bucket.
    pub fn bucket_title<'b, T>(self, bucket: &'b Bucket<'_, T>) -> &'b str {
        bucket.key.as_str().unwrap_or(self.empty_label())
    }
}

pub fn tasks_by_campaign() -> QueryConfig<Task> {
    TaskGrouping::Campaign.config()
}

pub fn tasks_by_account() -> QueryConfig<Task> {
    TaskGrouping::Account.config()
}

pub fn tasks_by_contact() -> QueryConfig<Task> {
    TaskGrouping::Contact.config()
}
