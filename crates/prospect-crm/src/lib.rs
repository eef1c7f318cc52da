//! CRM dashboard records and the views the dashboard renders from them.
//!
//! The record types ([`Lead`], [`Task`], [`Contact`]) derive
//! [`prospect_query::Record`], so every table and grouped list is a
//! [`QueryConfig`](prospect_query::QueryConfig) evaluated with
//! [`run_query`](prospect_query::run_query):
//!
//! ```rust
//! use prospect_crm::{lead_table, sample, LeadFilters, LeadStatus};
//! use prospect_query::run_query;
//!
//! let leads = sample::leads();
//! let filters = LeadFilters {
//!     search: "acme".into(),
//!     status: Some(LeadStatus::Qualified),
//!     ..LeadFilters::default()
//! };
//!
//! let result = run_query(&leads, &lead_table(&filters)).unwrap();
//! assert_eq!(result.ids(), vec!["1"]);
//! ```
//!
//! Grouped task lists bucket by campaign, account or contact:
//!
//! ```rust
//! use prospect_crm::{sample, TaskGrouping};
//! use prospect_query::run_query;
//!
//! let tasks = sample::tasks();
//! let result = run_query(&tasks, &TaskGrouping::Campaign.config()).unwrap();
//! let buckets = result.as_grouped().unwrap();
//!
//! assert_eq!(TaskGrouping::Campaign.bucket_title(&buckets[0]), "Q2 Enterprise Push");
//! assert_eq!(TaskGrouping::Campaign.bucket_title(&buckets[2]), "No campaign");
//! ```

mod records;
pub mod sample;
mod views;

pub use records::{AccountRef, Contact, Lead, LeadStatus, Priority, Task, TaskStatus};
pub use views::{
    aggregate, contact_table, lead_table, task_list, tasks_by_account, tasks_by_campaign,
    tasks_by_contact, ColumnSort, ContactFilters, LeadFilters, TaskFilters, TaskGrouping,
    CONTACT_SEARCH_FIELDS, LEAD_SEARCH_FIELDS, TASK_SEARCH_FIELDS,
};
