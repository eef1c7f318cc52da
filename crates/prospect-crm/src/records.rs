//! Record types shown on the dashboard.

use prospect_macros::Record;
use prospect_query::{RankMap, RecordEnum, Timestamp};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Rank table ordering `high` above `medium` above `low`.
    pub fn ranks() -> RankMap {
        RankMap::priority()
    }
}

impl RecordEnum for Priority {
    fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl RecordEnum for TaskStatus {
    fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Proposal,
        LeadStatus::Negotiation,
        LeadStatus::Won,
        LeadStatus::Lost,
    ];
}

impl RecordEnum for LeadStatus {
    fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }
}

/// Reference to the account a task or contact belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
pub struct AccountRef {
    #[record(Text)]
    pub id: String,
    #[record(Text)]
    pub name: String,
}

impl AccountRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        AccountRef {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Lead {
    #[record(Number)]
    pub id: u32,
    #[record(Text)]
    pub name: String,
    #[record(Text)]
    pub company: String,
    #[record(Text)]
    pub email: String,
    #[record(Text)]
    #[serde(default)]
    pub title: Option<String>,
    #[record(Enum)]
    pub status: LeadStatus,
    /// Lead score, 0 to 100.
    #[record(Number)]
    pub score: u8,
    /// Estimated deal value.
    #[record(Number)]
    pub value: f64,
    #[record(Text)]
    #[serde(default)]
    pub source: Option<String>,
    #[record(List)]
    #[serde(default)]
    pub tags: Vec<String>,
    #[record(Text)]
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Task {
    #[record(Number)]
    pub id: u32,
    #[record(Text)]
    pub title: String,
    #[record(Text)]
    #[serde(default)]
    pub description: Option<String>,
    #[record(Enum)]
    pub priority: Priority,
    #[record(Enum)]
    pub status: TaskStatus,
    #[record(Timestamp)]
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    /// Model score for how likely the task moves the deal, 0 to 100.
    #[record(Number)]
    #[serde(default)]
    pub predictive_score: Option<u8>,
    #[record(nested)]
    #[serde(default)]
    pub account: Option<AccountRef>,
    #[record(Text)]
    #[serde(default)]
    pub contact: Option<String>,
    #[record(Text)]
    #[serde(default)]
    pub campaign: Option<String>,
    #[record(Bool)]
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Contact {
    #[record(Number)]
    pub id: u32,
    #[record(Text)]
    pub name: String,
    #[record(Text)]
    pub email: String,
    #[record(Text)]
    #[serde(default)]
    pub title: Option<String>,
    #[record(Text)]
    pub company: String,
    #[record(skip)]
    #[serde(default)]
    pub phone: Option<String>,
    #[record(nested)]
    #[serde(default)]
    pub account: Option<AccountRef>,
    #[record(Timestamp)]
    #[serde(default)]
    pub last_contacted: Option<Timestamp>,
    #[record(List)]
    #[serde(default)]
    pub tags: Vec<String>,
}
