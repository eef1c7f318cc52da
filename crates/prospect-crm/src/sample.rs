//! Demo data set, the same shape the dashboard pages render.
//!
//! Dates are fixed millisecond timestamps in March 2024.

use prospect_query::Timestamp;

use crate::records::{AccountRef, Contact, Lead, LeadStatus, Priority, Task, TaskStatus};

const DAY_MS: i64 = 86_400_000;
// 2024-03-01T00:00:00Z
const MARCH_1: i64 = 1_709_251_200_000;

fn day(n: i64) -> Option<Timestamp> {
    Some(Timestamp::from_millis(MARCH_1 + n * DAY_MS))
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn acme() -> AccountRef {
    AccountRef::new("acc-1", "Acme Corp")
}

fn globex() -> AccountRef {
    AccountRef::new("acc-2", "Globex")
}

fn initech() -> AccountRef {
    AccountRef::new("acc-3", "Initech")
}

#[allow(clippy::too_many_arguments)]
fn lead(
    id: u32,
    name: &str,
    company: &str,
    email: &str,
    status: LeadStatus,
    score: u8,
    value: f64,
    lead_tags: &[&str],
) -> Lead {
    Lead {
        id,
        name: name.to_string(),
        company: company.to_string(),
        email: email.to_string(),
        title: None,
        status,
        score,
        value,
        source: None,
        tags: tags(lead_tags),
        owner: None,
    }
}

pub fn leads() -> Vec<Lead> {
    vec![
        Lead {
            title: Some("VP Sales".into()),
            source: Some("webinar".into()),
            owner: Some("Dana".into()),
            ..lead(
                1,
                "Sarah Chen",
                "Acme Corp",
                "sarah.chen@acme.example",
                LeadStatus::Qualified,
                92,
                120_000.0,
                &["enterprise", "hot"],
            )
        },
        lead(
            2,
            "Marcus Webb",
            "Globex",
            "m.webb@globex.example",
            LeadStatus::New,
            58,
            15_000.0,
            &["smb"],
        ),
        Lead {
            source: Some("referral".into()),
            ..lead(
                3,
                "Émilie Laurent",
                "Initech",
                "emilie@initech.example",
                LeadStatus::Proposal,
                77,
                64_000.0,
                &["mid-market"],
            )
        },
        lead(
            4,
            "David Okafor",
            "Hooli",
            "david.okafor@hooli.example",
            LeadStatus::Contacted,
            77,
            30_000.0,
            &[],
        ),
        lead(
            5,
            "anna Ito",
            "Acme Corp",
            "anna.ito@acme.example",
            LeadStatus::Lost,
            35,
            8_000.0,
            &["smb", "churn-risk"],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: u32,
    title: &str,
    priority: Priority,
    status: TaskStatus,
    score: Option<u8>,
    account: Option<AccountRef>,
    contact: Option<&str>,
    campaign: Option<&str>,
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        priority,
        status,
        due_date: None,
        predictive_score: score,
        account,
        contact: contact.map(String::from),
        campaign: campaign.map(String::from),
        completed: status == TaskStatus::Completed,
    }
}

pub fn tasks() -> Vec<Task> {
    vec![
        Task {
            description: Some("Walk through pricing for the enterprise tier".into()),
            due_date: day(4),
            ..task(
                1,
                "Send proposal",
                Priority::High,
                TaskStatus::InProgress,
                Some(88),
                Some(acme()),
                Some("Sarah Chen"),
                Some("Q2 Enterprise Push"),
            )
        },
        Task {
            due_date: day(2),
            ..task(
                2,
                "Follow-up call",
                Priority::Medium,
                TaskStatus::Todo,
                Some(64),
                Some(globex()),
                Some("Marcus Webb"),
                Some("Spring Webinar"),
            )
        },
        task(
            3,
            "Prepare demo environment",
            Priority::High,
            TaskStatus::Completed,
            Some(92),
            Some(acme()),
            None,
            Some("Q2 Enterprise Push"),
        ),
        Task {
            description: Some("Renewal is due next quarter".into()),
            due_date: day(10),
            ..task(
                4,
                "Schedule renewal review",
                Priority::Low,
                TaskStatus::Todo,
                Some(41),
                Some(initech()),
                Some("Émilie Laurent"),
                None,
            )
        },
        task(
            5,
            "Update CRM notes",
            Priority::Low,
            TaskStatus::Todo,
            None,
            None,
            None,
            None,
        ),
        Task {
            due_date: day(1),
            ..task(
                6,
                "Send case study",
                Priority::Medium,
                TaskStatus::Todo,
                Some(73),
                Some(globex()),
                Some("Marcus Webb"),
                Some("Spring Webinar"),
            )
        },
    ]
}

pub fn contacts() -> Vec<Contact> {
    vec![
        Contact {
            id: 1,
            name: "Sarah Chen".into(),
            email: "sarah.chen@acme.example".into(),
            title: Some("VP Sales".into()),
            company: "Acme Corp".into(),
            phone: Some("+1 555 0100".into()),
            account: Some(acme()),
            last_contacted: day(3),
            tags: tags(&["champion"]),
        },
        Contact {
            id: 2,
            name: "Marcus Webb".into(),
            email: "m.webb@globex.example".into(),
            title: Some("Head of Ops".into()),
            company: "Globex".into(),
            phone: None,
            account: Some(globex()),
            last_contacted: day(1),
            tags: Vec::new(),
        },
        Contact {
            id: 3,
            name: "Émilie Laurent".into(),
            email: "emilie@initech.example".into(),
            title: None,
            company: "Initech".into(),
            phone: None,
            account: Some(initech()),
            last_contacted: None,
            tags: tags(&["decision-maker", "champion"]),
        },
    ]
}
