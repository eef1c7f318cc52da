//! View presets evaluated against the demo data set.

use std::fmt::Write;

use insta::assert_snapshot;
use prospect_crm::{
    aggregate, contact_table, lead_table, sample, task_list, tasks_by_account, tasks_by_campaign,
    tasks_by_contact, ColumnSort, ContactFilters, LeadFilters, LeadStatus, Priority, Task,
    TaskFilters, TaskGrouping,
};
use prospect_query::{run_query, Bounds, QueryConfig, SavedView};

fn summarize(grouping: TaskGrouping, config: &QueryConfig<Task>) -> String {
    let tasks = sample::tasks();
    let result = run_query(&tasks, config).unwrap();
    let mut out = String::new();
    for bucket in result.as_grouped().unwrap() {
        let ids: Vec<String> = bucket.members.iter().map(|t| t.id.to_string()).collect();
        let get = |label: &str| bucket.aggregates.get(label).unwrap_or_default();
        writeln!(
            out,
            "{}: tasks={} score_total={} completed={} high_priority={} [{}]",
            grouping.bucket_title(bucket),
            get(aggregate::TASKS),
            get(aggregate::SCORE_TOTAL),
            get(aggregate::COMPLETED),
            get(aggregate::HIGH_PRIORITY),
            ids.join(", ")
        )
        .unwrap();
    }
    out
}

// =============================================================================
// Lead table
// =============================================================================

#[test]
fn lead_search_spans_name_company_and_email() {
    let leads = sample::leads();
    let filters = LeadFilters {
        search: "ACME".into(),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["1", "5"]);
}

#[test]
fn lead_search_includes_job_title() {
    let leads = sample::leads();
    let filters = LeadFilters {
        search: "vp sales".into(),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["1"]);
}

#[test]
fn lead_status_dropdown() {
    let leads = sample::leads();
    let filters = LeadFilters {
        status: Some(LeadStatus::Qualified),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["1"]);

    let filters = LeadFilters {
        status: Some(LeadStatus::Won),
        ..LeadFilters::default()
    };
    assert!(run_query(&leads, &lead_table(&filters)).unwrap().is_empty());
}

#[test]
fn lead_score_range_with_name_tie_break() {
    let leads = sample::leads();
    let filters = LeadFilters {
        score: Bounds::new(70, 100),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["1", "4", "3"]);
}

#[test]
fn lead_name_column_sort() {
    let leads = sample::leads();
    let mut filters = LeadFilters {
        sort: Some(ColumnSort::asc("name")),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["5", "4", "3", "2", "1"]);

    filters.sort = filters.sort.map(|s| s.click("name"));
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn lead_tag_filter_matches_any_tag() {
    let leads = sample::leads();
    let filters = LeadFilters {
        tag: Some("smb".into()),
        ..LeadFilters::default()
    };
    let result = run_query(&leads, &lead_table(&filters)).unwrap();
    assert_eq!(result.ids(), vec!["2", "5"]);
}

// =============================================================================
// Contact table
// =============================================================================

#[test]
fn contacts_sorted_by_name() {
    let contacts = sample::contacts();
    let result = run_query(&contacts, &contact_table(&ContactFilters::default())).unwrap();
    assert_eq!(result.ids(), vec!["3", "2", "1"]);
}

#[test]
fn contact_filters() {
    let contacts = sample::contacts();

    let filters = ContactFilters {
        search: "acme".into(),
        ..ContactFilters::default()
    };
    assert_eq!(
        run_query(&contacts, &contact_table(&filters)).unwrap().ids(),
        vec!["1"]
    );

    let filters = ContactFilters {
        company: Some("Globex".into()),
        ..ContactFilters::default()
    };
    assert_eq!(
        run_query(&contacts, &contact_table(&filters)).unwrap().ids(),
        vec!["2"]
    );

    let filters = ContactFilters {
        tag: Some("champion".into()),
        ..ContactFilters::default()
    };
    assert_eq!(
        run_query(&contacts, &contact_table(&filters)).unwrap().ids(),
        vec!["3", "1"]
    );
}

// =============================================================================
// Task list
// =============================================================================

#[test]
fn tasks_default_to_priority_then_due_date() {
    let tasks = sample::tasks();
    let result = run_query(&tasks, &task_list(&TaskFilters::default())).unwrap();
    assert_eq!(result.ids(), vec!["1", "3", "6", "2", "4", "5"]);
}

#[test]
fn task_filters() {
    let tasks = sample::tasks();

    let filters = TaskFilters {
        hide_completed: true,
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["1", "6", "2", "4", "5"]
    );

    let filters = TaskFilters {
        search: "send".into(),
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["1", "6"]
    );

    let filters = TaskFilters {
        search: "renewal".into(),
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["4"]
    );

    let filters = TaskFilters {
        priority: Some(Priority::Medium),
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["6", "2"]
    );
}

#[test]
fn task_score_range_excludes_unscored() {
    let tasks = sample::tasks();
    let filters = TaskFilters {
        score: Bounds::at_most(70),
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["2", "4"]
    );
}

#[test]
fn priority_column_uses_rank_table() {
    let tasks = sample::tasks();
    let filters = TaskFilters {
        sort: Some(ColumnSort::asc("priority")),
        ..TaskFilters::default()
    };
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["4", "5", "6", "2", "1", "3"]
    );
}

// =============================================================================
// Grouped task lists
// =============================================================================

#[test]
fn tasks_grouped_by_campaign() {
    let summary = summarize(TaskGrouping::Campaign, &tasks_by_campaign());
    assert_snapshot!(summary, @r"
    Q2 Enterprise Push: tasks=2 score_total=180 completed=1 high_priority=2 [3, 1]
    Spring Webinar: tasks=2 score_total=137 completed=0 high_priority=0 [6, 2]
    No campaign: tasks=2 score_total=41 completed=0 high_priority=0 [4, 5]
    ");
}

#[test]
fn tasks_grouped_by_account() {
    let summary = summarize(TaskGrouping::Account, &tasks_by_account());
    assert_snapshot!(summary, @r"
    Acme Corp: tasks=2 score_total=180 completed=1 high_priority=2 [3, 1]
    Globex: tasks=2 score_total=137 completed=0 high_priority=0 [6, 2]
    Initech: tasks=1 score_total=41 completed=0 high_priority=0 [4]
    No account: tasks=1 score_total=0 completed=0 high_priority=0 [5]
    ");
}

#[test]
fn tasks_grouped_by_contact() {
    let summary = summarize(TaskGrouping::Contact, &tasks_by_contact());
    assert_snapshot!(summary, @r"
    Sarah Chen: tasks=1 score_total=88 completed=0 high_priority=1 [1]
    Marcus Webb: tasks=2 score_total=137 completed=0 high_priority=0 [6, 2]
    Émilie Laurent: tasks=1 score_total=41 completed=0 high_priority=0 [4]
    No contact: tasks=2 score_total=92 completed=1 high_priority=1 [3, 5]
    ");
}

// =============================================================================
// Saved views
// =============================================================================

#[test]
fn preset_survives_yaml_round_trip() {
    let leads = sample::leads();
    let filters = LeadFilters {
        search: "a".into(),
        score: Bounds::at_least(50),
        sort: Some(ColumnSort::asc("company")),
        ..LeadFilters::default()
    };
    let config = lead_table(&filters);
    let expected = run_query(&leads, &config).unwrap().ids();

    let yaml = SavedView::from_config(&config).unwrap().to_yaml().unwrap();
    let reloaded = SavedView::from_yaml(&yaml).unwrap().into_config();
    assert_eq!(run_query(&leads, &reloaded).unwrap().ids(), expected);
}

#[test]
fn grouped_preset_survives_json_round_trip() {
    let tasks = sample::tasks();
    let config = tasks_by_account();
    let json = SavedView::from_config(&config).unwrap().to_json().unwrap();
    let reloaded = SavedView::from_json(&json).unwrap().into_config::<Task>();

    assert_eq!(
        run_query(&tasks, &reloaded).unwrap().ids(),
        run_query(&tasks, &config).unwrap().ids()
    );
}

#[test]
fn filters_load_from_yaml() {
    let filters: TaskFilters = serde_yaml::from_str(
        "
priority: high
hide_completed: true
sort:
  column: predictive_score
  dir: desc
",
    )
    .unwrap();
    let tasks = sample::tasks();
    assert_eq!(
        run_query(&tasks, &task_list(&filters)).unwrap().ids(),
        vec!["1"]
    );
}
