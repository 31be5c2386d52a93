//! Dashboard aggregation: counts, overdue ranking, data-quality gaps, and
//! monetary totals over a normalized [`Dataset`].
//!
//! Everything here is pure and deterministic for a given dataset and `today`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Dataset, Grant, Lead, Priority, Task};

/// Lead status that removes a lead from the active pipeline.
const CLOSED_LEAD_STATUS: &str = "Closed";

/// Summary values rendered by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub tasks_by_priority: BTreeMap<String, usize>,
    pub leads_by_status: BTreeMap<String, usize>,
    pub grants_by_status: BTreeMap<String, usize>,
    /// Overdue tasks, most urgent first.
    pub overdue_tasks: Vec<Task>,
    pub overdue_high_priority: usize,
    pub untitled_leads: Vec<Lead>,
    pub untitled_grants: Vec<Grant>,
    pub active_leads: usize,
    pub pipeline_value: f64,
    pub grant_total: f64,
}

impl DashboardSummary {
    /// Untitled leads plus untitled grants.
    pub fn data_quality_issues(&self) -> usize {
        self.untitled_leads.len() + self.untitled_grants.len()
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.tasks_by_priority
            .get(priority.as_str())
            .copied()
            .unwrap_or(0)
    }
}

pub fn count_by_priority(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.priority.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Count records by a category label.
pub fn count_by_status<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a T>,
    status: impl Fn(&T) -> &str,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(status(record).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Earlier dates rank first. Missing or unparseable dates rank last.
fn compare_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_date(), b.due_date()) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Overdue tasks sorted by priority (critical first), then due date
/// ascending, then title so the order is total.
pub fn overdue_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut overdue: Vec<Task> = tasks
        .iter()
        .filter(|t| t.is_overdue(today))
        .cloned()
        .collect();

    overdue.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| compare_due_date(a, b))
            .then_with(|| a.title.cmp(&b.title))
    });

    overdue
}

pub fn untitled_leads(leads: &[Lead]) -> Vec<Lead> {
    leads.iter().filter(|l| l.is_untitled()).cloned().collect()
}

pub fn untitled_grants(grants: &[Grant]) -> Vec<Grant> {
    grants.iter().filter(|g| g.is_untitled()).cloned().collect()
}

/// Sum of lead values, zero-valued leads included.
pub fn pipeline_value(leads: &[Lead]) -> f64 {
    leads.iter().map(|l| l.value).sum()
}

/// Sum of grant amounts, zero-valued grants included.
pub fn grant_total(grants: &[Grant]) -> f64 {
    grants.iter().map(|g| g.amount).sum()
}

pub fn summarize(dataset: &Dataset, today: NaiveDate) -> DashboardSummary {
    let overdue = overdue_tasks(&dataset.tasks, today);
    let overdue_high_priority = overdue
        .iter()
        .filter(|t| t.priority == Priority::High)
        .count();

    DashboardSummary {
        tasks_by_priority: count_by_priority(&dataset.tasks),
        leads_by_status: count_by_status(&dataset.leads, |l: &Lead| l.status.as_str()),
        grants_by_status: count_by_status(&dataset.grants, |g: &Grant| g.status.as_str()),
        overdue_tasks: overdue,
        overdue_high_priority,
        untitled_leads: untitled_leads(&dataset.leads),
        untitled_grants: untitled_grants(&dataset.grants),
        active_leads: dataset
            .leads
            .iter()
            .filter(|l| l.status != CLOSED_LEAD_STATUS)
            .count(),
        pipeline_value: pipeline_value(&dataset.leads),
        grant_total: grant_total(&dataset.grants),
    }
}
