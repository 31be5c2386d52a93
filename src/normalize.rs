//! Record normalizer: raw Notion pages to flat dashboard records.
//!
//! Pure, one page at a time. Malformed or missing sub-fields degrade to the
//! documented defaults instead of failing the whole refresh.

use serde_json::Value;

use crate::notion::properties;
use crate::notion::{GrantProperties, LeadProperties, PropertyNames, TaskProperties};
use crate::source::RawCollections;
use crate::types::{Collection, Dataset, Grant, Lead, Priority, Task, TaskStatus};

pub const DEFAULT_LEAD_STATUS: &str = "New";
pub const DEFAULT_GRANT_STATUS: &str = "Draft";

/// Page id, or a positional id when the page has none.
fn record_id(page: &Value, collection: Collection, index: usize) -> String {
    properties::page_id(page).unwrap_or_else(|| format!("{}-{}", collection, index))
}

/// Monetary fields are non-negative; missing or negative values count as zero.
fn amount(page: &Value, name: &str) -> f64 {
    properties::number(page, name).unwrap_or(0.0).max(0.0)
}

pub fn normalize_task(page: &Value, props: &TaskProperties, index: usize) -> Task {
    Task {
        id: record_id(page, Collection::Tasks, index),
        title: properties::title(page),
        priority: properties::select_name(page, &props.priority)
            .map(|p| Priority::from_label(&p))
            .unwrap_or_default(),
        status: properties::select_name(page, &props.status)
            .map(|s| TaskStatus::from_label(&s))
            .unwrap_or_default(),
        due: properties::date_start(page, &props.due),
        project: properties::text(page, &props.project),
    }
}

pub fn normalize_lead(page: &Value, props: &LeadProperties, index: usize) -> Lead {
    Lead {
        id: record_id(page, Collection::Leads, index),
        title: properties::title(page),
        status: properties::select_name(page, &props.status)
            .unwrap_or_else(|| DEFAULT_LEAD_STATUS.to_string()),
        value: amount(page, &props.value),
        follow_up: properties::date_start(page, &props.follow_up),
    }
}

pub fn normalize_grant(page: &Value, props: &GrantProperties, index: usize) -> Grant {
    Grant {
        id: record_id(page, Collection::Grants, index),
        title: properties::title(page),
        status: properties::select_name(page, &props.status)
            .unwrap_or_else(|| DEFAULT_GRANT_STATUS.to_string()),
        amount: amount(page, &props.amount),
        deadline: properties::date_start(page, &props.deadline),
    }
}

/// Normalize all three collections into one dataset.
pub fn normalize_collections(raw: &RawCollections, props: &PropertyNames) -> Dataset {
    Dataset {
        tasks: raw
            .tasks
            .iter()
            .enumerate()
            .map(|(i, page)| normalize_task(page, &props.tasks, i))
            .collect(),
        leads: raw
            .leads
            .iter()
            .enumerate()
            .map(|(i, page)| normalize_lead(page, &props.leads, i))
            .collect(),
        grants: raw
            .grants
            .iter()
            .enumerate()
            .map(|(i, page)| normalize_grant(page, &props.grants, i))
            .collect(),
    }
}
