//! Substitute dataset shown when Notion is not configured or unreachable.
//!
//! Mirrors the shape of the real Ops HQ databases, including the untitled
//! lead and grant rows that the data-quality panel is meant to surface.

use crate::types::{Dataset, Grant, Lead, Priority, Task, TaskStatus};

fn task(
    id: &str,
    title: &str,
    priority: Priority,
    status: TaskStatus,
    due: &str,
    project: &str,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        priority,
        status,
        due: Some(due.to_string()),
        project: Some(project.to_string()),
    }
}

fn lead(id: &str, title: &str, status: &str, value: f64, follow_up: &str) -> Lead {
    Lead {
        id: id.to_string(),
        title: title.to_string(),
        status: status.to_string(),
        value,
        follow_up: Some(follow_up.to_string()),
    }
}

fn grant(id: &str, title: &str, status: &str, amount: f64, deadline: &str) -> Grant {
    Grant {
        id: id.to_string(),
        title: title.to_string(),
        status: status.to_string(),
        amount,
        deadline: Some(deadline.to_string()),
    }
}

/// Build the fixed substitute dataset.
pub fn substitute_dataset() -> Dataset {
    use Priority::{Critical, High, Normal};
    use TaskStatus::{Done, InProgress, NotStarted};

    Dataset {
        tasks: vec![
            task(
                "demo-task-1",
                "Follow up with school principal about pilot program",
                High,
                InProgress,
                "2026-02-20",
                "Ark Academy",
            ),
            task("demo-task-2", "Draft grant application", High, NotStarted, "2026-02-18", "Oilyburger"),
            task("demo-task-3", "Review Woojoosnt proposal", Critical, Done, "2026-02-25", "Woojoosnt"),
            task("demo-task-4", "Update website copy", Normal, NotStarted, "2026-02-28", "Ark Academy"),
            task("demo-task-5", "Send invoice to client", High, NotStarted, "2026-02-15", "Woojoosnt"),
            task("demo-task-6", "Schedule team meeting", Normal, InProgress, "2026-02-27", "Ark Academy"),
            task("demo-task-7", "[ALICE] Clean up duplicate tasks", High, NotStarted, "2026-02-13", "Ops"),
            task("demo-task-8", "[ALICE] Review overdue P1s", High, NotStarted, "2026-02-13", "Ops"),
        ],
        leads: vec![
            lead("demo-lead-1", "Seoul International School", "Contacted", 50_000.0, "2026-02-28"),
            lead("demo-lead-2", "", "New", 0.0, "2026-03-01"),
            lead("demo-lead-3", "Yonsei Academy", "Negotiating", 75_000.0, "2026-02-26"),
            lead("demo-lead-4", "", "New", 0.0, "2026-03-05"),
            lead("demo-lead-5", "Global Edu Partners", "Qualified", 120_000.0, "2026-02-27"),
        ],
        grants: vec![
            grant("demo-grant-1", "K-Startup Grant", "Applied", 50_000_000.0, "2026-03-15"),
            grant("demo-grant-2", "", "Research", 0.0, "2026-04-01"),
            grant("demo-grant-3", "Seoul Innovation Fund", "Drafting", 30_000_000.0, "2026-03-01"),
            grant("demo-grant-4", "", "New", 0.0, "2026-04-15"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_substitute_ids_are_unique() {
        let data = substitute_dataset();
        let mut seen = HashSet::new();
        let ids = data
            .tasks
            .iter()
            .map(|t| &t.id)
            .chain(data.leads.iter().map(|l| &l.id))
            .chain(data.grants.iter().map(|g| &g.id));
        for id in ids {
            assert!(seen.insert(id.clone()), "duplicate id {}", id);
        }
    }

    #[test]
    fn test_substitute_has_data_quality_gaps() {
        let data = substitute_dataset();
        assert_eq!(data.leads.iter().filter(|l| l.is_untitled()).count(), 2);
        assert_eq!(data.grants.iter().filter(|g| g.is_untitled()).count(), 2);
    }

    #[test]
    fn test_substitute_is_stable() {
        assert_eq!(substitute_dataset(), substitute_dataset());
    }
}
