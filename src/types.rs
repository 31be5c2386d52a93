use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cloudflare::CloudflareConfig;
use crate::notion::NotionConfig;

// =============================================================================
// Configuration
// =============================================================================

/// Application configuration stored in ~/.ops-dashboard/config.json.
///
/// Every section is optional. A missing file is equivalent to `{}`, which
/// runs the dashboard against the substitute dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
}

/// Presentation settings for the terminal dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Seconds between automatic refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// How many tasks the overview section lists before collapsing.
    #[serde(default = "default_task_preview_limit")]
    pub task_preview_limit: usize,
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_task_preview_limit() -> usize {
    6
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            task_preview_limit: default_task_preview_limit(),
        }
    }
}

// =============================================================================
// Record collections
// =============================================================================

/// One of the three external record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Tasks,
    Leads,
    Grants,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Tasks, Collection::Leads, Collection::Grants];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Leads => "leads",
            Collection::Grants => "grants",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Task urgency. Declaration order is ascending, so `Critical` sorts highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    /// Map a Notion select label onto a priority. Unknown labels fall back to
    /// the lowest urgency.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "p0" | "critical" | "urgent" => Priority::Critical,
            "p1" | "high" => Priority::High,
            _ => Priority::Normal,
        }
    }

    /// Stable key used in count maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
        }
    }

    /// Short badge text shown on the dashboard.
    pub fn badge(&self) -> &'static str {
        match self {
            Priority::Critical => "P0",
            Priority::High => "P1",
            Priority::Normal => "P2",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "done" | "complete" | "completed" => TaskStatus::Done,
            "in progress" | "in-progress" | "doing" | "started" => TaskStatus::InProgress,
            _ => TaskStatus::NotStarted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Raw date string as delivered by the source (`YYYY-MM-DD` or RFC 3339).
    pub due: Option<String>,
    pub project: Option<String>,
}

impl Task {
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_deref().and_then(parse_date)
    }

    /// True iff the due date is strictly before `today` and the task is not done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.status == TaskStatus::Done {
            return false;
        }
        self.due_date().is_some_and(|due| due < today)
    }
}

// =============================================================================
// Leads & grants
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub title: String,
    pub status: String,
    pub value: f64,
    pub follow_up: Option<String>,
}

impl Lead {
    pub fn is_untitled(&self) -> bool {
        self.title.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub id: String,
    pub title: String,
    pub status: String,
    pub amount: f64,
    pub deadline: Option<String>,
}

impl Grant {
    pub fn is_untitled(&self) -> bool {
        self.title.is_empty()
    }
}

/// One complete, immutable set of normalized records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub tasks: Vec<Task>,
    pub leads: Vec<Lead>,
    pub grants: Vec<Grant>,
}

/// Parse the calendar date out of a Notion date string.
///
/// Notion returns either `2026-02-20` or a full timestamp such as
/// `2026-02-20T10:00:00.000-05:00`; only the leading date is meaningful here.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
