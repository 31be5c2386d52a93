//! Text rendering of the dashboard.
//!
//! `render_dashboard` is a pure projection of the latest snapshot: no business
//! logic beyond display formatting (currency scaling, badges, tones).

use std::fmt::Write;

use crate::state::Snapshot;
use crate::types::{Priority, TaskStatus};

const TITLE_WIDTH: usize = 52;
const NAME_WIDTH: usize = 30;

/// Badge color for a category value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Gray,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Red => "\x1b[31m",
            Tone::Orange => "\x1b[38;5;208m",
            Tone::Yellow => "\x1b[33m",
            Tone::Green => "\x1b[32m",
            Tone::Blue => "\x1b[34m",
            Tone::Gray => "\x1b[90m",
        }
    }
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Critical => Tone::Red,
        Priority::High => Tone::Orange,
        Priority::Normal => Tone::Yellow,
    }
}

pub fn task_status_tone(status: TaskStatus) -> Tone {
    match status {
        TaskStatus::Done => Tone::Green,
        TaskStatus::InProgress => Tone::Blue,
        TaskStatus::NotStarted => Tone::Gray,
    }
}

pub fn grant_status_tone(status: &str) -> Tone {
    match status {
        "Applied" => Tone::Green,
        "Drafting" => Tone::Yellow,
        _ => Tone::Gray,
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit ANSI color codes.
    pub color: bool,
    pub task_preview_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: false,
            task_preview_limit: 6,
        }
    }
}

fn paint(text: &str, tone: Tone, options: &RenderOptions) -> String {
    if options.color {
        format!("{}{}\x1b[0m", tone.ansi(), text)
    } else {
        text.to_string()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Shorten to `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// `$50K` style: whole thousands of dollars.
pub fn format_usd_thousands(value: f64) -> String {
    format!("${:.0}K", value / 1_000.0)
}

/// `₩50M` style: whole millions of won.
pub fn format_krw_millions(amount: f64) -> String {
    format!("₩{:.0}M", amount / 1_000_000.0)
}

/// Whole number with thousands separators: `245000.0` -> `245,000`.
pub fn format_grouped(value: f64) -> String {
    let whole = format!("{:.0}", value.max(0.0));
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Render the full dashboard for the latest snapshot.
pub fn render_dashboard(
    snapshot: Option<&Snapshot>,
    countdown: u64,
    options: &RenderOptions,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Notion Ops Dashboard");
    let _ = writeln!(out, "Real-time visibility into tasks, leads, and data quality");

    let Some(snapshot) = snapshot else {
        let _ = writeln!(out);
        let _ = writeln!(out, "Loading... (auto-refresh in {}s)", countdown);
        return out;
    };

    let _ = writeln!(
        out,
        "Last updated: {}  |  Auto-refresh in {}s  |  [r] refresh  [q] quit",
        snapshot.refreshed_at.format("%H:%M:%S"),
        countdown
    );
    let _ = writeln!(out);

    if let Some(warning) = snapshot.data.origin.warning() {
        let _ = writeln!(out, "{}", paint(&format!("! {}", warning), Tone::Red, options));
        let _ = writeln!(out);
    }

    render_alerts(&mut out, snapshot, options);
    render_cards(&mut out, snapshot);
    render_tasks(&mut out, snapshot, options);
    render_data_quality(&mut out, snapshot, options);
    render_leads(&mut out, snapshot, options);
    render_grants(&mut out, snapshot, options);

    let _ = writeln!(out, "Notion Ops Dashboard");
    let _ = writeln!(out, "Data source: {}", snapshot.data.origin.label());

    out
}

fn render_alerts(out: &mut String, snapshot: &Snapshot, options: &RenderOptions) {
    let summary = &snapshot.summary;
    let overdue = summary.overdue_tasks.len();
    let issues = summary.data_quality_issues();

    if overdue > 0 {
        let line = format!(
            "[!] {} Overdue Task{} - including {} P1 priority item{}",
            overdue,
            plural(overdue),
            summary.overdue_high_priority,
            plural(summary.overdue_high_priority)
        );
        let _ = writeln!(out, "{}", paint(&line, Tone::Red, options));
    }
    if issues > 0 {
        let line = format!(
            "[~] {} Data Quality Issue{} - {} untitled leads, {} untitled grants",
            issues,
            plural(issues),
            summary.untitled_leads.len(),
            summary.untitled_grants.len()
        );
        let _ = writeln!(out, "{}", paint(&line, Tone::Orange, options));
    }
    if overdue > 0 || issues > 0 {
        let _ = writeln!(out);
    }
}

fn render_cards(out: &mut String, snapshot: &Snapshot) {
    let summary = &snapshot.summary;
    let dataset = &snapshot.data.dataset;

    let _ = writeln!(
        out,
        "P0 Tasks: {} (critical)  |  P1 Tasks: {} ({} overdue)  |  Active Leads: {} ({} need naming)  |  Grant Opportunities: {} ({} untitled)",
        summary.priority_count(Priority::Critical),
        summary.priority_count(Priority::High),
        summary.overdue_high_priority,
        summary.active_leads,
        summary.untitled_leads.len(),
        dataset.grants.len(),
        summary.untitled_grants.len()
    );
    let _ = writeln!(out);
}

fn render_tasks(out: &mut String, snapshot: &Snapshot, options: &RenderOptions) {
    let tasks = &snapshot.data.dataset.tasks;
    let today = snapshot.refreshed_at.date_naive();

    let _ = writeln!(out, "== Tasks Overview ==");
    for task in tasks.iter().take(options.task_preview_limit) {
        let overdue = task.is_overdue(today);
        let badge = paint(
            &format!("[{}]", task.priority.badge()),
            priority_tone(task.priority),
            options,
        );
        let status = paint(
            &format!("{:<11}", task.status.label()),
            task_status_tone(task.status),
            options,
        );
        let due = format!("Due: {}", task.due.as_deref().unwrap_or("-"));
        let title = format!("{:<width$}", truncate(&task.title, TITLE_WIDTH), width = TITLE_WIDTH);

        let mut line = format!("  {} {} {} {}", badge, title, status, due);
        if overdue {
            line.push_str(&format!("  {}", paint("OVERDUE", Tone::Red, options)));
        }
        let _ = writeln!(out, "{}", line);
    }
    if tasks.len() > options.task_preview_limit {
        let _ = writeln!(
            out,
            "  +{} more tasks",
            tasks.len() - options.task_preview_limit
        );
    }
    let _ = writeln!(out);
}

fn render_data_quality(out: &mut String, snapshot: &Snapshot, options: &RenderOptions) {
    let summary = &snapshot.summary;

    let _ = writeln!(out, "== Data Quality Issues ==");
    if !summary.untitled_leads.is_empty() {
        let _ = writeln!(out, "  Untitled Leads ({})", summary.untitled_leads.len());
        for lead in &summary.untitled_leads {
            let _ = writeln!(
                out,
                "    {}  Status: {}",
                paint("[Untitled Lead Entry]", Tone::Red, options),
                lead.status
            );
        }
    }
    if !summary.untitled_grants.is_empty() {
        let _ = writeln!(out, "  Untitled Grants ({})", summary.untitled_grants.len());
        for grant in &summary.untitled_grants {
            let _ = writeln!(
                out,
                "    {}  Status: {}",
                paint("[Untitled Grant Entry]", Tone::Orange, options),
                grant.status
            );
        }
    }
    if summary.data_quality_issues() == 0 {
        let _ = writeln!(out, "  All data quality checks passed!");
    }
    let _ = writeln!(out);
}

fn render_leads(out: &mut String, snapshot: &Snapshot, options: &RenderOptions) {
    let _ = writeln!(
        out,
        "== Leads Pipeline (total ${}) ==",
        format_grouped(snapshot.summary.pipeline_value)
    );
    for lead in snapshot
        .data
        .dataset
        .leads
        .iter()
        .filter(|l| !l.is_untitled())
    {
        let mut line = format!(
            "  {:<width$} Follow-up: {:<10}  {}",
            truncate(&lead.title, NAME_WIDTH),
            lead.follow_up.as_deref().unwrap_or("-"),
            paint(&format!("[{}]", lead.status), Tone::Green, options),
            width = NAME_WIDTH
        );
        if lead.value > 0.0 {
            line.push_str(&format!("  {}", format_usd_thousands(lead.value)));
        }
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out);
}

fn render_grants(out: &mut String, snapshot: &Snapshot, options: &RenderOptions) {
    let _ = writeln!(
        out,
        "== Grants Tracker (total ₩{}) ==",
        format_grouped(snapshot.summary.grant_total)
    );
    for grant in snapshot
        .data
        .dataset
        .grants
        .iter()
        .filter(|g| !g.is_untitled())
    {
        let mut line = format!(
            "  {:<width$} Deadline: {:<10}  {}",
            truncate(&grant.title, NAME_WIDTH),
            grant.deadline.as_deref().unwrap_or("-"),
            paint(
                &format!("[{}]", grant.status),
                grant_status_tone(&grant.status),
                options
            ),
            width = NAME_WIDTH
        );
        if grant.amount > 0.0 {
            line.push_str(&format!("  {}", format_krw_millions(grant.amount)));
        }
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::source::{DataOrigin, LoadedData};
    use crate::substitute::substitute_dataset;
    use chrono::{Local, TimeZone};

    fn snapshot(origin: DataOrigin) -> Snapshot {
        let refreshed_at = Local.with_ymd_and_hms(2026, 2, 16, 9, 30, 0).unwrap();
        let dataset = substitute_dataset();
        let summary = summarize(&dataset, refreshed_at.date_naive());
        Snapshot {
            generation: 1,
            data: LoadedData { dataset, origin },
            summary,
            refreshed_at,
        }
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_usd_thousands(50_000.0), "$50K");
        assert_eq!(format_usd_thousands(120_000.0), "$120K");
        assert_eq!(format_krw_millions(30_000_000.0), "₩30M");
        assert_eq!(format_grouped(245_000.0), "245,000");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1_000.0), "1,000");
        assert_eq!(format_grouped(0.0), "0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_tones() {
        assert_eq!(priority_tone(Priority::Critical), Tone::Red);
        assert_eq!(task_status_tone(TaskStatus::Done), Tone::Green);
        assert_eq!(grant_status_tone("Drafting"), Tone::Yellow);
        assert_eq!(grant_status_tone("Research"), Tone::Gray);
    }

    #[test]
    fn test_loading_frame_without_snapshot() {
        let frame = render_dashboard(None, 60, &RenderOptions::default());
        assert!(frame.contains("Loading"));
    }

    #[test]
    fn test_render_substitute_snapshot() {
        let snap = snapshot(DataOrigin::Substitute);
        let frame = render_dashboard(Some(&snap), 42, &RenderOptions::default());

        assert!(frame.contains("Last updated: 09:30:00"));
        assert!(frame.contains("Auto-refresh in 42s"));
        assert!(frame.contains("3 Overdue Tasks - including 3 P1 priority items"));
        assert!(frame.contains("4 Data Quality Issues - 2 untitled leads, 2 untitled grants"));
        assert!(frame.contains("+2 more tasks"));
        assert!(frame.contains("$50K"));
        assert!(frame.contains("₩50M"));
        assert!(frame.contains("Leads Pipeline (total $245,000)"));
        assert!(frame.contains("Data source: Notion Ops HQ (Mock Mode)"));
        assert!(!frame.contains('\x1b'));
    }

    #[test]
    fn test_untitled_records_hidden_from_pipeline_lists() {
        let snap = snapshot(DataOrigin::Substitute);
        let frame = render_dashboard(Some(&snap), 10, &RenderOptions::default());
        let pipeline = frame
            .split("== Leads Pipeline")
            .nth(1)
            .and_then(|s| s.split("== Grants Tracker").next())
            .unwrap();
        assert_eq!(pipeline.lines().filter(|l| l.contains("Follow-up:")).count(), 3);
    }

    #[test]
    fn test_fallback_warning_is_shown() {
        let snap = snapshot(DataOrigin::Fallback {
            warning: "Notion API error 502".to_string(),
        });
        let frame = render_dashboard(Some(&snap), 10, &RenderOptions::default());
        assert!(frame.contains("! Notion API error 502"));
        assert!(frame.contains("fetch failed"));
    }

    #[test]
    fn test_color_codes_only_when_enabled() {
        let snap = snapshot(DataOrigin::Live);
        let options = RenderOptions {
            color: true,
            ..Default::default()
        };
        let frame = render_dashboard(Some(&snap), 10, &options);
        assert!(frame.contains("\x1b[31m"));
    }
}
