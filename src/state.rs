use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::aggregate::DashboardSummary;
use crate::error::DashboardError;
use crate::source::LoadedData;
use crate::types::Config;

/// One refresh cycle's complete result. Never mutated after publishing.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub data: LoadedData,
    pub summary: DashboardSummary,
    pub refreshed_at: DateTime<Local>,
}

/// Shared state for one dashboard view.
pub struct AppState {
    pub config: Config,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
    countdown: AtomicU64,
    /// Wakes the refresh loop for a manual refresh.
    pub refresh_wake: Notify,
    /// Tells the countdown ticker to restart its period.
    pub countdown_reset: Notify,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let period = config.dashboard.refresh_interval_secs.max(1);
        Self {
            config,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
            countdown: AtomicU64::new(period),
            refresh_wake: Notify::new(),
            countdown_reset: Notify::new(),
        }
    }

    pub fn refresh_period_secs(&self) -> u64 {
        self.config.dashboard.refresh_interval_secs.max(1)
    }

    /// Allocate the generation number for a new refresh cycle.
    pub fn begin_refresh(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    /// Swap in a new snapshot unless a newer cycle already published.
    ///
    /// Returns false when the snapshot was discarded as stale.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let mut guard = self.snapshot.write();
        if let Some(current) = guard.as_ref() {
            if current.generation > snapshot.generation {
                log::info!(
                    "Dashboard: discarding stale refresh {} (showing {})",
                    snapshot.generation,
                    current.generation
                );
                return false;
            }
        }
        *guard = Some(Arc::new(snapshot));
        true
    }

    pub fn countdown(&self) -> u64 {
        self.countdown.load(Ordering::SeqCst)
    }

    pub fn reset_countdown(&self) {
        self.countdown
            .store(self.refresh_period_secs(), Ordering::SeqCst);
    }

    /// Advance the countdown by one second, wrapping back to the full period.
    pub fn tick_countdown(&self) -> u64 {
        let period = self.refresh_period_secs();
        let next = match self.countdown.load(Ordering::SeqCst) {
            0 | 1 => period,
            n => n - 1,
        };
        self.countdown.store(next, Ordering::SeqCst);
        next
    }

    /// Ask for an immediate refresh and restart both timers.
    pub fn request_refresh(&self) {
        self.reset_countdown();
        self.refresh_wake.notify_one();
        self.countdown_reset.notify_one();
    }
}

/// Get the canonical config file path (~/.ops-dashboard/config.json)
pub fn config_path() -> Result<PathBuf, DashboardError> {
    let home = dirs::home_dir()
        .ok_or_else(|| DashboardError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".ops-dashboard").join("config.json"))
}

/// Read a config file. A missing file yields the defaults.
pub fn read_config_file(path: &Path) -> Result<Config, DashboardError> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| DashboardError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply environment overrides. Environment values win over the file.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(key) = var("NOTION_API_KEY") {
        config.notion.api_key = Some(key);
    }
    if let Some(id) = var("NOTION_TASKS_DB") {
        config.notion.databases.tasks = Some(id);
    }
    if let Some(id) = var("NOTION_LEADS_DB") {
        config.notion.databases.leads = Some(id);
    }
    if let Some(id) = var("NOTION_GRANTS_DB") {
        config.notion.databases.grants = Some(id);
    }
    if let Some(secs) = var("OPS_DASHBOARD_REFRESH_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) if secs > 0 => config.dashboard.refresh_interval_secs = secs,
            _ => log::warn!("Ignoring invalid OPS_DASHBOARD_REFRESH_SECS={}", secs),
        }
    }
    if let Some(token) = var("CLOUDFLARE_API_TOKEN") {
        config.cloudflare.api_token = Some(token);
    }
    if let Some(account) = var("CLOUDFLARE_ACCOUNT_ID") {
        config.cloudflare.account_id = Some(account);
    }
    if let Some(project) = var("CF_PAGES_PROJECT") {
        config.cloudflare.project_name = project;
    }
    if let Some(dir) = var("OPS_DASHBOARD_DIST_DIR") {
        config.cloudflare.dist_dir = PathBuf::from(dir);
    }
}

/// Load configuration from ~/.ops-dashboard/config.json plus the process environment.
pub fn load_config() -> Result<Config, DashboardError> {
    let mut config = read_config_file(&config_path()?)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DataOrigin;
    use crate::types::Dataset;
    use std::collections::HashMap;

    fn snapshot(generation: u64) -> Snapshot {
        Snapshot {
            generation,
            data: LoadedData {
                dataset: Dataset::default(),
                origin: DataOrigin::Substitute,
            },
            summary: DashboardSummary::default(),
            refreshed_at: Local::now(),
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let state = AppState::new(Config::default());
        assert!(state.snapshot().is_none());
        assert!(state.publish(snapshot(1)));
        assert!(state.publish(snapshot(2)));
        assert_eq!(state.snapshot().unwrap().generation, 2);
    }

    #[test]
    fn test_publish_rejects_stale_generation() {
        let state = AppState::new(Config::default());
        assert!(state.publish(snapshot(3)));
        assert!(!state.publish(snapshot(2)));
        assert_eq!(state.snapshot().unwrap().generation, 3);
    }

    #[test]
    fn test_begin_refresh_is_monotonic() {
        let state = AppState::new(Config::default());
        let a = state.begin_refresh();
        let b = state.begin_refresh();
        assert!(b > a);
    }

    #[test]
    fn test_countdown_wraps_to_period() {
        let mut config = Config::default();
        config.dashboard.refresh_interval_secs = 3;
        let state = AppState::new(config);
        assert_eq!(state.countdown(), 3);
        assert_eq!(state.tick_countdown(), 2);
        assert_eq!(state.tick_countdown(), 1);
        assert_eq!(state.tick_countdown(), 3);
    }

    #[test]
    fn test_request_refresh_resets_countdown() {
        let state = AppState::new(Config::default());
        state.tick_countdown();
        state.tick_countdown();
        state.request_refresh();
        assert_eq!(state.countdown(), 60);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = Config::default();
        config.notion.api_key = Some("from-file".to_string());
        apply_env_overrides(
            &mut config,
            env(&[
                ("NOTION_API_KEY", "from-env"),
                ("NOTION_TASKS_DB", "db-tasks"),
                ("OPS_DASHBOARD_REFRESH_SECS", "30"),
                ("CF_PAGES_PROJECT", "ops-preview"),
            ]),
        );
        assert_eq!(config.notion.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.notion.databases.tasks.as_deref(), Some("db-tasks"));
        assert_eq!(config.dashboard.refresh_interval_secs, 30);
        assert_eq!(config.cloudflare.project_name, "ops-preview");
    }

    #[test]
    fn test_env_ignores_blank_and_invalid_values() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("NOTION_API_KEY", "  "), ("OPS_DASHBOARD_REFRESH_SECS", "0")]),
        );
        assert!(config.notion.api_key.is_none());
        assert_eq!(config.dashboard.refresh_interval_secs, 60);
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = read_config_file(&dir.path().join("config.json")).unwrap();
        assert!(config.notion.api_key.is_none());
    }

    #[test]
    fn test_invalid_config_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigParse { .. }));
    }

    #[test]
    fn test_config_file_round_trip_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "notion": { "databases": { "leads": "db-leads" } }, "dashboard": { "refreshIntervalSecs": 120 } }"#,
        )
        .unwrap();
        let config = read_config_file(&path).unwrap();
        assert_eq!(config.notion.databases.leads.as_deref(), Some("db-leads"));
        assert_eq!(config.dashboard.refresh_interval_secs, 120);
    }
}
