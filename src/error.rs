//! Crate-level error type for the dashboard binary.
//!
//! Errors are classified by how the dashboard reacts:
//! - Expected: no Notion credential (substitute mode, never shown as an error)
//! - Recoverable: fetch/parse failures (substitute data plus a warning)
//! - Fatal: unreadable configuration or terminal I/O failures

use std::path::PathBuf;

use thiserror::Error;

use crate::notion::client::NotionError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No Notion credential configured")]
    MissingCredential,

    #[error("Data source error: {0}")]
    Source(#[from] NotionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True for conditions that are a supported mode rather than a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, DashboardError::MissingCredential)
    }

    /// True if the dashboard keeps running on substitute data.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingCredential | DashboardError::Source(_)
        )
    }

    /// Log level matching how the dashboard reacts to this error.
    pub fn log_level(&self) -> log::Level {
        if self.is_expected() {
            log::Level::Info
        } else if self.is_recoverable() {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }

    /// Log the error with its recovery suggestion at [`Self::log_level`].
    pub fn log(&self, context: &str) {
        log::log!(
            self.log_level(),
            "{}: {}. {}",
            context,
            self,
            self.recovery_suggestion()
        );
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DashboardError::MissingCredential => {
                "Set NOTION_API_KEY to load live data from Notion."
            }
            DashboardError::Source(NotionError::Api { status: 401, .. }) => {
                "Check that NOTION_API_KEY is a valid integration token."
            }
            DashboardError::Source(NotionError::Api { status: 404, .. }) => {
                "Share the databases with your Notion integration and check the database ids."
            }
            DashboardError::Source(NotionError::MissingDatabase(_)) => {
                "Set NOTION_TASKS_DB, NOTION_LEADS_DB, and NOTION_GRANTS_DB."
            }
            DashboardError::Source(_) => "Check your internet connection and try again.",
            DashboardError::Config(_) | DashboardError::ConfigParse { .. } => {
                "Check your configuration in ~/.ops-dashboard/config.json"
            }
            DashboardError::Io(_) => "Check terminal and file permissions.",
        }
    }
}
