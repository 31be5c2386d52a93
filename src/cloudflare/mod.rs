//! Cloudflare Pages helpers for publishing the static dashboard build.
//!
//! Modules:
//! - client: control-plane API calls (accounts, projects, deployments, files)
//! - manifest: local build collection and content digests
//!
//! Sequential request chains only: no retry, no backoff, no parallel uploads.

pub mod client;
pub mod manifest;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Deploy helper configuration stored in ~/.ops-dashboard/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudflareConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Account to deploy into. When absent the first listed account is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_production_branch")]
    pub production_branch: String,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

fn default_project_name() -> String {
    "notion-ops-dashboard".to_string()
}

fn default_production_branch() -> String {
    "main".to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("./dist")
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            account_id: None,
            project_name: default_project_name(),
            production_branch: default_production_branch(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl CloudflareConfig {
    pub fn token(&self) -> Result<&str, CloudflareError> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CloudflareError::MissingToken)
    }
}

// ============================================================================
// API envelope
// ============================================================================

/// One entry of the `errors` / `messages` arrays in an API response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Standard Cloudflare v4 response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap a successful envelope into its result.
    pub fn into_result(self, what: &'static str) -> Result<T, CloudflareError> {
        if !self.success {
            return Err(CloudflareError::Api {
                errors: self.errors,
            });
        }
        self.result.ok_or(CloudflareError::EmptyResult(what))
    }
}

fn describe(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "unknown error".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CloudflareError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {}", describe(.errors))]
    Api { errors: Vec<ApiMessage> },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk build directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Build directory not found: {}", .0.display())]
    MissingBuildDir(PathBuf),
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("CLOUDFLARE_API_TOKEN is not set")]
    MissingToken,
    #[error("No accounts found")]
    NoAccounts,
    #[error("Response had no {0}")]
    EmptyResult(&'static str),
}
