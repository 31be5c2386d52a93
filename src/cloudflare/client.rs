//! REST client for the Cloudflare Pages control plane.
//!
//! Uses reqwest with Bearer token auth against
//! `https://api.cloudflare.com/client/v4`. Every response is the standard
//! `{ success, errors, result }` envelope.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::manifest::ManifestEntry;
use super::{ApiEnvelope, CloudflareError};

const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub subdomain: Option<String>,
}

impl Project {
    /// Public URL pattern deployments of this project are served under.
    pub fn url_pattern(&self) -> Option<String> {
        self.subdomain.as_ref().map(|s| format!("https://{}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
    production_branch: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateDeploymentRequest<'a> {
    branch: &'a str,
    manifest: &'a BTreeMap<String, ManifestEntry>,
}

pub struct CloudflareClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.to_string(),
            base_url: CLOUDFLARE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build an API URL from path segments. Each segment is percent-encoded,
    /// so a relative file path must be passed as its individual components.
    pub fn endpoint<S: AsRef<str>>(
        &self,
        segments: impl IntoIterator<Item = S>,
    ) -> Result<Url, CloudflareError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| CloudflareError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, CloudflareError> {
        let status = resp.status();
        let text = resp.text().await?;
        log::debug!("Cloudflare: response {} ({} bytes)", status, text.len());
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<ApiEnvelope<T>, CloudflareError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        Self::read_envelope(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<ApiEnvelope<T>, CloudflareError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::read_envelope(resp).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, CloudflareError> {
        let url = self.endpoint(["accounts"])?;
        self.get(url).await?.into_result("accounts")
    }

    /// First account visible to the token.
    pub async fn first_account(&self) -> Result<Account, CloudflareError> {
        self.list_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(CloudflareError::NoAccounts)
    }

    /// Look up a project. `Ok(None)` when the API reports no such project.
    pub async fn get_project(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<Option<Project>, CloudflareError> {
        let url = self.endpoint(["accounts", account_id, "pages", "projects", name])?;
        let envelope: ApiEnvelope<Project> = self.get(url).await?;
        if !envelope.success {
            log::debug!("Cloudflare: project lookup unsuccessful: {:?}", envelope.errors);
            return Ok(None);
        }
        envelope.into_result("project").map(Some)
    }

    pub async fn create_project(
        &self,
        account_id: &str,
        name: &str,
        production_branch: &str,
    ) -> Result<Project, CloudflareError> {
        let url = self.endpoint(["accounts", account_id, "pages", "projects"])?;
        let body = CreateProjectRequest {
            name,
            production_branch,
        };
        self.post_json(url, &body).await?.into_result("project")
    }

    pub async fn get_or_create_project(
        &self,
        account_id: &str,
        name: &str,
        production_branch: &str,
    ) -> Result<Project, CloudflareError> {
        if let Some(project) = self.get_project(account_id, name).await? {
            return Ok(project);
        }
        log::info!("Cloudflare: project {} not found, creating it", name);
        self.create_project(account_id, name, production_branch)
            .await
    }

    pub async fn create_deployment(
        &self,
        account_id: &str,
        project: &str,
        branch: &str,
        manifest: &BTreeMap<String, ManifestEntry>,
    ) -> Result<Deployment, CloudflareError> {
        let url = self.endpoint([
            "accounts",
            account_id,
            "pages",
            "projects",
            project,
            "deployments",
        ])?;
        let body = CreateDeploymentRequest { branch, manifest };
        self.post_json(url, &body).await?.into_result("deployment")
    }

    /// Upload one file's bytes into a deployment.
    pub async fn upload_file(
        &self,
        account_id: &str,
        project: &str,
        deployment_id: &str,
        relative_path: &str,
        content: Vec<u8>,
    ) -> Result<(), CloudflareError> {
        let url = self.endpoint(file_segments(
            account_id,
            project,
            deployment_id,
            relative_path,
        ))?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/octet-stream")
            .body(content)
            .send()
            .await?;

        let envelope: ApiEnvelope<serde_json::Value> = Self::read_envelope(resp).await?;
        if !envelope.success {
            return Err(CloudflareError::Api {
                errors: envelope.errors,
            });
        }
        Ok(())
    }
}

fn file_segments<'a>(
    account_id: &'a str,
    project: &'a str,
    deployment_id: &'a str,
    relative_path: &'a str,
) -> Vec<&'a str> {
    let mut segments = vec![
        "accounts",
        account_id,
        "pages",
        "projects",
        project,
        "deployments",
        deployment_id,
        "files",
    ];
    segments.extend(relative_path.split('/').filter(|s| !s.is_empty()));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = CloudflareClient::new("token");
        let url = client
            .endpoint(["accounts", "acc", "pages", "projects", "notion-ops-dashboard"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudflare.com/client/v4/accounts/acc/pages/projects/notion-ops-dashboard"
        );
    }

    #[test]
    fn test_endpoint_encodes_file_names() {
        let client = CloudflareClient::new("token").with_base_url("http://localhost:8787/v4/");
        let url = client
            .endpoint(file_segments("acc", "proj", "dep1", "assets/app bundle.js"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8787/v4/accounts/acc/pages/projects/proj/deployments/dep1/files/assets/app%20bundle.js"
        );
    }

    #[test]
    fn test_file_segments_skip_empty_parts() {
        let segments = file_segments("a", "p", "d", "/index.html");
        assert_eq!(segments.last(), Some(&"index.html"));
        assert_eq!(segments.len(), 9);
    }

    #[test]
    fn test_create_deployment_body_shape() {
        let mut manifest = BTreeMap::new();
        manifest.insert(
            "index.html".to_string(),
            ManifestEntry {
                size: 12,
                hash: "ab".repeat(32),
            },
        );
        let body = CreateDeploymentRequest {
            branch: "main",
            manifest: &manifest,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["branch"], "main");
        assert_eq!(json["manifest"]["index.html"]["size"], 12);
    }

    #[test]
    fn test_project_url_pattern() {
        let project: Project = serde_json::from_str(
            r#"{"name":"notion-ops-dashboard","subdomain":"notion-ops-dashboard.pages.dev"}"#,
        )
        .unwrap();
        assert_eq!(
            project.url_pattern().as_deref(),
            Some("https://notion-ops-dashboard.pages.dev")
        );
    }

    #[test]
    fn test_create_project_body_uses_snake_case() {
        let body = CreateProjectRequest {
            name: "ops",
            production_branch: "main",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"name":"ops","production_branch":"main"}"#);
    }
}
