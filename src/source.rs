//! Data source adapter.
//!
//! Either reads the three record collections concurrently from a live
//! [`RecordSource`], or hands back the substitute dataset. There is no
//! partial-success path: one failed read replaces the whole result with the
//! substitute dataset and attaches a warning for the dashboard.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DashboardError;
use crate::normalize::normalize_collections;
use crate::notion::client::{NotionClient, NotionError};
use crate::notion::{NotionConfig, PropertyNames};
use crate::substitute::substitute_dataset;
use crate::types::{Collection, Dataset};

/// A backend that can list the raw records of one collection.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn query_collection(
        &self,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, NotionError>;
}

/// Raw payloads of the three collections, exactly as the source returned them.
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    pub tasks: Vec<serde_json::Value>,
    pub leads: Vec<serde_json::Value>,
    pub grants: Vec<serde_json::Value>,
}

/// Where the displayed dataset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DataOrigin {
    /// Fetched from Notion this cycle.
    Live,
    /// No credential configured; substitute data is the supported mode.
    Substitute,
    /// A live read failed; substitute data plus a warning.
    Fallback { warning: String },
}

impl DataOrigin {
    pub fn warning(&self) -> Option<&str> {
        match self {
            DataOrigin::Fallback { warning } => Some(warning),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataOrigin::Live => "Notion Ops HQ (Live)",
            DataOrigin::Substitute => "Notion Ops HQ (Mock Mode)",
            DataOrigin::Fallback { .. } => "Notion Ops HQ (Mock Mode, fetch failed)",
        }
    }
}

/// A dataset together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    pub origin: DataOrigin,
}

/// Build the live source from configuration.
///
/// No credential returns `None`, the supported substitute mode. Missing
/// database ids are not checked here: they surface as fetch failures so the
/// dashboard shows a warning.
pub fn source_from_config(config: &NotionConfig) -> Option<NotionClient> {
    config
        .credential()
        .map(|key| NotionClient::new(key, config.databases.clone()))
}

/// Read all three collections concurrently. The first failure wins and the
/// remaining in-flight reads are dropped.
pub async fn fetch_collections(source: &dyn RecordSource) -> Result<RawCollections, NotionError> {
    let (tasks, leads, grants) = tokio::try_join!(
        source.query_collection(Collection::Tasks),
        source.query_collection(Collection::Leads),
        source.query_collection(Collection::Grants),
    )?;

    Ok(RawCollections {
        tasks,
        leads,
        grants,
    })
}

/// Produce the dataset for one refresh cycle.
pub async fn load_dataset(source: Option<&dyn RecordSource>, props: &PropertyNames) -> LoadedData {
    let Some(source) = source else {
        log::debug!("Data source: no Notion credential, using substitute dataset");
        return LoadedData {
            dataset: substitute_dataset(),
            origin: DataOrigin::Substitute,
        };
    };

    match fetch_collections(source).await {
        Ok(raw) => {
            let dataset = normalize_collections(&raw, props);
            log::info!(
                "Data source: loaded {} tasks, {} leads, {} grants",
                dataset.tasks.len(),
                dataset.leads.len(),
                dataset.grants.len()
            );
            LoadedData {
                dataset,
                origin: DataOrigin::Live,
            }
        }
        Err(e) => {
            let err = DashboardError::from(e);
            err.log("Data source: fetch failed, falling back to substitute data");
            LoadedData {
                dataset: substitute_dataset(),
                origin: DataOrigin::Fallback {
                    warning: format!(
                        "{}. Showing sample data. {}",
                        err,
                        err.recovery_suggestion()
                    ),
                },
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test source that serves canned pages and can fail one collection.
    pub(crate) struct FakeSource {
        pub calls: AtomicUsize,
        pub fail_on: Option<Collection>,
    }

    impl FakeSource {
        pub(crate) fn healthy() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        pub(crate) fn failing(collection: Collection) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(collection),
            }
        }
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn query_collection(
            &self,
            collection: Collection,
        ) -> Result<Vec<serde_json::Value>, NotionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(collection) {
                return Err(NotionError::Api {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }
            let page = json!({
                "id": format!("live-{}", collection),
                "properties": {
                    "Name": { "type": "title", "title": [{ "plain_text": "Live record" }] }
                }
            });
            Ok(vec![page])
        }
    }

    #[tokio::test]
    async fn test_no_credential_returns_substitute_dataset() {
        let config = NotionConfig::default();
        let source = source_from_config(&config);
        assert!(source.is_none());

        let loaded = load_dataset(
            source.as_ref().map(|c| c as &dyn RecordSource),
            &config.properties,
        )
        .await;
        assert_eq!(loaded.origin, DataOrigin::Substitute);
        assert_eq!(loaded.origin.warning(), None);
        assert_eq!(loaded.dataset, substitute_dataset());
    }

    #[tokio::test]
    async fn test_live_source_reads_all_three_collections() {
        let fake = FakeSource::healthy();
        let loaded = load_dataset(Some(&fake), &PropertyNames::default()).await;
        assert_eq!(loaded.origin, DataOrigin::Live);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
        assert_eq!(loaded.dataset.tasks[0].id, "live-tasks");
        assert_eq!(loaded.dataset.leads[0].id, "live-leads");
        assert_eq!(loaded.dataset.grants[0].id, "live-grants");
    }

    #[tokio::test]
    async fn test_any_failure_falls_back_entirely() {
        for collection in Collection::ALL {
            let fake = FakeSource::failing(collection);
            let loaded = load_dataset(Some(&fake), &PropertyNames::default()).await;
            assert_eq!(loaded.dataset, substitute_dataset(), "failing {}", collection);
            let warning = loaded.origin.warning().expect("fallback warning");
            assert!(warning.contains("bad gateway"));
        }
    }

    #[test]
    fn test_source_from_config_requires_credential() {
        assert!(source_from_config(&NotionConfig::default()).is_none());
        let config = NotionConfig {
            api_key: Some("secret_abc".to_string()),
            ..Default::default()
        };
        assert!(source_from_config(&config).is_some());
    }

    #[test]
    fn test_origin_labels() {
        assert!(DataOrigin::Substitute.label().contains("Mock Mode"));
        assert!(DataOrigin::Live.label().contains("Live"));
        assert_eq!(DataOrigin::Live.warning(), None);
    }
}
