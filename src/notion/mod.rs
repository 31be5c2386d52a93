//! Notion workspace integration.
//!
//! Reads the tasks, leads, and grants databases through the Notion REST API.
//! Only the database query endpoint is used; everything else about the
//! workspace is out of scope.

pub mod client;
pub mod properties;

use serde::{Deserialize, Serialize};

use crate::types::Collection;

/// Notion integration configuration stored in ~/.ops-dashboard/config.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionConfig {
    /// Integration token. Absent means the dashboard runs on the
    /// substitute dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub databases: DatabaseIds,
    #[serde(default)]
    pub properties: PropertyNames,
}

impl NotionConfig {
    /// The configured API key, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Database ids for the three record collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leads: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants: Option<String>,
}

impl DatabaseIds {
    pub fn get(&self, collection: Collection) -> Option<&str> {
        let id = match collection {
            Collection::Tasks => self.tasks.as_deref(),
            Collection::Leads => self.leads.as_deref(),
            Collection::Grants => self.grants.as_deref(),
        };
        id.map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Property names the normalizer reads from each database.
///
/// The title column is located by type, so it has no entry here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNames {
    #[serde(default)]
    pub tasks: TaskProperties,
    #[serde(default)]
    pub leads: LeadProperties,
    #[serde(default)]
    pub grants: GrantProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProperties {
    #[serde(default = "default_priority_property")]
    pub priority: String,
    #[serde(default = "default_status_property")]
    pub status: String,
    #[serde(default = "default_due_property")]
    pub due: String,
    #[serde(default = "default_project_property")]
    pub project: String,
}

impl Default for TaskProperties {
    fn default() -> Self {
        Self {
            priority: default_priority_property(),
            status: default_status_property(),
            due: default_due_property(),
            project: default_project_property(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadProperties {
    #[serde(default = "default_status_property")]
    pub status: String,
    #[serde(default = "default_value_property")]
    pub value: String,
    #[serde(default = "default_follow_up_property")]
    pub follow_up: String,
}

impl Default for LeadProperties {
    fn default() -> Self {
        Self {
            status: default_status_property(),
            value: default_value_property(),
            follow_up: default_follow_up_property(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantProperties {
    #[serde(default = "default_status_property")]
    pub status: String,
    #[serde(default = "default_amount_property")]
    pub amount: String,
    #[serde(default = "default_deadline_property")]
    pub deadline: String,
}

impl Default for GrantProperties {
    fn default() -> Self {
        Self {
            status: default_status_property(),
            amount: default_amount_property(),
            deadline: default_deadline_property(),
        }
    }
}

fn default_priority_property() -> String {
    "Priority".to_string()
}

fn default_status_property() -> String {
    "Status".to_string()
}

fn default_due_property() -> String {
    "Due".to_string()
}

fn default_project_property() -> String {
    "Project".to_string()
}

fn default_value_property() -> String {
    "Value".to_string()
}

fn default_follow_up_property() -> String {
    "Follow-up".to_string()
}

fn default_amount_property() -> String {
    "Amount".to_string()
}

fn default_deadline_property() -> String {
    "Deadline".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_is_no_credential() {
        let config = NotionConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.credential(), None);
    }

    #[test]
    fn test_database_ids_lookup() {
        let ids = DatabaseIds {
            tasks: Some("abc".to_string()),
            leads: Some("".to_string()),
            grants: None,
        };
        assert_eq!(ids.get(Collection::Tasks), Some("abc"));
        assert_eq!(ids.get(Collection::Leads), None);
        assert_eq!(ids.get(Collection::Grants), None);
    }

    #[test]
    fn test_partial_property_names_keep_defaults() {
        let props: PropertyNames =
            serde_json::from_str(r#"{ "leads": { "value": "Deal Size" } }"#).unwrap();
        assert_eq!(props.leads.value, "Deal Size");
        assert_eq!(props.leads.status, "Status");
        assert_eq!(props.tasks.due, "Due");
        assert_eq!(props.grants.deadline, "Deadline");
    }
}
