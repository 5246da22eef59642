//! JSON payload types for the versioned-configuration API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use edgectl_sync::Change;

/// A service as the API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Number of the currently live configuration version.
    pub active_version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A configuration version of a service.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    pub number: i64,
    pub service_id: String,
    #[serde(default)]
    pub active: bool,
}

/// An edge dictionary attached to a service version.
#[derive(Debug, Clone, Deserialize)]
pub struct Dictionary {
    pub id: String,
    pub name: String,
}

/// One key/value entry of an edge dictionary.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryItem {
    pub item_key: String,
    pub item_value: String,
}

/// A log-forwarding endpoint attached to a service version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEndpoint {
    pub name: String,
    /// Address the platform forwards log lines to.
    pub address: String,
    pub port: u16,
    /// Line template expanded by the platform per request.
    #[serde(default)]
    pub format: String,
}

/// Operation kind of a [`BatchEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOp {
    Create,
    Update,
    Upsert,
    Delete,
}

/// One entry of a batched dictionary mutation. Deletes carry no value and
/// serialise without an `item_value` field.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub op: BatchOp,
    pub item_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_value: Option<String>,
}

impl From<&Change> for BatchEntry {
    fn from(change: &Change) -> Self {
        match change {
            Change::Create { key, value } => Self {
                op: BatchOp::Create,
                item_key: key.clone(),
                item_value: Some(value.clone()),
            },
            Change::Update { key, value } => Self {
                op: BatchOp::Update,
                item_key: key.clone(),
                item_value: Some(value.clone()),
            },
            Change::Delete { key } => Self {
                op: BatchOp::Delete,
                item_key: key.clone(),
                item_value: None,
            },
        }
    }
}
