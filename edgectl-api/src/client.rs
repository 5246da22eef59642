//! The blocking API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use edgectl_sync::{
    Change, DictionaryTarget, Item, RemoteDictionary, RemoteError, MAX_BATCH_ENTRIES,
};
use edgectl_transaction::{OpError, VersionOps};

use crate::error::ApiError;
use crate::types::{BatchEntry, Dictionary, DictionaryItem, LogEndpoint, Service, Version};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`Client`].
///
/// Passed in explicitly; the crate reads no environment variables and keeps
/// no process-global state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.provider.net`.
    pub endpoint: String,
    /// Bearer token attached to every request.
    pub token: String,
    /// Per-request timeout. This is also the effective cancellation deadline
    /// for calls made inside a transaction: a timed-out step surfaces as that
    /// step's error and the draft stays un-activated.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking client for the versioned-configuration API.
pub struct Client {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { agent, config }
    }

    pub fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.get("listing services", "/service")
    }

    pub fn get_service(&self, service_id: &str) -> Result<Service, ApiError> {
        self.get("fetching service", &format!("/service/{service_id}"))
    }

    /// Look a service up by its name. Names are unique per account.
    pub fn service_by_name(&self, name: &str) -> Result<Option<Service>, ApiError> {
        Ok(self.list_services()?.into_iter().find(|s| s.name == name))
    }

    pub fn create_service(&self, name: &str) -> Result<Service, ApiError> {
        const OP: &str = "creating service";
        let response = self
            .request("POST", "/service")
            .send_json(json!({ "name": name }))
            .map_err(|e| ApiError::from_ureq(OP, e))?;
        decode(OP, response)
    }

    /// Resolve a dictionary's id from its name on a given service version.
    pub fn dictionary_by_name(
        &self,
        service_id: &str,
        version: i64,
        name: &str,
    ) -> Result<Dictionary, ApiError> {
        self.get(
            "fetching dictionary",
            &format!("/service/{service_id}/version/{version}/dictionary/{name}"),
        )
    }

    pub fn list_dictionary_items(
        &self,
        service_id: &str,
        dictionary_id: &str,
    ) -> Result<Vec<DictionaryItem>, ApiError> {
        self.get(
            "listing dictionary items",
            &format!("/service/{service_id}/dictionary/{dictionary_id}/items"),
        )
    }

    /// Apply up to [`MAX_BATCH_ENTRIES`] dictionary mutations in one call.
    ///
    /// Oversized batches are rejected locally; no request goes out.
    pub fn batch_update_items(
        &self,
        service_id: &str,
        dictionary_id: &str,
        entries: &[BatchEntry],
    ) -> Result<(), ApiError> {
        const OP: &str = "updating dictionary items";
        if entries.len() > MAX_BATCH_ENTRIES {
            return Err(ApiError::BatchTooLarge {
                len: entries.len(),
            });
        }

        self.request(
            "PATCH",
            &format!("/service/{service_id}/dictionary/{dictionary_id}/items"),
        )
        .send_json(json!({ "items": entries }))
        .map_err(|e| ApiError::from_ureq(OP, e))?;
        Ok(())
    }

    pub fn list_log_endpoints(
        &self,
        service_id: &str,
        version: i64,
    ) -> Result<Vec<LogEndpoint>, ApiError> {
        self.get(
            "listing log endpoints",
            &format!("/service/{service_id}/version/{version}/logging"),
        )
    }

    pub fn create_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        endpoint: &LogEndpoint,
    ) -> Result<LogEndpoint, ApiError> {
        const OP: &str = "creating log endpoint";
        let response = self
            .request("POST", &format!("/service/{service_id}/version/{version}/logging"))
            .send_json(endpoint)
            .map_err(|e| ApiError::from_ureq(OP, e))?;
        decode(OP, response)
    }

    pub fn delete_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        name: &str,
    ) -> Result<(), ApiError> {
        const OP: &str = "deleting log endpoint";
        self.request(
            "DELETE",
            &format!("/service/{service_id}/version/{version}/logging/{name}"),
        )
        .call()
        .map_err(|e| ApiError::from_ureq(OP, e))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, op: &'static str, path: &str) -> Result<T, ApiError> {
        let response = self
            .request("GET", path)
            .call()
            .map_err(|e| ApiError::from_ureq(op, e))?;
        decode(op, response)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = join_url(&self.config.endpoint, path);
        tracing::debug!("{method} {url}");
        self.agent
            .request(method, &url)
            .set("Authorization", &format!("Bearer {}", self.config.token))
    }
}

impl VersionOps for Client {
    fn clone_version(&self, service_id: &str, version: i64) -> Result<i64, OpError> {
        const OP: &str = "cloning version";
        let response = self
            .request(
                "PUT",
                &format!("/service/{service_id}/version/{version}/clone"),
            )
            .call()
            .map_err(|e| ApiError::from_ureq(OP, e))?;
        let draft: Version = decode(OP, response)?;
        Ok(draft.number)
    }

    fn activate_version(&self, service_id: &str, version: i64) -> Result<(), OpError> {
        const OP: &str = "activating version";
        self.request(
            "PUT",
            &format!("/service/{service_id}/version/{version}/activate"),
        )
        .call()
        .map_err(|e| ApiError::from_ureq(OP, e))?;
        Ok(())
    }
}

impl RemoteDictionary for Client {
    fn list_items(&self, target: &DictionaryTarget) -> Result<Vec<Item>, RemoteError> {
        let items = self
            .list_dictionary_items(&target.service_id, &target.dictionary_id)
            .map_err(remote_err)?;
        Ok(items
            .into_iter()
            .map(|item| Item::new(item.item_key, item.item_value))
            .collect())
    }

    fn apply_batch(&self, target: &DictionaryTarget, batch: &[Change]) -> Result<(), RemoteError> {
        let entries: Vec<BatchEntry> = batch.iter().map(BatchEntry::from).collect();
        self.batch_update_items(&target.service_id, &target.dictionary_id, &entries)
            .map_err(remote_err)
    }
}

fn remote_err(err: ApiError) -> RemoteError {
    if err.is_not_found() {
        RemoteError::NotFound
    } else {
        RemoteError::Failed(Box::new(err))
    }
}

fn decode<T: DeserializeOwned>(op: &'static str, response: ureq::Response) -> Result<T, ApiError> {
    response
        .into_json()
        .map_err(|source| ApiError::Decode { op, source })
}

fn join_url(endpoint: &str, path: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), path)
}
