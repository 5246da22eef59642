//! Log-streaming session lifecycle.
//!
//! Attaching and detaching a log endpoint both mutate service configuration,
//! so each goes through a clone → mutate → activate transaction. The
//! remove-stale mutator runs first in every transaction: draft numbers are
//! not unique across retries, and a crashed earlier session may have left its
//! endpoint behind.

use anyhow::{Context, Result};

use edgectl_api::{ApiError, Client, LogEndpoint, Service};
use edgectl_transaction::{Mutator, Transaction, VersionOps};

/// Line template the platform expands per forwarded request.
const LOG_FORMAT: &str =
    r#"{ "client_ip": "%a", "method": "%m", "url": "%U", "status": "%>s", "bytes": "%b" }"#;

/// The slice of the API a session needs beyond clone/activate.
pub trait LogEndpointOps {
    fn list_log_endpoints(
        &self,
        service_id: &str,
        version: i64,
    ) -> Result<Vec<LogEndpoint>, ApiError>;

    fn create_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        endpoint: &LogEndpoint,
    ) -> Result<LogEndpoint, ApiError>;

    fn delete_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        name: &str,
    ) -> Result<(), ApiError>;

    /// Number of the currently live version of `service_id`.
    fn active_version(&self, service_id: &str) -> Result<i64, ApiError>;
}

impl LogEndpointOps for Client {
    fn list_log_endpoints(
        &self,
        service_id: &str,
        version: i64,
    ) -> Result<Vec<LogEndpoint>, ApiError> {
        Client::list_log_endpoints(self, service_id, version)
    }

    fn create_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        endpoint: &LogEndpoint,
    ) -> Result<LogEndpoint, ApiError> {
        Client::create_log_endpoint(self, service_id, version, endpoint)
    }

    fn delete_log_endpoint(
        &self,
        service_id: &str,
        version: i64,
        name: &str,
    ) -> Result<(), ApiError> {
        Client::delete_log_endpoint(self, service_id, version, name)
    }

    fn active_version(&self, service_id: &str) -> Result<i64, ApiError> {
        Ok(self.get_service(service_id)?.active_version)
    }
}

/// Where the platform should forward log lines.
#[derive(Debug, Clone)]
pub struct ForwardTarget {
    pub address: String,
    pub port: u16,
}

/// One operator's log-streaming session against one service.
pub struct LogSession<'a, C: VersionOps + LogEndpointOps> {
    client: &'a C,
    service_id: String,
    active_version: i64,
    forward: ForwardTarget,
    name: String,
}

impl<'a, C: VersionOps + LogEndpointOps> LogSession<'a, C> {
    pub fn new(client: &'a C, service: &Service, forward: ForwardTarget) -> Self {
        Self::named(
            client,
            &service.id,
            service.active_version,
            forward,
            session_name(),
        )
    }

    fn named(
        client: &'a C,
        service_id: &str,
        active_version: i64,
        forward: ForwardTarget,
        name: String,
    ) -> Self {
        Self {
            client,
            service_id: service_id.to_string(),
            active_version,
            forward,
            name,
        }
    }

    /// Attach the session's log endpoint: remove any stale endpoint a
    /// previous run left behind, then create a fresh one, in one transaction.
    pub fn start(&self) -> Result<()> {
        let tx = Transaction::new(self.client, self.service_id.clone(), self.active_version);
        let mut mutators: Vec<Mutator> = vec![
            self.remove_stale_endpoint_mutator(),
            self.create_endpoint_mutator(),
        ];
        tx.apply(&mut mutators).context("attaching log endpoint")
    }

    /// Detach the session's endpoint. Re-reads the live version first — the
    /// session's own `start` activated a newer version than it was bound to.
    pub fn dispose(&self) -> Result<()> {
        let latest = self
            .client
            .active_version(&self.service_id)
            .context("fetching latest service version")?;

        let tx = Transaction::new(self.client, self.service_id.clone(), latest);
        tx.apply(&mut [self.remove_stale_endpoint_mutator()])
            .context("detaching log endpoint")
    }

    fn remove_stale_endpoint_mutator(&self) -> Mutator<'_> {
        Box::new(move |draft| {
            let endpoints = self
                .client
                .list_log_endpoints(&draft.service_id, draft.number)?;
            for endpoint in endpoints {
                if endpoint.name == self.name {
                    self.client
                        .delete_log_endpoint(&draft.service_id, draft.number, &self.name)?;
                }
            }
            Ok(())
        })
    }

    fn create_endpoint_mutator(&self) -> Mutator<'_> {
        Box::new(move |draft| {
            let endpoint = LogEndpoint {
                name: self.name.clone(),
                address: self.forward.address.clone(),
                port: self.forward.port,
                format: LOG_FORMAT.to_string(),
            };
            self.client
                .create_log_endpoint(&draft.service_id, draft.number, &endpoint)?;
            Ok(())
        })
    }
}

/// Session names derive from the local username so concurrent operators do
/// not tear down each other's endpoints.
fn session_name() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown-user".to_string());
    format!("edgectl-{user}")
}
