//! # edgectl-api
//!
//! Blocking HTTP client for the edge platform's versioned-configuration API.
//!
//! The client is deliberately thin: request plumbing, JSON payload types and
//! a typed error. The interesting behaviour lives behind the capability
//! traits it implements — [`edgectl_transaction::VersionOps`] for the
//! clone/activate transaction and [`edgectl_sync::RemoteDictionary`] for
//! dictionary reconciliation — so the core crates never see HTTP.
//!
//! Configuration is an explicit [`ClientConfig`] value; nothing is read from
//! process-global state.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, ClientConfig, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use types::{BatchEntry, BatchOp, Dictionary, DictionaryItem, LogEndpoint, Service, Version};
