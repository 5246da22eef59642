//! # edgectl-sync
//!
//! Diff-based reconciliation of a remote edge dictionary against a local
//! source of truth.
//!
//! [`Reconciler::sync`] reads the local items, validates them against the
//! remote store's limits, lists the current remote items, computes the
//! minimal create/update/delete changelog, and applies it in capped batches.
//! Batches already flushed when a later batch fails stay applied — the remote
//! offers no cross-batch transaction, so convergence is best-effort and a
//! re-run picks up where the failure left off.
//!
//! - [`engine`] — [`Reconciler`], capability traits, validation
//! - [`changelog`] — [`Change`] and the diff
//! - [`local`] — CSV-backed [`LocalSource`] adapter
//! - [`error`] — [`SyncError`]

pub mod changelog;
pub mod engine;
pub mod error;
pub mod local;

pub use changelog::{diff, Change};
pub use engine::{
    DictionaryTarget, Item, LocalSource, Reconciler, RemoteDictionary, RemoteError, SyncOutcome,
};
pub use error::{SourceError, SyncError};
pub use local::CsvSource;

/// The remote store caps dictionaries at 1000 items.
pub const MAX_DICTIONARY_ITEMS: usize = 1000;

/// Item keys are limited to 256 characters.
pub const MAX_KEY_CHARS: usize = 256;

/// Item values are limited to 8000 characters.
pub const MAX_VALUE_CHARS: usize = 8000;

/// A single batch mutation call accepts at most 1000 entries.
pub const MAX_BATCH_ENTRIES: usize = 1000;
