//! Error types for edgectl-sync.

use thiserror::Error;

use crate::{MAX_DICTIONARY_ITEMS, MAX_KEY_CHARS, MAX_VALUE_CHARS};

/// Error produced by a [`LocalSource`](crate::LocalSource) adapter.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can arise from a reconciliation run.
///
/// The limit variants (`TooManyItems`, `DuplicateKey`, `KeyTooLong`,
/// `ValueTooLong`) are raised before any remote mutation call is made.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote answered the item listing with a not-found status. This is
    /// a configuration mistake (wrong service or dictionary id), not a
    /// transient fault, so it is kept apart from [`SyncError::Remote`].
    #[error("dictionary {dictionary_id} not found")]
    DictionaryNotFound { dictionary_id: String },

    /// The local set exceeds the remote store's item cap.
    #[error("too many items ({count}); dictionaries hold at most {}", MAX_DICTIONARY_ITEMS)]
    TooManyItems { count: usize },

    /// The same key appears more than once in the local set.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    /// A local key exceeds the remote store's key length cap.
    #[error("key too long (max {} chars): {key}", MAX_KEY_CHARS)]
    KeyTooLong { key: String },

    /// A local value exceeds the remote store's value length cap.
    #[error("value too long for key {key} (max {} chars)", MAX_VALUE_CHARS)]
    ValueTooLong { key: String },

    /// A remote call failed, annotated with the operation for context.
    #[error("{op} failed")]
    Remote {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The local source could not be read.
    #[error("reading local items")]
    Local {
        #[source]
        source: SourceError,
    },
}
