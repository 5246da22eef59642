//! Error types for edgectl-transaction.

use thiserror::Error;

/// Error produced by a [`VersionOps`](crate::VersionOps) call.
///
/// Implementations surface whatever their transport layer produces; the
/// transaction wraps it with the step that failed.
pub type OpError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error produced by a mutator. Passed through with its cause intact.
pub type MutatorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can arise from applying a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Cloning the live version failed. No mutator ran and nothing was
    /// activated.
    #[error("cloning version {version} of service {service_id}")]
    Clone {
        service_id: String,
        version: i64,
        #[source]
        source: OpError,
    },

    /// A mutator failed. The draft is abandoned; remaining mutators are
    /// skipped and the draft is never activated.
    #[error(transparent)]
    Mutator(MutatorError),

    /// Activating the fully-mutated draft failed. The draft remains
    /// un-activated on the remote.
    #[error("activating version {version} of service {service_id}")]
    Activate {
        service_id: String,
        version: i64,
        #[source]
        source: OpError,
    },
}
