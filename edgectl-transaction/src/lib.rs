//! # edgectl-transaction
//!
//! All-or-nothing configuration transactions over a versioned remote API.
//!
//! The remote service has no native rollback: a configuration version is
//! cloned, edited in place, and only becomes live once activated. This crate
//! models that as a [`Transaction`]: clone the bound version, run every
//! mutator against the draft, and activate only if all of them succeed. On
//! the first failure the draft is simply never activated — drafts are cheap
//! and inert, so "undo" is "walk away".
//!
//! ```no_run
//! # use edgectl_transaction::{Mutator, Transaction, VersionOps};
//! # fn demo<C: VersionOps>(client: &C) -> Result<(), edgectl_transaction::TransactionError> {
//! let tx = Transaction::new(client, "s-100", 4);
//! let mut mutators: Vec<Mutator> = vec![Box::new(|_draft| {
//!     // edit the draft version here
//!     Ok(())
//! })];
//! tx.apply(&mut mutators)
//! # }
//! ```

pub mod error;

pub use error::{MutatorError, OpError, TransactionError};

/// Identity of a cloned, not-yet-activated configuration version.
///
/// Handed to each mutator so it can address its edits at the draft. Draft
/// numbers are not unique across retries of a whole transaction — a crashed
/// run leaves its draft orphaned on the remote — which is why mutators must
/// be idempotent (see [`Transaction::apply`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftVersion {
    pub service_id: String,
    pub number: i64,
}

/// A single idempotent change applied to a draft version.
///
/// A mutator must first detect and remove any artifact a previous run of
/// itself may have left behind, then create its new state. Errors are
/// returned to the caller of [`Transaction::apply`] with their cause intact.
pub type Mutator<'a> = Box<dyn FnMut(DraftVersion) -> Result<(), MutatorError> + 'a>;

/// The narrow slice of the remote API a transaction needs: clone a version,
/// activate a version. Implemented by the HTTP client and by test stubs.
pub trait VersionOps {
    /// Clone `version` of `service_id`, returning the new draft's number.
    fn clone_version(&self, service_id: &str, version: i64) -> Result<i64, OpError>;

    /// Promote `version` of `service_id` to be the live configuration.
    fn activate_version(&self, service_id: &str, version: i64) -> Result<(), OpError>;
}

/// A clone → mutate → activate transaction bound to one service and the
/// version to clone from.
///
/// Construction performs no network call. Each [`apply`](Self::apply) call
/// re-clones, so a `Transaction` value can be reused for a retry.
pub struct Transaction<'a, C: VersionOps> {
    ops: &'a C,
    service_id: String,
    version: i64,
}

impl<'a, C: VersionOps> Transaction<'a, C> {
    pub fn new(ops: &'a C, service_id: impl Into<String>, version: i64) -> Self {
        Self {
            ops,
            service_id: service_id.into(),
            version,
        }
    }

    /// Clone the bound version, run `mutators` in order against the draft,
    /// and activate the draft if every mutator succeeded.
    ///
    /// The first failure — clone, any mutator, or activate — aborts the
    /// transaction and the draft is never activated. The live configuration
    /// changes if and only if this returns `Ok`. No step is retried.
    pub fn apply(&self, mutators: &mut [Mutator<'_>]) -> Result<(), TransactionError> {
        let draft = self.clone_draft()?;
        tracing::debug!(
            service_id = %draft.service_id,
            draft = draft.number,
            "cloned version {} into draft {}",
            self.version,
            draft.number
        );

        for mutator in mutators.iter_mut() {
            mutator(draft.clone()).map_err(TransactionError::Mutator)?;
        }

        self.activate(&draft)?;
        tracing::debug!(
            service_id = %draft.service_id,
            draft = draft.number,
            "activated draft"
        );
        Ok(())
    }

    fn clone_draft(&self) -> Result<DraftVersion, TransactionError> {
        let number = self
            .ops
            .clone_version(&self.service_id, self.version)
            .map_err(|source| TransactionError::Clone {
                service_id: self.service_id.clone(),
                version: self.version,
                source,
            })?;

        Ok(DraftVersion {
            service_id: self.service_id.clone(),
            number,
        })
    }

    fn activate(&self, draft: &DraftVersion) -> Result<(), TransactionError> {
        self.ops
            .activate_version(&draft.service_id, draft.number)
            .map_err(|source| TransactionError::Activate {
                service_id: draft.service_id.clone(),
                version: draft.number,
                source,
            })
    }
}
