//! Shared persistence plumbing for every bounded context.
//!
//! Reads go through the per-context ports; writes are staged in a
//! [`ChangeSet`] and committed atomically through [`ChangeSetCommitter`], so
//! a state change and the notifications it raises land together or not at
//! all.
//!
//! - Port contracts live here and in each context's `ports` module
//! - Adapter implementations live in [`adapters`]

pub mod adapters;
mod change_set;
mod error;

pub use change_set::{Change, ChangeSet, CommitReceipt};
pub use error::{StoreError, StoreResult};

use crate::identity::ports::IdentityDirectory;
use crate::notification::ports::{NotificationStore, RecipientDirectory};
use crate::task::ports::TaskStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Atomic write contract.
#[async_trait]
pub trait ChangeSetCommitter: Send + Sync {
    /// Applies every change in order, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StaleTask`] when a guarded task update finds a
    /// different stored version, [`StoreError::EditRequestAlreadyResolved`]
    /// when a resolution targets a resolved request, a duplicate or
    /// not-found error when a row constraint fails, or
    /// [`StoreError::Persistence`] on infrastructure failure.
    async fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt>;
}

/// Rows removed by one purge batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeBatch {
    /// Tombstoned tasks removed.
    pub tasks: usize,
    /// Tombstoned profiles removed.
    pub users: usize,
    /// Assignments removed with them.
    pub assignments: usize,
    /// Notifications removed with purged recipients.
    pub notifications: usize,
}

/// Hard-delete contract used by the retention job.
#[async_trait]
pub trait Purger: Send + Sync {
    /// Permanently removes up to `limit` tasks and up to `limit` profiles
    /// tombstoned before `cutoff`, with their dependent rows, in one short
    /// transaction.
    ///
    /// Rows whose tombstone is unset are never touched. Rows locked by
    /// concurrent writers are skipped and picked up by a later batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] on infrastructure failure.
    async fn purge_batch(&self, cutoff: DateTime<Utc>, limit: usize) -> StoreResult<PurgeBatch>;
}

/// Every port the engine services need from one store.
pub trait EngineStore:
    IdentityDirectory
    + TaskStore
    + RecipientDirectory
    + NotificationStore
    + ChangeSetCommitter
    + Purger
    + 'static
{
}

impl<T> EngineStore for T where
    T: IdentityDirectory
        + TaskStore
        + RecipientDirectory
        + NotificationStore
        + ChangeSetCommitter
        + Purger
        + 'static
{
}
