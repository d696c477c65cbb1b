//! Port for the change ledger and archive shadows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ArchivedClub, ChangeId, ChangeRecord, ClubId, OwnerId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by change ledger adapters.
    pub enum ChangeLedgerRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            InternalError: "change ledger connection failed: {message}",
        /// Query or write failed during execution.
        Query { message: String } =>
            InternalError: "change ledger query failed: {message}",
        /// The referenced ledger entry does not exist.
        MissingChange { change_id: ChangeId } =>
            NotFound: "change {change_id} not found in ledger",
        /// Another writer consumed the entry first.
        AlreadyUndone { change_id: ChangeId } =>
            Conflict: "change {change_id} was already undone",
    }
}

/// Port for ledger entries and the archive shadows they reference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeLedgerRepository: Send + Sync {
    /// Write `record` and back-fill its identifier onto the archive shadows
    /// of `archived`, as one atomic write.
    async fn record_change(
        &self,
        record: &ChangeRecord,
        archived: &[ClubId],
    ) -> Result<(), ChangeLedgerRepositoryError>;

    /// Fetch one ledger entry.
    async fn find_change(
        &self,
        owner_id: &OwnerId,
        change_id: &ChangeId,
    ) -> Result<Option<ChangeRecord>, ChangeLedgerRepositoryError>;

    /// Every ledger entry for the owner, newest first.
    async fn list_changes(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<ChangeRecord>, ChangeLedgerRepositoryError>;

    /// Archive shadow for an archived club.
    async fn find_archived(
        &self,
        owner_id: &OwnerId,
        club_id: &ClubId,
    ) -> Result<Option<ArchivedClub>, ChangeLedgerRepositoryError>;

    /// Conditionally consume an entry.
    ///
    /// Succeeds only if the entry is still undoable, returning the consumed
    /// entry. Returns [`ChangeLedgerRepositoryError::AlreadyUndone`] when
    /// another writer won.
    async fn mark_undone(
        &self,
        owner_id: &OwnerId,
        change_id: &ChangeId,
        at: DateTime<Utc>,
    ) -> Result<ChangeRecord, ChangeLedgerRepositoryError>;
}
