//! Driving port for undoing a recorded change.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ChangeId, Error, Grade, OwnerId};

/// Request to undo one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoChangeRequest {
    /// Owner of the ledger entry.
    pub owner_id: OwnerId,
    /// Entry to undo.
    pub change_id: ChangeId,
}

/// Outcome of a successful undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoChangeResponse {
    /// Grade of the restored bag.
    pub restored_grade: Grade,
    /// Number of clubs put back in the bag.
    pub clubs_restored: usize,
    /// Number of clubs taken out of the bag.
    pub clubs_archived: usize,
}

/// Port for reversing a ledger entry within its undo window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeUndoCommand: Send + Sync {
    /// Undo a change.
    ///
    /// # Errors
    ///
    /// - `not_found` when the entry or a referenced club does not exist.
    /// - `failed_precondition` when the entry is expired or already undone.
    /// - `conflict` when a concurrent undo consumed the entry first.
    /// - `internal_error` on store or grader failure.
    async fn undo_change(&self, request: UndoChangeRequest) -> Result<UndoChangeResponse, Error>;
}
