//! Driving port for reading an owner's change history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ChangeRecord, Error, OwnerId};

/// Request for an owner's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangesRequest {
    /// Owner whose ledger is read.
    pub owner_id: OwnerId,
}

/// One ledger entry plus whether it can currently be undone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    /// The ledger entry.
    #[serde(flatten)]
    pub record: ChangeRecord,
    /// Whether an undo would be accepted now.
    pub actionable: bool,
}

/// Owner's ledger, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangesResponse {
    /// Entries ordered newest first.
    pub changes: Vec<ChangeEntry>,
}

/// Read-only port over the change ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeHistoryQuery: Send + Sync {
    /// List an owner's changes.
    async fn list_changes(&self, request: ListChangesRequest) -> Result<ListChangesResponse, Error>;
}
