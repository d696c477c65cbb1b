//! Driving port for applying a replacement to an owner's bag.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ChangeId, ClubId, Error, Grade, OwnerId, ReplacementMode, SessionId, SetSpec};

/// Request to replace one club or a matched set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReplacementRequest {
    /// Owner whose bag is mutated.
    pub owner_id: OwnerId,
    /// Testing session that produced the decision.
    pub session_id: SessionId,
    /// Club that won the test.
    pub winning_club_id: ClubId,
    /// Club that lost the test.
    pub losing_club_id: ClubId,
    /// Single or set replacement.
    pub mode: ReplacementMode,
    /// Set declaration; required for set mode.
    #[serde(default)]
    pub set_spec: Option<SetSpec>,
}

/// Outcome of a committed replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReplacementResponse {
    /// Grade after the replacement.
    pub grade: Grade,
    /// Ledger entry recording the replacement.
    pub change_id: ChangeId,
    /// Number of clubs inserted.
    pub added_count: usize,
    /// Number of clubs archived.
    pub removed_count: usize,
    /// Overall score change.
    pub improvement: f64,
}

/// Port for the bag mutation transaction.
///
/// # Errors
///
/// - `invalid_request` for malformed set declarations or a losing club
///   outside the resolved set.
/// - `not_found` when the losing or winning club does not exist.
/// - `failed_precondition` when a favourite would be removed or the losing
///   club is not in the bag. No writes happen in these cases.
/// - `internal_error` when the store or grader fails; any applied inventory
///   change is rolled back first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BagMutationCommand: Send + Sync {
    /// Apply a replacement and record it in the ledger.
    async fn apply_replacement(
        &self,
        request: ApplyReplacementRequest,
    ) -> Result<ApplyReplacementResponse, Error>;
}
