//! Driving port for replacement strategy recommendations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ClubId, Error, OwnerId, Recommendation};

/// Request for a replacement recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestReplacementRequest {
    /// Owner whose bag is being considered.
    pub owner_id: OwnerId,
    /// Type token of the club that won the test.
    pub club_type: String,
    /// The winning club.
    pub winning_club_id: ClubId,
}

/// Port recommending single or set replacement for a winning club.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplacementAdvisor: Send + Sync {
    /// Recommend how to replace clubs of the given type.
    ///
    /// # Errors
    ///
    /// Inventory failures degrade the set range to `Unknown` rather than
    /// failing; implementations only error on programming faults.
    async fn suggest_replacement(
        &self,
        request: SuggestReplacementRequest,
    ) -> Result<Recommendation, Error>;
}
