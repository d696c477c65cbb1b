//! Transport-agnostic caller-facing operations.
//!
//! Each operation resolves the caller's owner identity first, then binds the
//! payload to that owner and delegates to a driving port. Payloads never
//! carry an owner of their own, so a caller cannot act on another bag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    ApplyReplacementRequest, ApplyReplacementResponse, BagMutationCommand, ChangeHistoryQuery,
    ChangeUndoCommand, ListChangesRequest, ListChangesResponse, ReplacementAdvisor,
    SuggestReplacementRequest, UndoChangeRequest, UndoChangeResponse,
};
use crate::domain::{
    ChangeId, ClubId, Error, OwnerId, Recommendation, ReplacementMode, SessionId, SetSpec,
};

use super::CallerIdentity;

/// Payload for `suggestReplacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestReplacementBody {
    pub club_type: String,
    pub winning_club_id: ClubId,
}

/// Payload for `applyReplacement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReplacementBody {
    pub session_id: SessionId,
    pub winning_club_id: ClubId,
    pub losing_club_id: ClubId,
    pub mode: ReplacementMode,
    #[serde(default)]
    pub set_spec: Option<SetSpec>,
}

/// Payload for `undoChange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoChangeBody {
    pub change_id: ChangeId,
}

impl SuggestReplacementBody {
    fn bind(self, owner_id: OwnerId) -> SuggestReplacementRequest {
        SuggestReplacementRequest {
            owner_id,
            club_type: self.club_type,
            winning_club_id: self.winning_club_id,
        }
    }
}

impl ApplyReplacementBody {
    fn bind(self, owner_id: OwnerId) -> ApplyReplacementRequest {
        ApplyReplacementRequest {
            owner_id,
            session_id: self.session_id,
            winning_club_id: self.winning_club_id,
            losing_club_id: self.losing_club_id,
            mode: self.mode,
            set_spec: self.set_spec,
        }
    }
}

/// Driving ports behind the caller-facing operations.
#[derive(Clone)]
pub struct BagOperations {
    pub advisor: Arc<dyn ReplacementAdvisor>,
    pub mutations: Arc<dyn BagMutationCommand>,
    pub undo: Arc<dyn ChangeUndoCommand>,
    pub history: Arc<dyn ChangeHistoryQuery>,
}

impl BagOperations {
    /// Recommend a set or single replacement for the caller's bag.
    pub async fn suggest_replacement(
        &self,
        caller: &CallerIdentity,
        body: SuggestReplacementBody,
    ) -> Result<Recommendation, Error> {
        let owner_id = caller.require_owner()?;
        self.advisor.suggest_replacement(body.bind(owner_id)).await
    }

    /// Apply a replacement to the caller's bag.
    pub async fn apply_replacement(
        &self,
        caller: &CallerIdentity,
        body: ApplyReplacementBody,
    ) -> Result<ApplyReplacementResponse, Error> {
        let owner_id = caller.require_owner()?;
        self.mutations.apply_replacement(body.bind(owner_id)).await
    }

    /// Undo one of the caller's changes.
    pub async fn undo_change(
        &self,
        caller: &CallerIdentity,
        body: UndoChangeBody,
    ) -> Result<UndoChangeResponse, Error> {
        let owner_id = caller.require_owner()?;
        self.undo
            .undo_change(UndoChangeRequest {
                owner_id,
                change_id: body.change_id,
            })
            .await
    }

    /// List the caller's changes, newest first.
    pub async fn list_changes(
        &self,
        caller: &CallerIdentity,
    ) -> Result<ListChangesResponse, Error> {
        let owner_id = caller.require_owner()?;
        self.history
            .list_changes(ListChangesRequest { owner_id })
            .await
    }
}
