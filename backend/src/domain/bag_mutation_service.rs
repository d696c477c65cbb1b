//! Bag mutation transaction.
//!
//! Applies one replacement event: checks preconditions, snapshots the grade,
//! archives the losing club(s) and inserts the winning club(s) in one store
//! write, grades the new bag and records an undoable ledger entry. Failures
//! after the inventory write roll that write back before surfacing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::bag_service_support::{
    BagPorts, compensate, find_existing, fresh_grade, map_inventory_error, map_ledger_error,
};
use crate::domain::ports::{
    ApplyReplacementRequest, ApplyReplacementResponse, BagGrader, BagMutation,
    BagMutationCommand, ChangeLedgerRepository, ClubInventoryRepository,
};
use crate::domain::{
    ArchivedClub, ChangeId, ChangeRecord, Club, ClubId, DEFAULT_UNDO_WINDOW_DAYS, Error,
    GradeImpact, OwnerId, OwnerLocks, Placement, PreconditionFailure, ReplacementMode,
    ensure_losing_member, generate_members, resolve_removals,
};

/// Service implementing the [`BagMutationCommand`] driving port.
pub struct BagMutationService<I, L, G> {
    ports: BagPorts<I, L, G>,
    clock: Arc<dyn Clock>,
    locks: Arc<OwnerLocks>,
    undo_window: Duration,
}

impl<I, L, G> BagMutationService<I, L, G> {
    /// Create a service with the default seven-day undo window.
    ///
    /// Pass the same `locks` to the undo service so mutations and undos for
    /// one owner are serialised together.
    pub fn new(ports: BagPorts<I, L, G>, clock: Arc<dyn Clock>, locks: Arc<OwnerLocks>) -> Self {
        Self {
            ports,
            clock,
            locks,
            undo_window: Duration::days(DEFAULT_UNDO_WINDOW_DAYS),
        }
    }

    /// Override the undo window.
    #[must_use]
    pub fn with_undo_window(mut self, undo_window: Duration) -> Self {
        self.undo_window = undo_window;
        self
    }
}

/// Writes a replacement will perform, computed before anything is written.
struct ReplacementPlan {
    mutation: BagMutation,
    now: DateTime<Utc>,
}

impl<I, L, G> BagMutationService<I, L, G>
where
    I: ClubInventoryRepository,
    L: ChangeLedgerRepository,
    G: BagGrader,
{
    fn validate(request: &ApplyReplacementRequest) -> Result<(), Error> {
        if request.winning_club_id == request.losing_club_id {
            return Err(
                Error::invalid_request("winning and losing club must differ").with_details(json!({
                    "field": "winningClubId",
                    "code": "same_club",
                })),
            );
        }
        if request.mode == ReplacementMode::Set && request.set_spec.is_none() {
            return Err(
                Error::invalid_request("missing required field: setSpec").with_details(json!({
                    "field": "setSpec",
                    "code": "missing_field",
                })),
            );
        }
        Ok(())
    }

    async fn plan(&self, request: &ApplyReplacementRequest) -> Result<ReplacementPlan, Error> {
        let owner_id = &request.owner_id;
        let inventory = self.ports.inventory.as_ref();
        let now = self.clock.utc();

        let losing = find_existing(inventory, owner_id, &request.losing_club_id).await?;
        if !losing.is_active() {
            return Err(PreconditionFailure::ClubNotActive {
                club_id: losing.id,
            }
            .into());
        }
        let winning = find_existing(inventory, owner_id, &request.winning_club_id).await?;

        let (removals, additions) = match (request.mode, request.set_spec.as_ref()) {
            (ReplacementMode::Set, Some(spec)) => {
                let active = inventory
                    .list_active(owner_id)
                    .await
                    .map_err(map_inventory_error)?;
                let removals = resolve_removals(spec, &active, &winning.id)?;
                ensure_losing_member(&removals, &losing.id)?;
                let placement = Placement {
                    owner_id: owner_id.clone(),
                    session_id: request.session_id.clone(),
                    at: now,
                };
                let additions = generate_members(spec, &winning, &removals, &placement)?;
                (removals, additions)
            }
            _ => {
                let addition =
                    winning.clone_into_bag(ClubId::random(), request.session_id.clone(), now);
                (vec![losing], vec![addition])
            }
        };

        self.ensure_no_favorite(owner_id, &removals).await?;

        let mut mutation = BagMutation::new(owner_id.clone());
        mutation.retire = removals
            .iter()
            .map(|club| ArchivedClub::replaced(club, replacement_for(club, &additions), now))
            .collect();
        mutation.insert = additions;
        Ok(ReplacementPlan { mutation, now })
    }

    async fn ensure_no_favorite(
        &self,
        owner_id: &OwnerId,
        removals: &[Club],
    ) -> Result<(), Error> {
        let favorite = self
            .ports
            .inventory
            .favorite_club(owner_id)
            .await
            .map_err(map_inventory_error)?;
        match favorite {
            Some(club_id) if removals.iter().any(|club| club.id == club_id) => {
                Err(PreconditionFailure::FavoriteClubProtected { club_id }.into())
            }
            _ => Ok(()),
        }
    }

    fn change_record(
        &self,
        request: &ApplyReplacementRequest,
        plan: &ReplacementPlan,
        impact: GradeImpact,
    ) -> ChangeRecord {
        ChangeRecord {
            id: ChangeId::random(),
            owner_id: request.owner_id.clone(),
            created_at: plan.now,
            kind: request.mode,
            session_id: request.session_id.clone(),
            clubs_added: plan.mutation.insert.iter().map(Club::summary).collect(),
            clubs_removed: plan
                .mutation
                .retire
                .iter()
                .map(|shadow| shadow.club.summary())
                .collect(),
            impact,
            undo_expires_at: plan.now + self.undo_window,
            can_undo: true,
            undone: false,
            undone_at: None,
        }
    }
}

/// New club standing in for `club`: the addition of the same canonical type,
/// or the only addition of a single replacement.
fn replacement_for(club: &Club, additions: &[Club]) -> Option<ClubId> {
    let canonical = club.canonical_type();
    additions
        .iter()
        .find(|addition| addition.canonical_type() == canonical)
        .or_else(|| match additions {
            [only] => Some(only),
            _ => None,
        })
        .map(|addition| addition.id.clone())
}

#[async_trait]
impl<I, L, G> BagMutationCommand for BagMutationService<I, L, G>
where
    I: ClubInventoryRepository,
    L: ChangeLedgerRepository,
    G: BagGrader,
{
    async fn apply_replacement(
        &self,
        request: ApplyReplacementRequest,
    ) -> Result<ApplyReplacementResponse, Error> {
        Self::validate(&request)?;
        let _guard = self.locks.acquire(&request.owner_id).await;

        let plan = self.plan(&request).await?;
        let inventory = self.ports.inventory.as_ref();
        let before = fresh_grade(self.ports.grader.as_ref(), &request.owner_id).await?;

        inventory
            .apply_mutation(&plan.mutation)
            .await
            .map_err(map_inventory_error)?;

        let after = match fresh_grade(self.ports.grader.as_ref(), &request.owner_id).await {
            Ok(grade) => grade,
            Err(error) => return Err(compensate(inventory, &plan.mutation, error).await),
        };

        let impact = GradeImpact::new(before, after);
        let record = self.change_record(&request, &plan, impact);
        if let Err(error) = self
            .ports
            .ledger
            .record_change(&record, &plan.mutation.retired_ids())
            .await
        {
            return Err(compensate(inventory, &plan.mutation, map_ledger_error(error)).await);
        }

        let response = ApplyReplacementResponse {
            grade: record.impact.after.clone(),
            change_id: record.id.clone(),
            added_count: record.clubs_added.len(),
            removed_count: record.clubs_removed.len(),
            improvement: record.impact.improvement(),
        };
        info!(
            owner_id = %record.owner_id,
            change_id = %record.id,
            kind = ?record.kind,
            added = response.added_count,
            removed = response.removed_count,
            improvement = response.improvement,
            "bag replacement committed"
        );
        Ok(response)
    }
}

#[cfg(test)]
#[path = "bag_mutation_service_tests.rs"]
mod tests;
