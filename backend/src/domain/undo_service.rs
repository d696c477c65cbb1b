//! Undo engine and change history query.
//!
//! An undo reinstates every club a change removed, archives every club it
//! added, grades the restored bag and then consumes the ledger entry with a
//! conditional write. Losing that write to a concurrent undo rolls the
//! inventory back and reports a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::bag_service_support::{
    BagPorts, compensate, find_existing, fresh_grade, map_inventory_error, map_ledger_error,
};
use crate::domain::ports::{
    BagGrader, BagMutation, ChangeEntry, ChangeHistoryQuery, ChangeLedgerRepository,
    ChangeLedgerRepositoryError, ChangeUndoCommand, ClubInventoryRepository, ListChangesRequest,
    ListChangesResponse, UndoChangeRequest, UndoChangeResponse,
};
use crate::domain::{ArchivedClub, ChangeRecord, Error, OwnerLocks, evaluate_undo};

/// Service implementing the [`ChangeUndoCommand`] and [`ChangeHistoryQuery`]
/// driving ports.
pub struct UndoService<I, L, G> {
    ports: BagPorts<I, L, G>,
    clock: Arc<dyn Clock>,
    locks: Arc<OwnerLocks>,
}

impl<I, L, G> UndoService<I, L, G> {
    /// Create an undo service sharing `locks` with the mutation service.
    pub fn new(ports: BagPorts<I, L, G>, clock: Arc<dyn Clock>, locks: Arc<OwnerLocks>) -> Self {
        Self {
            ports,
            clock,
            locks,
        }
    }
}

impl<I, L, G> UndoService<I, L, G>
where
    I: ClubInventoryRepository,
    L: ChangeLedgerRepository,
    G: BagGrader,
{
    async fn load_record(&self, request: &UndoChangeRequest) -> Result<ChangeRecord, Error> {
        self.ports
            .ledger
            .find_change(&request.owner_id, &request.change_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("change {} not found", request.change_id)))
    }

    /// Build the reversing mutation. Every referenced club is fetched before
    /// anything is written; clubs already in their target state are skipped.
    async fn plan_reversal(
        &self,
        record: &ChangeRecord,
        now: DateTime<Utc>,
    ) -> Result<BagMutation, Error> {
        let owner_id = &record.owner_id;
        let inventory = self.ports.inventory.as_ref();
        let mut mutation = BagMutation::new(owner_id.clone());

        for club_id in record.removed_ids() {
            let club = find_existing(inventory, owner_id, club_id).await?;
            if club.is_active() {
                warn!(
                    %owner_id,
                    %club_id,
                    change_id = %record.id,
                    "removed club already active; skipping"
                );
                continue;
            }
            let shadow = self
                .ports
                .ledger
                .find_archived(owner_id, club_id)
                .await
                .map_err(map_ledger_error)?
                .unwrap_or_else(|| {
                    ArchivedClub::replaced(&club, None, club.archived_at.unwrap_or(now))
                });
            mutation.reinstate.push(shadow);
        }

        for club_id in record.added_ids() {
            let club = find_existing(inventory, owner_id, club_id).await?;
            if !club.is_active() {
                warn!(
                    %owner_id,
                    %club_id,
                    change_id = %record.id,
                    "added club already archived; skipping"
                );
                continue;
            }
            mutation
                .retire
                .push(ArchivedClub::undone(&club, record.id.clone(), now));
        }

        Ok(mutation)
    }
}

#[async_trait]
impl<I, L, G> ChangeUndoCommand for UndoService<I, L, G>
where
    I: ClubInventoryRepository,
    L: ChangeLedgerRepository,
    G: BagGrader,
{
    async fn undo_change(&self, request: UndoChangeRequest) -> Result<UndoChangeResponse, Error> {
        let _guard = self.locks.acquire(&request.owner_id).await;
        let now = self.clock.utc();

        let record = self.load_record(&request).await?;
        evaluate_undo(&record, now)?;
        let mutation = self.plan_reversal(&record, now).await?;

        let inventory = self.ports.inventory.as_ref();
        if !mutation.is_empty() {
            inventory
                .apply_mutation(&mutation)
                .await
                .map_err(map_inventory_error)?;
        }

        let restored_grade = match fresh_grade(self.ports.grader.as_ref(), &request.owner_id).await
        {
            Ok(grade) => grade,
            Err(error) => return Err(compensate(inventory, &mutation, error).await),
        };

        if let Err(error) = self
            .ports
            .ledger
            .mark_undone(&request.owner_id, &request.change_id, now)
            .await
        {
            let cause = match error {
                ChangeLedgerRepositoryError::AlreadyUndone { change_id } => {
                    Error::conflict(format!("change {change_id} was undone by another request"))
                }
                other => map_ledger_error(other),
            };
            return Err(compensate(inventory, &mutation, cause).await);
        }

        let response = UndoChangeResponse {
            restored_grade,
            clubs_restored: mutation.reinstate.len(),
            clubs_archived: mutation.retire.len(),
        };
        info!(
            owner_id = %request.owner_id,
            change_id = %request.change_id,
            restored = response.clubs_restored,
            archived = response.clubs_archived,
            "change undone"
        );
        Ok(response)
    }
}

#[async_trait]
impl<I, L, G> ChangeHistoryQuery for UndoService<I, L, G>
where
    I: ClubInventoryRepository,
    L: ChangeLedgerRepository,
    G: BagGrader,
{
    async fn list_changes(
        &self,
        request: ListChangesRequest,
    ) -> Result<ListChangesResponse, Error> {
        let now = self.clock.utc();
        let mut records = self
            .ports
            .ledger
            .list_changes(&request.owner_id)
            .await
            .map_err(map_ledger_error)?;
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        let changes = records
            .into_iter()
            .map(|record| ChangeEntry {
                actionable: record.actionable(now),
                record,
            })
            .collect();
        Ok(ListChangesResponse { changes })
    }
}

#[cfg(test)]
#[path = "undo_service_tests.rs"]
mod tests;
