//! Shared plumbing for the bag mutation and undo services.

use std::sync::Arc;

use serde_json::json;
use tracing::error;

use crate::domain::ports::{
    BagGrader, BagGraderError, BagMutation, ChangeLedgerRepositoryError, ClubInventoryRepository,
    ClubInventoryRepositoryError,
};
use crate::domain::{Club, ClubId, Error, Grade, OwnerId};

/// Driven ports used by the mutating services.
pub struct BagPorts<I, L, G> {
    /// Club inventory store.
    pub inventory: Arc<I>,
    /// Change ledger store.
    pub ledger: Arc<L>,
    /// External grading service.
    pub grader: Arc<G>,
}

impl<I, L, G> BagPorts<I, L, G> {
    /// Bundle the three driven ports.
    pub fn new(inventory: Arc<I>, ledger: Arc<L>, grader: Arc<G>) -> Self {
        Self {
            inventory,
            ledger,
            grader,
        }
    }
}

impl<I, L, G> Clone for BagPorts<I, L, G> {
    fn clone(&self) -> Self {
        Self {
            inventory: Arc::clone(&self.inventory),
            ledger: Arc::clone(&self.ledger),
            grader: Arc::clone(&self.grader),
        }
    }
}

pub(crate) fn map_inventory_error(error: ClubInventoryRepositoryError) -> Error {
    match error {
        ClubInventoryRepositoryError::MissingClub { club_id } => missing_club(&club_id),
        other => other.into(),
    }
}

pub(crate) fn map_ledger_error(error: ChangeLedgerRepositoryError) -> Error {
    let details = match &error {
        ChangeLedgerRepositoryError::MissingChange { change_id } => {
            Some(json!({ "changeId": change_id }))
        }
        ChangeLedgerRepositoryError::AlreadyUndone { change_id } => {
            Some(json!({ "changeId": change_id, "code": "already_undone" }))
        }
        _ => None,
    };
    let mapped = Error::from(error);
    match details {
        Some(details) => mapped.with_details(details),
        None => mapped,
    }
}

pub(crate) fn map_grader_error(error: BagGraderError) -> Error {
    Error::from(error).with_details(json!({ "code": "grading_unavailable" }))
}

fn missing_club(club_id: &ClubId) -> Error {
    Error::not_found(format!("club {club_id} not found")).with_details(json!({ "clubId": club_id }))
}

/// Fetch a club that must exist, regardless of status.
pub(crate) async fn find_existing<I>(
    inventory: &I,
    owner_id: &OwnerId,
    club_id: &ClubId,
) -> Result<Club, Error>
where
    I: ClubInventoryRepository + ?Sized,
{
    inventory
        .find_club(owner_id, club_id)
        .await
        .map_err(map_inventory_error)?
        .ok_or_else(|| missing_club(club_id))
}

/// Request a fresh grade for the owner's current bag.
pub(crate) async fn fresh_grade<G>(grader: &G, owner_id: &OwnerId) -> Result<Grade, Error>
where
    G: BagGrader + ?Sized,
{
    grader.grade(owner_id).await.map_err(map_grader_error)
}

/// Reverse an applied mutation after a later step failed.
///
/// Returns `cause` unchanged when the rollback succeeds. When it fails the
/// failure is logged and recorded in the returned error's details.
pub(crate) async fn compensate<I>(inventory: &I, mutation: &BagMutation, cause: Error) -> Error
where
    I: ClubInventoryRepository + ?Sized,
{
    if mutation.is_empty() {
        return cause;
    }
    match inventory.rollback_mutation(mutation).await {
        Ok(()) => cause,
        Err(rollback_error) => {
            error!(
                owner_id = %mutation.owner_id,
                %rollback_error,
                cause = %cause,
                "compensating rollback failed; bag may be inconsistent"
            );
            let message = cause.message().to_owned();
            Error::internal(message).with_details(json!({
                "code": "compensation_failed",
                "cause": cause,
                "compensationError": rollback_error.to_string(),
            }))
        }
    }
}
