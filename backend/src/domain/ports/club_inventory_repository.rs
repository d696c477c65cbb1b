//! Port for the owner's club inventory.
//!
//! The [`ClubInventoryRepository`] trait abstracts the document store holding
//! live club records and their archive shadows. Multi-document writes are
//! expressed as a single [`BagMutation`] so adapters can apply them
//! atomically and reverse them on request.

use async_trait::async_trait;

use crate::domain::{ArchivedClub, Club, ClubId, OwnerId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by inventory adapters.
    pub enum ClubInventoryRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            InternalError: "inventory store connection failed: {message}",
        /// Query or write failed during execution.
        Query { message: String } =>
            InternalError: "inventory store query failed: {message}",
        /// A mutation referenced a club the store does not hold.
        MissingClub { club_id: ClubId } =>
            NotFound: "club {club_id} not found in inventory",
    }
}

/// Multi-document inventory write applied as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct BagMutation {
    /// Owner whose bag is mutated.
    pub owner_id: OwnerId,
    /// Shadows for clubs to archive; each live record is marked archived.
    pub retire: Vec<ArchivedClub>,
    /// New clubs to insert active.
    pub insert: Vec<Club>,
    /// Shadows for archived clubs to reinstate; each shadow is dropped and
    /// the live record's archival fields cleared.
    pub reinstate: Vec<ArchivedClub>,
}

impl BagMutation {
    /// Empty mutation for `owner_id`.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            retire: Vec::new(),
            insert: Vec::new(),
            reinstate: Vec::new(),
        }
    }

    /// Whether the mutation writes nothing.
    pub fn is_empty(&self) -> bool {
        self.retire.is_empty() && self.insert.is_empty() && self.reinstate.is_empty()
    }

    /// Identifiers of the clubs being retired, in order.
    pub fn retired_ids(&self) -> Vec<ClubId> {
        self.retire
            .iter()
            .map(|shadow| shadow.club_id().clone())
            .collect()
    }
}

/// Port for reading and mutating an owner's clubs.
///
/// # Atomicity
///
/// [`apply_mutation`](Self::apply_mutation) must either apply every part of
/// the mutation or none of it. Within a mutation, archive shadows are written
/// before live records are marked archived.
/// [`rollback_mutation`](Self::rollback_mutation) reverses a previously
/// applied mutation: retired clubs are reinstated from their shadows,
/// inserted clubs are removed, and reinstated clubs are archived again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubInventoryRepository: Send + Sync {
    /// Active clubs in the owner's bag, duplicates included.
    async fn list_active(&self, owner_id: &OwnerId)
    -> Result<Vec<Club>, ClubInventoryRepositoryError>;

    /// Fetch one club regardless of status.
    async fn find_club(
        &self,
        owner_id: &OwnerId,
        club_id: &ClubId,
    ) -> Result<Option<Club>, ClubInventoryRepositoryError>;

    /// The owner's favourite club, if one is marked.
    async fn favorite_club(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<ClubId>, ClubInventoryRepositoryError>;

    /// Apply `mutation` atomically.
    async fn apply_mutation(
        &self,
        mutation: &BagMutation,
    ) -> Result<(), ClubInventoryRepositoryError>;

    /// Reverse a previously applied `mutation`.
    async fn rollback_mutation(
        &self,
        mutation: &BagMutation,
    ) -> Result<(), ClubInventoryRepositoryError>;
}
