//! In-memory document store implementing the inventory and ledger ports.
//!
//! Every port call takes the document lock once, so each mutation is
//! validated in full before any part of it is written.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::document::{BagDocument, OwnerBag};
use crate::domain::ports::{
    BagMutation, ChangeLedgerRepository, ChangeLedgerRepositoryError, ClubInventoryRepository,
    ClubInventoryRepositoryError,
};
use crate::domain::{ArchivedClub, ChangeId, ChangeRecord, Club, ClubId, ClubStatus, OwnerId};

/// Document store backed by a [`BagDocument`] behind an async lock.
#[derive(Debug, Default)]
pub struct InMemoryBagStore {
    document: RwLock<BagDocument>,
}

impl InMemoryBagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `document`.
    pub fn from_document(document: BagDocument) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }

    /// Copy of the current document.
    pub async fn snapshot(&self) -> BagDocument {
        self.document.read().await.clone()
    }

    /// Insert or replace a club record.
    pub async fn seed_club(&self, club: Club) {
        let mut document = self.document.write().await;
        document
            .owner_mut(&club.owner_id)
            .clubs
            .insert(club.id.clone(), club);
    }

    /// Mark `club_id` as the owner's favourite.
    pub async fn set_favorite(&self, owner_id: &OwnerId, club_id: Option<ClubId>) {
        self.document.write().await.owner_mut(owner_id).favorite_club_id = club_id;
    }

    /// Identifiers of the owner's active clubs.
    pub async fn active_ids(&self, owner_id: &OwnerId) -> BTreeSet<ClubId> {
        self.document
            .read()
            .await
            .owner(owner_id)
            .map(|bag| {
                bag.clubs
                    .values()
                    .filter(|club| club.is_active())
                    .map(|club| club.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn ensure_present(
    bag: &OwnerBag,
    shadows: &[ArchivedClub],
) -> Result<(), ClubInventoryRepositoryError> {
    match shadows
        .iter()
        .find(|shadow| !bag.clubs.contains_key(shadow.club_id()))
    {
        Some(shadow) => Err(ClubInventoryRepositoryError::missing_club(
            shadow.club_id().clone(),
        )),
        None => Ok(()),
    }
}

fn validate_apply(
    bag: &OwnerBag,
    mutation: &BagMutation,
) -> Result<(), ClubInventoryRepositoryError> {
    ensure_present(bag, &mutation.retire)?;
    ensure_present(bag, &mutation.reinstate)?;
    match mutation
        .insert
        .iter()
        .find(|club| bag.clubs.contains_key(&club.id))
    {
        Some(club) => Err(ClubInventoryRepositoryError::query(format!(
            "club {} already exists",
            club.id
        ))),
        None => Ok(()),
    }
}

fn archive_live(bag: &mut OwnerBag, club_id: &ClubId, at: DateTime<Utc>) {
    if let Some(club) = bag.clubs.get_mut(club_id) {
        club.status = ClubStatus::Archived;
        club.archived_at = Some(at);
    }
}

fn reactivate_live(bag: &mut OwnerBag, club_id: &ClubId) {
    if let Some(club) = bag.clubs.get_mut(club_id) {
        club.status = ClubStatus::Active;
        club.archived_at = None;
    }
}

#[async_trait]
impl ClubInventoryRepository for InMemoryBagStore {
    async fn list_active(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<Club>, ClubInventoryRepositoryError> {
        let document = self.document.read().await;
        let mut clubs: Vec<Club> = document
            .owner(owner_id)
            .map(|bag| {
                bag.clubs
                    .values()
                    .filter(|club| club.is_active())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        clubs.sort_by(|left, right| {
            left.added_to_bag_at
                .cmp(&right.added_to_bag_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(clubs)
    }

    async fn find_club(
        &self,
        owner_id: &OwnerId,
        club_id: &ClubId,
    ) -> Result<Option<Club>, ClubInventoryRepositoryError> {
        let document = self.document.read().await;
        Ok(document
            .owner(owner_id)
            .and_then(|bag| bag.clubs.get(club_id))
            .cloned())
    }

    async fn favorite_club(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<ClubId>, ClubInventoryRepositoryError> {
        let document = self.document.read().await;
        Ok(document
            .owner(owner_id)
            .and_then(|bag| bag.favorite_club_id.clone()))
    }

    async fn apply_mutation(
        &self,
        mutation: &BagMutation,
    ) -> Result<(), ClubInventoryRepositoryError> {
        let mut document = self.document.write().await;
        let bag = document.owner_mut(&mutation.owner_id);
        validate_apply(bag, mutation)?;

        for shadow in &mutation.retire {
            bag.archived.insert(shadow.club_id().clone(), shadow.clone());
            archive_live(bag, shadow.club_id(), shadow.archived_at);
        }
        for club in &mutation.insert {
            bag.clubs.insert(club.id.clone(), club.clone());
        }
        for shadow in &mutation.reinstate {
            bag.archived.remove(shadow.club_id());
            reactivate_live(bag, shadow.club_id());
        }
        debug!(
            owner_id = %mutation.owner_id,
            retired = mutation.retire.len(),
            inserted = mutation.insert.len(),
            reinstated = mutation.reinstate.len(),
            "applied bag mutation"
        );
        Ok(())
    }

    async fn rollback_mutation(
        &self,
        mutation: &BagMutation,
    ) -> Result<(), ClubInventoryRepositoryError> {
        let mut document = self.document.write().await;
        let bag = document.owner_mut(&mutation.owner_id);
        ensure_present(bag, &mutation.retire)?;
        ensure_present(bag, &mutation.reinstate)?;

        for shadow in &mutation.retire {
            bag.archived.remove(shadow.club_id());
            bag.clubs.insert(shadow.club_id().clone(), shadow.club.clone());
        }
        for club in &mutation.insert {
            bag.clubs.remove(&club.id);
        }
        for shadow in &mutation.reinstate {
            bag.archived.insert(shadow.club_id().clone(), shadow.clone());
            archive_live(bag, shadow.club_id(), shadow.archived_at);
        }
        debug!(owner_id = %mutation.owner_id, "rolled back bag mutation");
        Ok(())
    }
}

#[async_trait]
impl ChangeLedgerRepository for InMemoryBagStore {
    async fn record_change(
        &self,
        record: &ChangeRecord,
        archived: &[ClubId],
    ) -> Result<(), ChangeLedgerRepositoryError> {
        let mut document = self.document.write().await;
        let bag = document.owner_mut(&record.owner_id);
        if let Some(missing) = archived.iter().find(|id| !bag.archived.contains_key(*id)) {
            return Err(ChangeLedgerRepositoryError::query(format!(
                "archive shadow for club {missing} not found"
            )));
        }
        if bag.changes.contains_key(&record.id) {
            return Err(ChangeLedgerRepositoryError::query(format!(
                "change {} already recorded",
                record.id
            )));
        }

        for club_id in archived {
            if let Some(shadow) = bag.archived.get_mut(club_id) {
                shadow.change_id = Some(record.id.clone());
            }
        }
        bag.changes.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_change(
        &self,
        owner_id: &OwnerId,
        change_id: &ChangeId,
    ) -> Result<Option<ChangeRecord>, ChangeLedgerRepositoryError> {
        let document = self.document.read().await;
        Ok(document
            .owner(owner_id)
            .and_then(|bag| bag.changes.get(change_id))
            .cloned())
    }

    async fn list_changes(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<ChangeRecord>, ChangeLedgerRepositoryError> {
        let document = self.document.read().await;
        let mut changes: Vec<ChangeRecord> = document
            .owner(owner_id)
            .map(|bag| bag.changes.values().cloned().collect())
            .unwrap_or_default();
        changes.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(changes)
    }

    async fn find_archived(
        &self,
        owner_id: &OwnerId,
        club_id: &ClubId,
    ) -> Result<Option<ArchivedClub>, ChangeLedgerRepositoryError> {
        let document = self.document.read().await;
        Ok(document
            .owner(owner_id)
            .and_then(|bag| bag.archived.get(club_id))
            .cloned())
    }

    async fn mark_undone(
        &self,
        owner_id: &OwnerId,
        change_id: &ChangeId,
        at: DateTime<Utc>,
    ) -> Result<ChangeRecord, ChangeLedgerRepositoryError> {
        let mut document = self.document.write().await;
        let record = document
            .owner_mut(owner_id)
            .changes
            .get_mut(change_id)
            .ok_or_else(|| ChangeLedgerRepositoryError::missing_change(change_id.clone()))?;
        if record.undone || !record.can_undo {
            return Err(ChangeLedgerRepositoryError::already_undone(change_id.clone()));
        }
        *record = record.consumed(at);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Atomicity and rollback coverage for the in-memory store.
    use super::*;
    use crate::domain::{ClubSummary, Grade, GradeImpact, ReplacementMode, SessionId};
    use chrono::Duration;
    use rstest::{fixture, rstest};

    struct Seeded {
        store: InMemoryBagStore,
        owner: OwnerId,
        seven: Club,
        eight: Club,
    }

    #[fixture]
    fn seeded() -> Seeded {
        let owner = OwnerId::random();
        let seven = Club::builder(owner.clone(), "7-iron").build();
        let eight = Club::builder(owner.clone(), "8-iron").build();
        let mut document = BagDocument::default();
        let bag = document.owner_mut(&owner);
        bag.clubs.insert(seven.id.clone(), seven.clone());
        bag.clubs.insert(eight.id.clone(), eight.clone());
        Seeded {
            store: InMemoryBagStore::from_document(document),
            owner,
            seven,
            eight,
        }
    }

    fn record_for(owner: &OwnerId, removed: &[&Club]) -> ChangeRecord {
        let now = Utc::now();
        let grade = Grade {
            overall_score: 80.0,
            letter_grade: "B".to_owned(),
            component_scores: Default::default(),
        };
        ChangeRecord {
            id: ChangeId::random(),
            owner_id: owner.clone(),
            created_at: now,
            kind: ReplacementMode::Single,
            session_id: SessionId::random(),
            clubs_added: Vec::new(),
            clubs_removed: removed.iter().map(|club| club.summary()).collect::<Vec<ClubSummary>>(),
            impact: GradeImpact::new(grade.clone(), grade),
            undo_expires_at: now + Duration::days(7),
            can_undo: true,
            undone: false,
            undone_at: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn apply_then_rollback_restores_document(seeded: Seeded) {
        let before = seeded.store.snapshot().await;
        let now = Utc::now();
        let replacement = Club::builder(seeded.owner.clone(), "7-iron").build();
        let mut mutation = BagMutation::new(seeded.owner.clone());
        mutation.retire.push(ArchivedClub::replaced(
            &seeded.seven,
            Some(replacement.id.clone()),
            now,
        ));
        mutation.insert.push(replacement.clone());

        seeded.store.apply_mutation(&mutation).await.expect("apply");
        let active = seeded.store.active_ids(&seeded.owner).await;
        assert!(active.contains(&replacement.id));
        assert!(!active.contains(&seeded.seven.id));
        let shadow = seeded
            .store
            .find_archived(&seeded.owner, &seeded.seven.id)
            .await
            .expect("lookup")
            .expect("shadow written");
        assert_eq!(shadow.replaced_by, Some(replacement.id.clone()));

        seeded.store.rollback_mutation(&mutation).await.expect("rollback");
        assert_eq!(seeded.store.snapshot().await, before);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_mutation_writes_nothing(seeded: Seeded) {
        let before = seeded.store.snapshot().await;
        let stranger = Club::builder(seeded.owner.clone(), "9-iron").build();
        let mut mutation = BagMutation::new(seeded.owner.clone());
        mutation
            .retire
            .push(ArchivedClub::replaced(&seeded.eight, None, Utc::now()));
        mutation
            .retire
            .push(ArchivedClub::replaced(&stranger, None, Utc::now()));

        let error = seeded
            .store
            .apply_mutation(&mutation)
            .await
            .expect_err("missing club");
        assert_eq!(
            error,
            ClubInventoryRepositoryError::missing_club(stranger.id.clone())
        );
        assert_eq!(seeded.store.snapshot().await, before);
    }

    #[rstest]
    #[tokio::test]
    async fn record_change_backfills_shadows(seeded: Seeded) {
        let mut mutation = BagMutation::new(seeded.owner.clone());
        mutation
            .retire
            .push(ArchivedClub::replaced(&seeded.eight, None, Utc::now()));
        seeded.store.apply_mutation(&mutation).await.expect("apply");

        let record = record_for(&seeded.owner, &[&seeded.eight]);
        seeded
            .store
            .record_change(&record, &mutation.retired_ids())
            .await
            .expect("record");

        let shadow = seeded
            .store
            .find_archived(&seeded.owner, &seeded.eight.id)
            .await
            .expect("lookup")
            .expect("shadow");
        assert_eq!(shadow.change_id, Some(record.id.clone()));
    }

    #[rstest]
    #[tokio::test]
    async fn record_change_rejects_unknown_shadow(seeded: Seeded) {
        let record = record_for(&seeded.owner, &[&seeded.seven]);
        let error = seeded
            .store
            .record_change(&record, std::slice::from_ref(&seeded.seven.id))
            .await
            .expect_err("no shadow");
        assert!(matches!(error, ChangeLedgerRepositoryError::Query { .. }));
        assert!(
            seeded
                .store
                .find_change(&seeded.owner, &record.id)
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn mark_undone_is_single_shot(seeded: Seeded) {
        let record = record_for(&seeded.owner, &[]);
        seeded.store.record_change(&record, &[]).await.expect("record");
        let now = Utc::now();

        let consumed = seeded
            .store
            .mark_undone(&seeded.owner, &record.id, now)
            .await
            .expect("first undo");
        assert!(consumed.undone);
        assert_eq!(consumed.undone_at, Some(now));

        let error = seeded
            .store
            .mark_undone(&seeded.owner, &record.id, now)
            .await
            .expect_err("second undo");
        assert_eq!(
            error,
            ChangeLedgerRepositoryError::already_undone(record.id.clone())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn changes_list_newest_first(seeded: Seeded) {
        let older = {
            let mut record = record_for(&seeded.owner, &[]);
            record.created_at -= Duration::hours(2);
            record
        };
        let newer = record_for(&seeded.owner, &[]);
        seeded.store.record_change(&older, &[]).await.expect("older");
        seeded.store.record_change(&newer, &[]).await.expect("newer");

        let ids: Vec<ChangeId> = seeded
            .store
            .list_changes(&seeded.owner)
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
