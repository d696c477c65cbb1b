//! Behavioural coverage for the undo engine and change history.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockBagGrader, MockChangeLedgerRepository, MockClubInventoryRepository};
use crate::domain::{
    ArchiveReason, ChangeId, Club, ErrorCode, Grade, GradeImpact, OwnerId,
    ReplacementMode, SessionId,
};
use crate::test_support::clock::MutableClock;

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn grade(score: f64) -> Grade {
    Grade {
        overall_score: score,
        letter_grade: "C".to_owned(),
        component_scores: BTreeMap::new(),
    }
}

struct Change {
    owner: OwnerId,
    removed: Club,
    added: Club,
    record: ChangeRecord,
}

#[fixture]
fn change() -> Change {
    let owner = OwnerId::random();
    let created = fixture_timestamp();
    let removed = Club::builder(owner.clone(), "7-iron")
        .make("Ping", "i210")
        .added_to_bag_at(created - Duration::days(500))
        .build()
        .archived(created);
    let added = Club::builder(owner.clone(), "7-iron")
        .make("Titleist", "T200")
        .added_to_bag_at(created)
        .build();
    let record = ChangeRecord {
        id: ChangeId::random(),
        owner_id: owner.clone(),
        created_at: created,
        kind: ReplacementMode::Single,
        session_id: SessionId::random(),
        clubs_added: vec![added.summary()],
        clubs_removed: vec![removed.summary()],
        impact: GradeImpact::new(grade(70.0), grade(76.0)),
        undo_expires_at: created + Duration::days(7),
        can_undo: true,
        undone: false,
        undone_at: None,
    };
    Change {
        owner,
        removed,
        added,
        record,
    }
}

impl Change {
    fn request(&self) -> UndoChangeRequest {
        UndoChangeRequest {
            owner_id: self.owner.clone(),
            change_id: self.record.id.clone(),
        }
    }

    fn inventory(&self) -> MockClubInventoryRepository {
        let clubs = vec![self.removed.clone(), self.added.clone()];
        let mut inventory = MockClubInventoryRepository::new();
        inventory
            .expect_find_club()
            .returning(move |_, club_id| {
                Ok(clubs.iter().find(|club| &club.id == club_id).cloned())
            });
        inventory
    }

    fn ledger(&self, record: ChangeRecord) -> MockChangeLedgerRepository {
        let shadow = ArchivedClub::replaced(
            &self.removed,
            Some(self.added.id.clone()),
            self.record.created_at,
        );
        let mut ledger = MockChangeLedgerRepository::new();
        ledger
            .expect_find_change()
            .returning(move |_, _| Ok(Some(record.clone())));
        ledger
            .expect_find_archived()
            .returning(move |_, _| Ok(Some(shadow.clone())));
        ledger
    }
}

type TestService =
    UndoService<MockClubInventoryRepository, MockChangeLedgerRepository, MockBagGrader>;

fn make_service(
    inventory: MockClubInventoryRepository,
    ledger: MockChangeLedgerRepository,
    grader: MockBagGrader,
    now: DateTime<Utc>,
) -> TestService {
    UndoService::new(
        BagPorts::new(Arc::new(inventory), Arc::new(ledger), Arc::new(grader)),
        Arc::new(MutableClock::new(now)),
        Arc::new(OwnerLocks::new()),
    )
}

fn grader_returning(score: f64) -> MockBagGrader {
    let mut grader = MockBagGrader::new();
    grader
        .expect_grade()
        .times(1)
        .returning(move |_| Ok(grade(score)));
    grader
}

fn silent_grader() -> MockBagGrader {
    let mut grader = MockBagGrader::new();
    grader.expect_grade().times(0);
    grader
}

fn expect_no_writes(
    inventory: &mut MockClubInventoryRepository,
    ledger: &mut MockChangeLedgerRepository,
) {
    inventory.expect_apply_mutation().times(0);
    inventory.expect_rollback_mutation().times(0);
    ledger.expect_mark_undone().times(0);
}

#[rstest]
#[tokio::test]
async fn undo_reverses_the_change(change: Change) {
    let now = fixture_timestamp() + Duration::days(2);
    let mut inventory = change.inventory();
    let removed_id = change.removed.id.clone();
    let added_id = change.added.id.clone();
    let change_id = change.record.id.clone();
    inventory
        .expect_apply_mutation()
        .times(1)
        .withf(move |mutation| {
            mutation.insert.is_empty()
                && mutation.reinstate.len() == 1
                && mutation.reinstate[0].club_id() == &removed_id
                && mutation.retire.len() == 1
                && mutation.retire[0].club_id() == &added_id
                && mutation.retire[0].reason == ArchiveReason::UndoneChange
                && !mutation.retire[0].can_restore
                && mutation.retire[0].change_id.as_ref() == Some(&change_id)
        })
        .returning(|_| Ok(()));
    inventory.expect_rollback_mutation().times(0);

    let mut ledger = change.ledger(change.record.clone());
    let consumed = change.record.consumed(now);
    ledger
        .expect_mark_undone()
        .times(1)
        .withf(move |_, _, at| *at == now)
        .return_once(move |_, _, _| Ok(consumed));

    let service = make_service(inventory, ledger, grader_returning(70.0), now);
    let response = service
        .undo_change(change.request())
        .await
        .expect("undo should succeed");

    assert_eq!(response.clubs_restored, 1);
    assert_eq!(response.clubs_archived, 1);
    assert_eq!(response.restored_grade.overall_score, 70.0);
}

#[rstest]
#[tokio::test]
async fn unknown_change_is_not_found(change: Change) {
    let mut inventory = MockClubInventoryRepository::new();
    inventory.expect_find_club().times(0);
    let mut ledger = MockChangeLedgerRepository::new();
    ledger.expect_find_change().returning(|_, _| Ok(None));
    expect_no_writes(&mut inventory, &mut ledger);

    let service = make_service(inventory, ledger, silent_grader(), fixture_timestamp());
    let error = service
        .undo_change(change.request())
        .await
        .expect_err("change is unknown");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::at_expiry(0)]
#[case::after_expiry(1)]
#[tokio::test]
async fn expired_change_is_rejected(change: Change, #[case] seconds_past: i64) {
    let now = change.record.undo_expires_at + Duration::seconds(seconds_past);
    let mut inventory = change.inventory();
    let mut ledger = change.ledger(change.record.clone());
    expect_no_writes(&mut inventory, &mut ledger);

    let service = make_service(inventory, ledger, silent_grader(), now);
    let error = service
        .undo_change(change.request())
        .await
        .expect_err("window has closed");

    assert_eq!(error.code(), ErrorCode::FailedPrecondition);
    assert_eq!(error.reason(), Some("undo_expired"));
}

#[rstest]
#[tokio::test]
async fn consumed_change_reports_already_undone(change: Change) {
    let consumed = change.record.consumed(fixture_timestamp() + Duration::hours(1));
    let mut inventory = change.inventory();
    let mut ledger = change.ledger(consumed);
    expect_no_writes(&mut inventory, &mut ledger);

    let service = make_service(
        inventory,
        ledger,
        silent_grader(),
        fixture_timestamp() + Duration::hours(2),
    );
    let error = service
        .undo_change(change.request())
        .await
        .expect_err("already undone");

    assert_eq!(error.code(), ErrorCode::FailedPrecondition);
    assert_eq!(error.reason(), Some("already_undone"));
}

#[rstest]
#[tokio::test]
async fn losing_the_ledger_race_rolls_back(change: Change) {
    let now = fixture_timestamp() + Duration::days(1);
    let mut inventory = change.inventory();
    inventory
        .expect_apply_mutation()
        .times(1)
        .returning(|_| Ok(()));
    inventory
        .expect_rollback_mutation()
        .times(1)
        .returning(|_| Ok(()));

    let mut ledger = change.ledger(change.record.clone());
    let change_id = change.record.id.clone();
    ledger
        .expect_mark_undone()
        .times(1)
        .return_once(move |_, _, _| Err(ChangeLedgerRepositoryError::already_undone(change_id)));

    let service = make_service(inventory, ledger, grader_returning(70.0), now);
    let error = service
        .undo_change(change.request())
        .await
        .expect_err("another undo won");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn missing_referenced_club_fails_before_writes(change: Change) {
    let clubs = vec![change.removed.clone()];
    let mut inventory = MockClubInventoryRepository::new();
    inventory
        .expect_find_club()
        .returning(move |_, club_id| Ok(clubs.iter().find(|club| &club.id == club_id).cloned()));
    let mut ledger = change.ledger(change.record.clone());
    expect_no_writes(&mut inventory, &mut ledger);

    let service = make_service(inventory, ledger, silent_grader(), fixture_timestamp());
    let error = service
        .undo_change(change.request())
        .await
        .expect_err("added club vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn clubs_already_in_target_state_are_skipped(change: Change) {
    let now = fixture_timestamp() + Duration::days(1);
    let mut reactivated = change.removed.clone();
    reactivated.status = crate::domain::ClubStatus::Active;
    reactivated.archived_at = None;
    let clubs = vec![reactivated, change.added.clone()];

    let mut inventory = MockClubInventoryRepository::new();
    inventory
        .expect_find_club()
        .returning(move |_, club_id| Ok(clubs.iter().find(|club| &club.id == club_id).cloned()));
    inventory
        .expect_apply_mutation()
        .times(1)
        .withf(|mutation| mutation.reinstate.is_empty() && mutation.retire.len() == 1)
        .returning(|_| Ok(()));

    let mut ledger = change.ledger(change.record.clone());
    let consumed = change.record.consumed(now);
    ledger
        .expect_mark_undone()
        .times(1)
        .return_once(move |_, _, _| Ok(consumed));

    let service = make_service(inventory, ledger, grader_returning(72.0), now);
    let response = service
        .undo_change(change.request())
        .await
        .expect("undo should succeed");

    assert_eq!(response.clubs_restored, 0);
    assert_eq!(response.clubs_archived, 1);
}

#[rstest]
#[tokio::test]
async fn history_lists_newest_first_with_actionable_flag(change: Change) {
    let now = fixture_timestamp() + Duration::days(3);
    let older = ChangeRecord {
        id: ChangeId::random(),
        created_at: fixture_timestamp() - Duration::days(10),
        undo_expires_at: fixture_timestamp() - Duration::days(3),
        ..change.record.clone()
    };
    let newer = change.record.clone();
    let records = vec![older.clone(), newer.clone()];

    let mut ledger = MockChangeLedgerRepository::new();
    ledger
        .expect_list_changes()
        .times(1)
        .return_once(move |_| Ok(records));

    let service = make_service(
        MockClubInventoryRepository::new(),
        ledger,
        silent_grader(),
        now,
    );
    let response = service
        .list_changes(ListChangesRequest {
            owner_id: change.owner.clone(),
        })
        .await
        .expect("history");

    let listed: Vec<(ChangeId, bool)> = response
        .changes
        .into_iter()
        .map(|entry| (entry.record.id, entry.actionable))
        .collect();
    assert_eq!(listed, vec![(newer.id, true), (older.id, false)]);
}
