//! Archive shadows and change ledger entries.
//!
//! An [`ArchivedClub`] exists exactly while a club is retired by the change
//! engine. A [`ChangeRecord`] captures one replacement event and is mutated
//! at most once, when it is undone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::club::{Club, ClubSummary};
use super::grade::GradeImpact;
use super::ids::{ChangeId, ClubId, OwnerId, SessionId};

/// Why a club was archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    /// Lost a head-to-head test and was replaced.
    ReplacedInTesting,
    /// Added by a change that was later undone.
    UndoneChange,
}

/// How long a club was in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenure {
    /// Whole days between entering the bag and archival.
    pub days: i64,
    /// Human-readable label, e.g. `3 months`.
    pub label: String,
}

impl Tenure {
    /// Tenure between two instants; negative spans clamp to zero.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use fitting_backend::domain::Tenure;
    ///
    /// let now = Utc::now();
    /// let tenure = Tenure::between(now - Duration::days(45), now);
    /// assert_eq!(tenure.days, 45);
    /// assert_eq!(tenure.label, "1 month");
    /// ```
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let days = (end - start).num_days().max(0);
        Self {
            days,
            label: tenure_label(days),
        }
    }
}

fn tenure_label(days: i64) -> String {
    fn plural(count: i64, unit: &str) -> String {
        if count == 1 {
            format!("1 {unit}")
        } else {
            format!("{count} {unit}s")
        }
    }

    match days {
        0 => "less than a day".to_owned(),
        1..=29 => plural(days, "day"),
        30..=364 => plural(days / 30, "month"),
        _ => plural(days / 365, "year"),
    }
}

/// Shadow record of a retired club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedClub {
    /// Snapshot of the club as it was before archival.
    pub club: Club,
    /// When the club was archived.
    pub archived_at: DateTime<Utc>,
    /// Why it was archived.
    pub reason: ArchiveReason,
    /// Club that took its place, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<ClubId>,
    /// Ledger entry that archived it. Filled in once the entry is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<ChangeId>,
    /// Tenure in the bag.
    pub time_in_bag: Tenure,
    /// Whether the club may be restored by the caller.
    pub can_restore: bool,
}

impl ArchivedClub {
    /// Shadow for a club that lost a test to `replaced_by`.
    pub fn replaced(club: &Club, replaced_by: Option<ClubId>, at: DateTime<Utc>) -> Self {
        Self {
            club: club.clone(),
            archived_at: at,
            reason: ArchiveReason::ReplacedInTesting,
            replaced_by,
            change_id: None,
            time_in_bag: Tenure::between(club.added_to_bag_at, at),
            can_restore: true,
        }
    }

    /// Shadow for a club removed because its change was undone.
    pub fn undone(club: &Club, change_id: ChangeId, at: DateTime<Utc>) -> Self {
        Self {
            club: club.clone(),
            archived_at: at,
            reason: ArchiveReason::UndoneChange,
            replaced_by: None,
            change_id: Some(change_id),
            time_in_bag: Tenure::between(club.added_to_bag_at, at),
            can_restore: false,
        }
    }

    /// Identifier of the archived club.
    pub fn club_id(&self) -> &ClubId {
        &self.club.id
    }
}

/// Replacement mode, also recorded as the change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementMode {
    /// Replace one club with one club.
    Single,
    /// Replace a matched set.
    Set,
}

/// One replacement event in the owner's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Ledger entry identifier.
    pub id: ChangeId,
    /// Owning golfer.
    pub owner_id: OwnerId,
    /// When the change was committed.
    pub created_at: DateTime<Utc>,
    /// Single or set replacement.
    pub kind: ReplacementMode,
    /// Originating testing session.
    pub session_id: SessionId,
    /// Clubs inserted, in insertion order.
    pub clubs_added: Vec<ClubSummary>,
    /// Clubs retired, in retirement order.
    pub clubs_removed: Vec<ClubSummary>,
    /// Grades either side of the change.
    pub impact: GradeImpact,
    /// End of the undo window.
    pub undo_expires_at: DateTime<Utc>,
    /// Cleared once the entry is consumed.
    pub can_undo: bool,
    /// Set once the entry is consumed.
    pub undone: bool,
    /// When the entry was consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undone_at: Option<DateTime<Utc>>,
}

impl ChangeRecord {
    /// Whether this entry replaced a matched set.
    pub fn is_set_replacement(&self) -> bool {
        self.kind == ReplacementMode::Set
    }

    /// Whether an undo would currently be accepted.
    pub fn actionable(&self, now: DateTime<Utc>) -> bool {
        self.can_undo && !self.undone && now < self.undo_expires_at
    }

    /// Copy of this entry marked consumed at `at`.
    pub fn consumed(&self, at: DateTime<Utc>) -> Self {
        Self {
            can_undo: false,
            undone: true,
            undone_at: Some(at),
            ..self.clone()
        }
    }

    /// Identifiers of the clubs this entry added.
    pub fn added_ids(&self) -> impl Iterator<Item = &ClubId> {
        self.clubs_added.iter().map(|summary| &summary.club_id)
    }

    /// Identifiers of the clubs this entry removed.
    pub fn removed_ids(&self) -> impl Iterator<Item = &ClubId> {
        self.clubs_removed.iter().map(|summary| &summary.club_id)
    }
}

/// Default undo window in days.
pub const DEFAULT_UNDO_WINDOW_DAYS: i64 = 7;

#[cfg(test)]
mod tests {
    //! Tenure and ledger helper coverage.
    use super::*;
    use crate::domain::Grade;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(0, "less than a day")]
    #[case(1, "1 day")]
    #[case(12, "12 days")]
    #[case(30, "1 month")]
    #[case(200, "6 months")]
    #[case(365, "1 year")]
    #[case(1_000, "2 years")]
    fn tenure_labels(#[case] days: i64, #[case] expected: &str) {
        let end = Utc::now();
        let tenure = Tenure::between(end - Duration::days(days), end);
        assert_eq!(tenure.days, days);
        assert_eq!(tenure.label, expected);
    }

    #[rstest]
    fn tenure_clamps_negative_spans() {
        let now = Utc::now();
        assert_eq!(Tenure::between(now + Duration::days(3), now).days, 0);
    }

    fn record(now: DateTime<Utc>) -> ChangeRecord {
        let grade = Grade {
            overall_score: 50.0,
            letter_grade: "D".to_owned(),
            component_scores: Default::default(),
        };
        ChangeRecord {
            id: ChangeId::random(),
            owner_id: OwnerId::random(),
            created_at: now,
            kind: ReplacementMode::Single,
            session_id: SessionId::random(),
            clubs_added: Vec::new(),
            clubs_removed: Vec::new(),
            impact: GradeImpact::new(grade.clone(), grade),
            undo_expires_at: now + Duration::days(DEFAULT_UNDO_WINDOW_DAYS),
            can_undo: true,
            undone: false,
            undone_at: None,
        }
    }

    #[rstest]
    fn actionable_until_expiry() {
        let now = Utc::now();
        let entry = record(now);
        assert!(entry.actionable(now));
        assert!(entry.actionable(entry.undo_expires_at - Duration::seconds(1)));
        assert!(!entry.actionable(entry.undo_expires_at));
    }

    #[rstest]
    fn consumed_entries_are_not_actionable() {
        let now = Utc::now();
        let consumed = record(now).consumed(now);
        assert!(consumed.undone);
        assert!(!consumed.can_undo);
        assert_eq!(consumed.undone_at, Some(now));
        assert!(!consumed.actionable(now));
    }
}
