//! Tagged precondition failures for bag mutations and undos.
//!
//! Services evaluate preconditions into a [`PreconditionFailure`] and convert
//! it into a `failed_precondition` [`Error`] whose `details.reason` carries a
//! stable code, so callers can branch without parsing messages.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::error::Error;
use super::ids::ClubId;
use super::ledger::ChangeRecord;

/// Reasons a mutation or undo cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionFailure {
    /// A club marked as the owner's favourite would be removed.
    FavoriteClubProtected {
        /// The protected club.
        club_id: ClubId,
    },
    /// The losing club is already archived.
    ClubNotActive {
        /// The archived club.
        club_id: ClubId,
    },
    /// The ledger entry no longer permits undo.
    UndoUnavailable,
    /// The undo window has closed.
    UndoExpired {
        /// When the window closed.
        expires_at: DateTime<Utc>,
    },
    /// The entry has already been undone.
    AlreadyUndone {
        /// When it was undone, if recorded.
        undone_at: Option<DateTime<Utc>>,
    },
}

impl PreconditionFailure {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::FavoriteClubProtected { .. } => "favorite_club_protected",
            Self::ClubNotActive { .. } => "club_not_active",
            Self::UndoUnavailable => "undo_unavailable",
            Self::UndoExpired { .. } => "undo_expired",
            Self::AlreadyUndone { .. } => "already_undone",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::FavoriteClubProtected { club_id } => {
                format!("club {club_id} is marked as a favorite and cannot be replaced")
            }
            Self::ClubNotActive { club_id } => format!("club {club_id} is not in the bag"),
            Self::UndoUnavailable => "change can no longer be undone".to_owned(),
            Self::UndoExpired { expires_at } => {
                format!("undo window closed at {}", expires_at.to_rfc3339())
            }
            Self::AlreadyUndone { .. } => "change has already been undone".to_owned(),
        }
    }

    fn details(&self) -> Value {
        let reason = self.reason();
        match self {
            Self::FavoriteClubProtected { club_id } | Self::ClubNotActive { club_id } => {
                json!({ "reason": reason, "clubId": club_id })
            }
            Self::UndoUnavailable => json!({ "reason": reason }),
            Self::UndoExpired { expires_at } => {
                json!({ "reason": reason, "expiresAt": expires_at })
            }
            Self::AlreadyUndone { undone_at } => {
                json!({ "reason": reason, "undoneAt": undone_at })
            }
        }
    }
}

impl From<PreconditionFailure> for Error {
    fn from(failure: PreconditionFailure) -> Self {
        Self::failed_precondition(failure.message()).with_details(failure.details())
    }
}

/// Decide whether `record` may be undone at `now`.
///
/// Checks run in a fixed order: the `can_undo` flag (a consumed entry is
/// reported as already undone), then the expiry, then the `undone` flag.
pub fn evaluate_undo(record: &ChangeRecord, now: DateTime<Utc>) -> Result<(), PreconditionFailure> {
    if !record.can_undo {
        return Err(if record.undone {
            PreconditionFailure::AlreadyUndone {
                undone_at: record.undone_at,
            }
        } else {
            PreconditionFailure::UndoUnavailable
        });
    }
    if now >= record.undo_expires_at {
        return Err(PreconditionFailure::UndoExpired {
            expires_at: record.undo_expires_at,
        });
    }
    if record.undone {
        return Err(PreconditionFailure::AlreadyUndone {
            undone_at: record.undone_at,
        });
    }
    Ok(())
}
