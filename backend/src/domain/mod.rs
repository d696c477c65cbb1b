//! Domain primitives, policies and services.
//!
//! Purpose: model a golfer's bag and the replacement/undo lifecycle
//! independently of transport and storage. Pure policy lives in
//! `classifier`, `strategy_policy` and `set_membership`; orchestration lives
//! in the services, which depend only on the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) - error payload with a stable code.
//! - Club, ArchivedClub, ChangeRecord - inventory and ledger documents.
//! - ReplacementAdvisorService, BagMutationService, UndoService - driving
//!   port implementations.

pub mod ports;

mod bag_mutation_service;
mod bag_service_support;
mod classifier;
mod club;
pub mod error;
mod grade;
mod ids;
mod ledger;
mod owner_locks;
mod preconditions;
mod replacement_advisor;
mod set_membership;
mod strategy_policy;
mod undo_service;

pub use self::bag_mutation_service::BagMutationService;
pub use self::bag_service_support::BagPorts;
pub use self::classifier::{
    ClubCategory, ClubType, PITCHING_WEDGE_RANK, WedgeRole, classify, iron_name, iron_rank,
    iron_rank_label, normalize as normalize_club_type,
};
pub use self::club::{Club, ClubBuilder, ClubSpecs, ClubStatus, ClubSummary, ShaftSpec};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::grade::{
    Grade, GradeImpact, ImpactCategory, ImpactTable, ScoreChange, impact_between,
};
pub use self::ids::{ChangeId, ClubId, IdValidationError, OwnerId, SessionId};
pub use self::ledger::{
    ArchiveReason, ArchivedClub, ChangeRecord, DEFAULT_UNDO_WINDOW_DAYS, ReplacementMode, Tenure,
};
pub use self::owner_locks::OwnerLocks;
pub use self::preconditions::{PreconditionFailure, evaluate_undo};
pub use self::replacement_advisor::{ReplacementAdvisorService, summarise_category};
pub use self::set_membership::{
    Placement, SetSpec, SetType, ensure_losing_member, generate_members, resolve_removals,
};
pub use self::strategy_policy::{
    Confidence, DefaultSetRange, Recommendation, SetOptions, StrategyPolicy, default_set_range,
    policy_for,
};
pub use self::undo_service::UndoService;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use fitting_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("no such change"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
