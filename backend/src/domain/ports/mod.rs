//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`ClubInventoryRepository`, `ChangeLedgerRepository`,
//! `BagGrader`) are implemented by outbound adapters. Driving ports
//! (`ReplacementAdvisor`, `BagMutationCommand`, `ChangeUndoCommand`,
//! `ChangeHistoryQuery`) are implemented by domain services and consumed by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod bag_grader;
mod bag_mutation_command;
mod change_history_query;
mod change_ledger_repository;
mod change_undo_command;
mod club_inventory_repository;
mod replacement_advisor;

#[cfg(test)]
pub use bag_grader::MockBagGrader;
pub use bag_grader::{BagGrader, BagGraderError, FixtureBagGrader};
#[cfg(test)]
pub use bag_mutation_command::MockBagMutationCommand;
pub use bag_mutation_command::{
    ApplyReplacementRequest, ApplyReplacementResponse, BagMutationCommand,
};
#[cfg(test)]
pub use change_history_query::MockChangeHistoryQuery;
pub use change_history_query::{
    ChangeEntry, ChangeHistoryQuery, ListChangesRequest, ListChangesResponse,
};
#[cfg(test)]
pub use change_ledger_repository::MockChangeLedgerRepository;
pub use change_ledger_repository::{ChangeLedgerRepository, ChangeLedgerRepositoryError};
#[cfg(test)]
pub use change_undo_command::MockChangeUndoCommand;
pub use change_undo_command::{ChangeUndoCommand, UndoChangeRequest, UndoChangeResponse};
#[cfg(test)]
pub use club_inventory_repository::MockClubInventoryRepository;
pub use club_inventory_repository::{
    BagMutation, ClubInventoryRepository, ClubInventoryRepositoryError,
};
#[cfg(test)]
pub use replacement_advisor::MockReplacementAdvisor;
pub use replacement_advisor::{ReplacementAdvisor, SuggestReplacementRequest};
