//! Bag change engine: club replacement, change ledger and time-bounded undo.
//!
//! The crate follows a hexagonal layout. [`domain`] holds entities, policy
//! tables, services and ports; [`outbound`] implements the driven ports;
//! [`inbound`] exposes the caller-facing operations.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
