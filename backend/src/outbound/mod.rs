//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: owner-keyed document store with JSON snapshot persistence
//! - **grading**: reqwest-backed client for the bag grading service
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod grading;
pub mod memory;
