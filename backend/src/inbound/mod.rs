//! Inbound adapters that translate caller requests into domain service calls
//! while keeping identity handling at the edge.
//!
//! [`BagOperations`] is the transport-agnostic facade; a transport binds its
//! own authentication to a [`CallerIdentity`] and forwards payloads here.

mod caller;
pub mod exit;
mod operations;

pub use caller::CallerIdentity;
pub use operations::{ApplyReplacementBody, BagOperations, SuggestReplacementBody, UndoChangeBody};
