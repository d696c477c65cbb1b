//! Caller identity carried into every operation.
//!
//! Authentication happens upstream; this type only records whether an owner
//! was established and refuses to proceed when one was not.

use crate::domain::{Error, OwnerId};

/// Identity of the caller issuing an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity(Option<OwnerId>);

impl CallerIdentity {
    /// Caller authenticated as `owner_id`.
    pub fn authenticated(owner_id: OwnerId) -> Self {
        Self(Some(owner_id))
    }

    /// Caller without an established identity.
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// Owner identifier, or `unauthorized` when none was established.
    pub fn require_owner(&self) -> Result<OwnerId, Error> {
        self.0
            .clone()
            .ok_or_else(|| Error::unauthorized("authentication required"))
    }
}

impl From<Option<OwnerId>> for CallerIdentity {
    fn from(value: Option<OwnerId>) -> Self {
        Self(value)
    }
}
