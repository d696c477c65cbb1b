//! Serialisable bag document held by the in-memory store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ArchivedClub, ChangeId, ChangeRecord, Club, ClubId, OwnerId};

/// Every owner's inventory, archive shadows and ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagDocument {
    /// Per-owner collections.
    #[serde(default)]
    pub owners: BTreeMap<OwnerId, OwnerBag>,
}

/// One owner's collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBag {
    /// Club marked as the owner's favourite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_club_id: Option<ClubId>,
    /// Live club records, active and archived.
    #[serde(default)]
    pub clubs: BTreeMap<ClubId, Club>,
    /// Archive shadows keyed by the original club identifier.
    #[serde(default)]
    pub archived: BTreeMap<ClubId, ArchivedClub>,
    /// Ledger entries.
    #[serde(default)]
    pub changes: BTreeMap<ChangeId, ChangeRecord>,
}

impl BagDocument {
    /// Borrow an owner's collections, if any exist.
    pub fn owner(&self, owner_id: &OwnerId) -> Option<&OwnerBag> {
        self.owners.get(owner_id)
    }

    /// Mutable access to an owner's collections, creating them on demand.
    pub fn owner_mut(&mut self, owner_id: &OwnerId) -> &mut OwnerBag {
        self.owners.entry(owner_id.clone()).or_default()
    }
}
