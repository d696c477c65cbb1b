//! Club inventory entity.
//!
//! A [`Club`] is one physical item in a golfer's bag. Clubs are never
//! hard-deleted by the change engine: retirement flips the status to
//! [`ClubStatus::Archived`] and an undo flips it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::{ClubCategory, ClubType};
use super::ids::{ClubId, OwnerId, SessionId};

/// Lifecycle status of a club document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClubStatus {
    /// In the bag.
    Active,
    /// Retired by a replacement or an undo.
    Archived,
}

/// Shaft specification. Every attribute is optional because imported
/// inventory is frequently incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaftSpec {
    /// Shaft weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Flex label, e.g. `Stiff`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<String>,
    /// Kickpoint label, e.g. `Mid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kickpoint: Option<String>,
    /// Torque in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<f64>,
    /// Shaft manufacturer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Shaft model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Physical head and shaft specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSpecs {
    /// Loft in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loft: Option<f64>,
    /// Lie angle in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lie: Option<f64>,
    /// Length in inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Shaft attributes.
    #[serde(default)]
    pub shaft: ShaftSpec,
}

/// A single club in an owner's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Club document identifier.
    pub id: ClubId,
    /// Owning golfer.
    pub owner_id: OwnerId,
    /// Free-text type token, e.g. `7-iron`.
    pub club_type: String,
    /// Head manufacturer.
    pub brand: String,
    /// Head model.
    pub model: String,
    /// Model year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Physical specification.
    #[serde(default)]
    pub specs: ClubSpecs,
    /// Lifecycle status.
    pub status: ClubStatus,
    /// Testing session that put this club in the bag, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// When the club entered the bag.
    pub added_to_bag_at: DateTime<Utc>,
    /// Document creation time.
    pub created_at: DateTime<Utc>,
    /// Archival time while archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Club {
    /// Start building an active club for `owner_id`.
    pub fn builder(owner_id: OwnerId, club_type: impl Into<String>) -> ClubBuilder {
        ClubBuilder::new(owner_id, club_type)
    }

    /// Parsed type of this club.
    pub fn parsed_type(&self) -> ClubType {
        ClubType::parse(&self.club_type)
    }

    /// Category of this club.
    pub fn category(&self) -> ClubCategory {
        self.parsed_type().category()
    }

    /// Iron rank for range arithmetic (pitching wedge = 10).
    pub fn iron_rank(&self) -> Option<u8> {
        self.parsed_type().iron_rank()
    }

    /// Canonical type name, falling back to the raw token.
    pub fn canonical_type(&self) -> String {
        self.parsed_type()
            .canonical_name()
            .unwrap_or_else(|| self.club_type.clone())
    }

    /// Whether the club is currently in the bag.
    pub fn is_active(&self) -> bool {
        self.status == ClubStatus::Active
    }

    /// Copy of this club marked archived at `at`.
    pub fn archived(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: ClubStatus::Archived,
            archived_at: Some(at),
            ..self.clone()
        }
    }

    /// Copy of this club placed into the bag as a new document.
    ///
    /// The copy gets a fresh identifier, is tagged with the testing
    /// session, and starts its tenure at `now`.
    pub fn clone_into_bag(&self, id: ClubId, session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ClubStatus::Active,
            session_id: Some(session_id),
            added_to_bag_at: now,
            created_at: now,
            archived_at: None,
            ..self.clone()
        }
    }

    /// Ledger summary of this club.
    pub fn summary(&self) -> ClubSummary {
        ClubSummary {
            club_id: self.id.clone(),
            club_type: self.club_type.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
        }
    }
}

/// Compact club description stored on ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummary {
    /// Club document identifier.
    pub club_id: ClubId,
    /// Type token.
    pub club_type: String,
    /// Head manufacturer.
    pub brand: String,
    /// Head model.
    pub model: String,
    /// Model year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Builder for constructing [`Club`] incrementally.
#[derive(Debug, Clone)]
pub struct ClubBuilder {
    id: Option<ClubId>,
    owner_id: OwnerId,
    club_type: String,
    brand: String,
    model: String,
    year: Option<i32>,
    specs: ClubSpecs,
    session_id: Option<SessionId>,
    added_to_bag_at: Option<DateTime<Utc>>,
}

impl ClubBuilder {
    /// Create a builder with the required fields.
    pub fn new(owner_id: OwnerId, club_type: impl Into<String>) -> Self {
        Self {
            id: None,
            owner_id,
            club_type: club_type.into(),
            brand: String::new(),
            model: String::new(),
            year: None,
            specs: ClubSpecs::default(),
            session_id: None,
            added_to_bag_at: None,
        }
    }

    /// Use an explicit identifier instead of a random one.
    pub fn id(mut self, id: ClubId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set brand and model.
    pub fn make(mut self, brand: impl Into<String>, model: impl Into<String>) -> Self {
        self.brand = brand.into();
        self.model = model.into();
        self
    }

    /// Set the model year.
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the physical specification.
    pub fn specs(mut self, specs: ClubSpecs) -> Self {
        self.specs = specs;
        self
    }

    /// Tag the club with its originating session.
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Set when the club entered the bag.
    pub fn added_to_bag_at(mut self, at: DateTime<Utc>) -> Self {
        self.added_to_bag_at = Some(at);
        self
    }

    /// Build the active club.
    pub fn build(self) -> Club {
        let added_to_bag_at = self.added_to_bag_at.unwrap_or_else(Utc::now);
        Club {
            id: self.id.unwrap_or_else(ClubId::random),
            owner_id: self.owner_id,
            club_type: self.club_type,
            brand: self.brand,
            model: self.model,
            year: self.year,
            specs: self.specs,
            status: ClubStatus::Active,
            session_id: self.session_id,
            added_to_bag_at,
            created_at: added_to_bag_at,
            archived_at: None,
        }
    }
}
