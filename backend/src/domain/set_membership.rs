//! Matched-set membership.
//!
//! Resolves which live clubs a set replacement retires and synthesises the
//! specifications of the new set members. All lookup tables are immutable.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::classifier::{ClubCategory, ClubType, WedgeRole, iron_name};
use super::club::{Club, ClubSpecs, ShaftSpec};
use super::error::Error;
use super::ids::{ClubId, OwnerId, SessionId};

/// Kind of matched set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    /// Numbered irons, optionally through the pitching wedge.
    Irons,
    /// Wedges.
    Wedges,
    /// Fairway woods.
    Woods,
}

impl SetType {
    fn category(self) -> ClubCategory {
        match self {
            Self::Irons => ClubCategory::Iron,
            Self::Wedges => ClubCategory::Wedge,
            Self::Woods => ClubCategory::Wood,
        }
    }
}

/// Caller's declaration of the new set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSpec {
    /// Kind of set.
    pub set_type: SetType,
    /// First club of an iron range, e.g. `5-iron`.
    #[serde(default)]
    pub start_club: Option<String>,
    /// Last club of an iron range, e.g. `PW`.
    #[serde(default)]
    pub end_club: Option<String>,
    /// Head manufacturer of the new set.
    pub brand: String,
    /// Head model of the new set.
    pub model: String,
    /// Model year of the new set.
    #[serde(default)]
    pub year: Option<i32>,
    /// Shaft attributes overriding every other source.
    #[serde(default)]
    pub shaft: ShaftSpec,
}

impl SetSpec {
    /// Inclusive iron rank range declared by an irons set.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` when either bound is missing or is not an
    /// iron (or the pitching wedge), or when the range is reversed.
    pub fn iron_range(&self) -> Result<RangeInclusive<u8>, Error> {
        let start = parse_bound(self.start_club.as_deref(), "startClub")?;
        let end = parse_bound(self.end_club.as_deref(), "endClub")?;
        if start > end {
            return Err(
                Error::invalid_request("startClub must not come after endClub").with_details(
                    json!({ "field": "startClub", "code": "reversed_range" }),
                ),
            );
        }
        Ok(start..=end)
    }
}

fn parse_bound(raw: Option<&str>, field: &str) -> Result<u8, Error> {
    let raw = raw
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            Error::invalid_request(format!("missing required field: {field}"))
                .with_details(json!({ "field": field, "code": "missing_field" }))
        })?;
    ClubType::parse(raw).iron_rank().ok_or_else(|| {
        Error::invalid_request(format!("{field} must name an iron or the pitching wedge"))
            .with_details(json!({ "field": field, "value": raw, "code": "invalid_club" }))
    })
}

/// Active clubs a set replacement retires, duplicates included.
///
/// The winning club never retires itself, even when it already sits in the
/// bag inside the declared range.
///
/// # Errors
///
/// Propagates iron range validation failures.
pub fn resolve_removals(
    spec: &SetSpec,
    active: &[Club],
    winning_club_id: &ClubId,
) -> Result<Vec<Club>, Error> {
    let active: Vec<&Club> = active
        .iter()
        .filter(|club| &club.id != winning_club_id)
        .collect();
    let removals = match spec.set_type {
        SetType::Irons => {
            let range = spec.iron_range()?;
            active
                .iter()
                .filter(|club| club.iron_rank().is_some_and(|rank| range.contains(&rank)))
                .map(|&club| club.clone())
                .collect()
        }
        SetType::Wedges | SetType::Woods => {
            let category = spec.set_type.category();
            active
                .iter()
                .filter(|club| club.category() == category)
                .map(|&club| club.clone())
                .collect()
        }
    };
    Ok(removals)
}

/// Require the losing club to be part of the resolved set.
///
/// # Errors
///
/// Returns `invalid_request` when it is not.
pub fn ensure_losing_member(removals: &[Club], losing_club_id: &ClubId) -> Result<(), Error> {
    if removals.iter().any(|club| &club.id == losing_club_id) {
        return Ok(());
    }
    Err(
        Error::invalid_request(format!("losing club {losing_club_id} is not part of the set"))
            .with_details(json!({
                "field": "losingClubId",
                "value": losing_club_id,
                "code": "not_in_set",
            })),
    )
}

struct IronRow {
    rank: u8,
    loft: f64,
    lie: f64,
    length: f64,
    shaft_weight: f64,
}

const IRON_SPECS: [IronRow; 7] = [
    IronRow { rank: 4, loft: 21.0, lie: 61.0, length: 38.5, shaft_weight: 115.0 },
    IronRow { rank: 5, loft: 24.0, lie: 61.5, length: 38.0, shaft_weight: 117.0 },
    IronRow { rank: 6, loft: 27.0, lie: 62.0, length: 37.5, shaft_weight: 119.0 },
    IronRow { rank: 7, loft: 31.0, lie: 62.5, length: 37.0, shaft_weight: 121.0 },
    IronRow { rank: 8, loft: 35.0, lie: 63.0, length: 36.5, shaft_weight: 123.0 },
    IronRow { rank: 9, loft: 39.0, lie: 63.5, length: 36.0, shaft_weight: 125.0 },
    IronRow { rank: 10, loft: 44.0, lie: 64.0, length: 35.75, shaft_weight: 127.0 },
];

const FALLBACK_IRON_RANK: u8 = 7;

fn iron_row(rank: u8) -> Option<&'static IronRow> {
    IRON_SPECS
        .iter()
        .find(|row| row.rank == rank)
        .or_else(|| IRON_SPECS.iter().find(|row| row.rank == FALLBACK_IRON_RANK))
}

const WEDGE_SPECS: [(WedgeRole, f64); 4] = [
    (WedgeRole::Pitching, 46.0),
    (WedgeRole::Gap, 50.0),
    (WedgeRole::Sand, 56.0),
    (WedgeRole::Lob, 60.0),
];
const WEDGE_LIE: f64 = 64.0;
const WEDGE_LENGTH: f64 = 35.25;

const WOOD_LOFTS: [(u8, f64); 4] = [(3, 15.0), (5, 18.0), (7, 21.0), (9, 24.0)];

const STOCK_SHAFT_WEIGHT: f64 = 120.0;
const STOCK_FLEX: &str = "Regular";
const STOCK_KICKPOINT: &str = "Mid";
const STOCK_TORQUE: f64 = 2.5;
const STOCK_MODEL: &str = "Stock";

/// Where and when new members are placed.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Owner receiving the clubs.
    pub owner_id: OwnerId,
    /// Session tag for the new clubs.
    pub session_id: SessionId,
    /// Insertion time.
    pub at: DateTime<Utc>,
}

/// Synthesise the new members of a set.
///
/// Irons cover the declared rank range, wedges the fixed four-wedge table
/// and woods one member per distinct wood number being retired. Shaft
/// attributes resolve per field: explicit override, then the iron table
/// weight, then the winning club, then the set brand (shaft brand only),
/// then stock values.
///
/// # Errors
///
/// Propagates iron range validation failures.
pub fn generate_members(
    spec: &SetSpec,
    template: &Club,
    removals: &[Club],
    placement: &Placement,
) -> Result<Vec<Club>, Error> {
    let members: Vec<(String, ClubSpecs)> = match spec.set_type {
        SetType::Irons => spec
            .iron_range()?
            .map(|rank| {
                let row = iron_row(rank);
                let specs = ClubSpecs {
                    loft: row.map(|row| row.loft).or(template.specs.loft),
                    lie: row.map(|row| row.lie).or(template.specs.lie),
                    length: row.map(|row| row.length).or(template.specs.length),
                    shaft: resolve_shaft(spec, template, row.map(|row| row.shaft_weight)),
                };
                (iron_name(rank), specs)
            })
            .collect(),
        SetType::Wedges => WEDGE_SPECS
            .iter()
            .map(|(role, loft)| {
                let specs = ClubSpecs {
                    loft: Some(*loft),
                    lie: Some(WEDGE_LIE),
                    length: Some(WEDGE_LENGTH),
                    shaft: resolve_shaft(spec, template, None),
                };
                (role.canonical_name().to_owned(), specs)
            })
            .collect(),
        SetType::Woods => retired_wood_numbers(removals)
            .into_iter()
            .map(|number| {
                let loft = WOOD_LOFTS
                    .iter()
                    .find(|(wood, _)| *wood == number)
                    .map(|(_, loft)| *loft)
                    .or(template.specs.loft);
                let specs = ClubSpecs {
                    loft,
                    lie: template.specs.lie,
                    length: template.specs.length,
                    shaft: resolve_shaft(spec, template, None),
                };
                (format!("{number}-wood"), specs)
            })
            .collect(),
    };

    Ok(members
        .into_iter()
        .map(|(club_type, specs)| member_club(spec, template, placement, club_type, specs))
        .collect())
}

fn retired_wood_numbers(removals: &[Club]) -> BTreeSet<u8> {
    removals
        .iter()
        .filter_map(|club| match club.parsed_type() {
            ClubType::Wood(number) => Some(number),
            _ => None,
        })
        .collect()
}

fn member_club(
    spec: &SetSpec,
    template: &Club,
    placement: &Placement,
    club_type: String,
    specs: ClubSpecs,
) -> Club {
    let brand = non_blank(&spec.brand).unwrap_or(template.brand.as_str());
    let model = non_blank(&spec.model).unwrap_or(template.model.as_str());
    let mut builder = Club::builder(placement.owner_id.clone(), club_type)
        .id(ClubId::random())
        .make(brand, model)
        .specs(specs)
        .session_id(placement.session_id.clone())
        .added_to_bag_at(placement.at);
    if let Some(year) = spec.year.or(template.year) {
        builder = builder.year(year);
    }
    builder.build()
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn resolve_shaft(spec: &SetSpec, template: &Club, table_weight: Option<f64>) -> ShaftSpec {
    let overrides = &spec.shaft;
    let fallback = &template.specs.shaft;
    let text = |over: &Option<String>, base: &Option<String>| {
        over.clone().or_else(|| base.clone())
    };

    ShaftSpec {
        weight: overrides
            .weight
            .or(table_weight)
            .or(fallback.weight)
            .or(Some(STOCK_SHAFT_WEIGHT)),
        flex: text(&overrides.flex, &fallback.flex).or_else(|| Some(STOCK_FLEX.to_owned())),
        kickpoint: text(&overrides.kickpoint, &fallback.kickpoint)
            .or_else(|| Some(STOCK_KICKPOINT.to_owned())),
        torque: overrides.torque.or(fallback.torque).or(Some(STOCK_TORQUE)),
        brand: text(&overrides.brand, &fallback.brand)
            .or_else(|| non_blank(&spec.brand).map(str::to_owned)),
        model: text(&overrides.model, &fallback.model).or_else(|| Some(STOCK_MODEL.to_owned())),
    }
}
