//! Club category classification.
//!
//! Pure, stateless parsing of free-text club-type tokens. Every input maps
//! to exactly one [`ClubCategory`]; unrecognised tokens map to
//! [`ClubCategory::Unknown`]. Numbered clubs accept `7-iron`, `7 iron`,
//! `7i` and `iron 7` spellings (likewise for woods and hybrids), and wedges
//! accept both full names and the two-letter abbreviations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Iron rank assigned to the pitching wedge for range arithmetic.
pub const PITCHING_WEDGE_RANK: u8 = 10;

const IRON_RANKS: std::ops::RangeInclusive<u8> = 2..=9;
const WOOD_NUMBERS: std::ops::RangeInclusive<u8> = 3..=9;
const HYBRID_NUMBERS: std::ops::RangeInclusive<u8> = 2..=9;

/// Broad club category used for replacement policy and set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClubCategory {
    /// Driver (including `1-wood`).
    Driver,
    /// Putter.
    Putter,
    /// Numbered irons 2 through 9.
    Iron,
    /// Pitching, gap, approach, sand and lob wedges.
    Wedge,
    /// Fairway woods 3 through 9.
    Wood,
    /// Hybrids 2 through 9.
    Hybrid,
    /// Anything else.
    Unknown,
}

impl ClubCategory {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Putter => "putter",
            Self::Iron => "iron",
            Self::Wedge => "wedge",
            Self::Wood => "wood",
            Self::Hybrid => "hybrid",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wedge role, ordered by loft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WedgeRole {
    /// Pitching wedge (`PW`).
    Pitching,
    /// Gap wedge (`GW`).
    Gap,
    /// Approach wedge (`AW`).
    Approach,
    /// Sand wedge (`SW`).
    Sand,
    /// Lob wedge (`LW`).
    Lob,
}

/// Spelling table for wedges: role, abbreviation, canonical full name.
const WEDGE_NAMES: [(WedgeRole, &str, &str); 5] = [
    (WedgeRole::Pitching, "pw", "pitching-wedge"),
    (WedgeRole::Gap, "gw", "gap-wedge"),
    (WedgeRole::Approach, "aw", "approach-wedge"),
    (WedgeRole::Sand, "sw", "sand-wedge"),
    (WedgeRole::Lob, "lw", "lob-wedge"),
];

impl WedgeRole {
    /// Two-letter uppercase abbreviation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Pitching => "PW",
            Self::Gap => "GW",
            Self::Approach => "AW",
            Self::Sand => "SW",
            Self::Lob => "LW",
        }
    }

    /// Canonical hyphenated name, e.g. `sand-wedge`.
    pub fn canonical_name(self) -> &'static str {
        WEDGE_NAMES
            .iter()
            .find(|(role, _, _)| *role == self)
            .map_or("wedge", |(_, _, name)| *name)
    }
}

/// Parsed club type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClubType {
    /// Driver.
    Driver,
    /// Putter.
    Putter,
    /// Numbered iron (2–9).
    Iron(u8),
    /// Wedge by role.
    Wedge(WedgeRole),
    /// Fairway wood (3–9).
    Wood(u8),
    /// Hybrid (2–9).
    Hybrid(u8),
    /// Unrecognised token.
    Unknown,
}

impl ClubType {
    /// Parse a free-text club-type token.
    ///
    /// # Examples
    /// ```
    /// use fitting_backend::domain::{ClubType, WedgeRole};
    ///
    /// assert_eq!(ClubType::parse(" 7 Iron "), ClubType::Iron(7));
    /// assert_eq!(ClubType::parse("SW"), ClubType::Wedge(WedgeRole::Sand));
    /// assert_eq!(ClubType::parse("banana"), ClubType::Unknown);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize(raw);
        let compact: String = normalized.chars().filter(|c| *c != '-').collect();

        match compact.as_str() {
            "driver" | "1wood" | "1w" => return Self::Driver,
            "putter" => return Self::Putter,
            _ => {}
        }

        if let Some(role) = parse_wedge(&compact) {
            return Self::Wedge(role);
        }

        NUMBERED_KINDS
            .iter()
            .find_map(|(word, kind)| {
                numbered_suffix(&compact, word).and_then(|number| kind.build(number))
            })
            .unwrap_or(Self::Unknown)
    }

    /// Category this club type belongs to.
    pub fn category(self) -> ClubCategory {
        match self {
            Self::Driver => ClubCategory::Driver,
            Self::Putter => ClubCategory::Putter,
            Self::Iron(_) => ClubCategory::Iron,
            Self::Wedge(_) => ClubCategory::Wedge,
            Self::Wood(_) => ClubCategory::Wood,
            Self::Hybrid(_) => ClubCategory::Hybrid,
            Self::Unknown => ClubCategory::Unknown,
        }
    }

    /// Iron rank used for set range arithmetic; the pitching wedge is 10.
    pub fn iron_rank(self) -> Option<u8> {
        match self {
            Self::Iron(rank) => Some(rank),
            Self::Wedge(WedgeRole::Pitching) => Some(PITCHING_WEDGE_RANK),
            _ => None,
        }
    }

    /// Canonical hyphenated name, or `None` for unrecognised tokens.
    pub fn canonical_name(self) -> Option<String> {
        match self {
            Self::Driver => Some("driver".to_owned()),
            Self::Putter => Some("putter".to_owned()),
            Self::Iron(rank) => Some(iron_name(rank)),
            Self::Wedge(role) => Some(role.canonical_name().to_owned()),
            Self::Wood(number) => Some(format!("{number}-wood")),
            Self::Hybrid(number) => Some(format!("{number}-hybrid")),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum NumberedKind {
    Iron,
    Wood,
    Hybrid,
}

impl NumberedKind {
    fn build(self, number: u8) -> Option<ClubType> {
        match self {
            Self::Iron if IRON_RANKS.contains(&number) => Some(ClubType::Iron(number)),
            Self::Wood if WOOD_NUMBERS.contains(&number) => Some(ClubType::Wood(number)),
            Self::Hybrid if HYBRID_NUMBERS.contains(&number) => Some(ClubType::Hybrid(number)),
            _ => None,
        }
    }
}

// Longer words first so `wood` wins over `w`.
const NUMBERED_KINDS: [(&str, NumberedKind); 6] = [
    ("hybrid", NumberedKind::Hybrid),
    ("iron", NumberedKind::Iron),
    ("wood", NumberedKind::Wood),
    ("h", NumberedKind::Hybrid),
    ("i", NumberedKind::Iron),
    ("w", NumberedKind::Wood),
];

fn numbered_suffix(compact: &str, word: &str) -> Option<u8> {
    compact
        .strip_suffix(word)
        .or_else(|| compact.strip_prefix(word))
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
}

fn parse_wedge(compact: &str) -> Option<WedgeRole> {
    WEDGE_NAMES.iter().find_map(|(role, abbreviation, name)| {
        let full: String = name.chars().filter(|c| *c != '-').collect();
        (compact == *abbreviation || compact == full).then_some(*role)
    })
}

/// Normalise a club-type token: trim, lowercase, and fold runs of
/// whitespace, underscores and hyphens into single hyphens.
///
/// # Examples
/// ```
/// use fitting_backend::domain::normalize_club_type;
///
/// assert_eq!(normalize_club_type("  Sand   Wedge"), "sand-wedge");
/// assert_eq!(normalize_club_type("7_Iron"), "7-iron");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Classify a club-type token into its category.
pub fn classify(raw: &str) -> ClubCategory {
    ClubType::parse(raw).category()
}

/// Extract the iron rank (2–9, pitching wedge = 10) from a token.
pub fn iron_rank(raw: &str) -> Option<u8> {
    ClubType::parse(raw).iron_rank()
}

/// Canonical club name for an iron rank.
///
/// # Examples
/// ```
/// use fitting_backend::domain::iron_name;
///
/// assert_eq!(iron_name(7), "7-iron");
/// assert_eq!(iron_name(10), "pitching-wedge");
/// ```
pub fn iron_name(rank: u8) -> String {
    if rank == PITCHING_WEDGE_RANK {
        WedgeRole::Pitching.canonical_name().to_owned()
    } else {
        format!("{rank}-iron")
    }
}

/// Short label used in range strings such as `5-PW`.
pub fn iron_rank_label(rank: u8) -> String {
    if rank == PITCHING_WEDGE_RANK {
        WedgeRole::Pitching.abbreviation().to_owned()
    } else {
        rank.to_string()
    }
}

#[cfg(test)]
mod tests {
    //! Classification coverage across spellings and categories.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Driver", ClubCategory::Driver)]
    #[case("1-wood", ClubCategory::Driver)]
    #[case("PUTTER", ClubCategory::Putter)]
    #[case("7-iron", ClubCategory::Iron)]
    #[case("7 iron", ClubCategory::Iron)]
    #[case("7i", ClubCategory::Iron)]
    #[case("iron 4", ClubCategory::Iron)]
    #[case("2-iron", ClubCategory::Iron)]
    #[case("PW", ClubCategory::Wedge)]
    #[case("Pitching Wedge", ClubCategory::Wedge)]
    #[case("gap_wedge", ClubCategory::Wedge)]
    #[case("aw", ClubCategory::Wedge)]
    #[case("sand-wedge", ClubCategory::Wedge)]
    #[case("LW", ClubCategory::Wedge)]
    #[case("3-wood", ClubCategory::Wood)]
    #[case("5w", ClubCategory::Wood)]
    #[case("4 hybrid", ClubCategory::Hybrid)]
    #[case("3h", ClubCategory::Hybrid)]
    #[case("10-iron", ClubCategory::Unknown)]
    #[case("1-iron", ClubCategory::Unknown)]
    #[case("2-wood", ClubCategory::Unknown)]
    #[case("", ClubCategory::Unknown)]
    #[case("rangefinder", ClubCategory::Unknown)]
    fn classify_maps_tokens_to_categories(#[case] raw: &str, #[case] expected: ClubCategory) {
        assert_eq!(classify(raw), expected);
    }

    #[rstest]
    #[case("5-iron")]
    #[case("PW")]
    #[case("Sand Wedge")]
    #[case("7w")]
    #[case("hybrid 3")]
    #[case("driver")]
    #[case("putter")]
    fn classification_is_idempotent_over_canonical_names(#[case] raw: &str) {
        let parsed = ClubType::parse(raw);
        let canonical = parsed.canonical_name().expect("recognised token");
        assert_eq!(classify(&canonical), parsed.category());
        assert_eq!(ClubType::parse(&canonical), parsed);
    }

    #[rstest]
    #[case("9-iron", Some(9))]
    #[case("pitching wedge", Some(10))]
    #[case("PW", Some(10))]
    #[case("sand-wedge", None)]
    #[case("3-wood", None)]
    fn iron_rank_extracts_numeric_ranks(#[case] raw: &str, #[case] expected: Option<u8>) {
        assert_eq!(iron_rank(raw), expected);
    }

    #[rstest]
    fn rank_labels_use_pw_for_the_pitching_wedge() {
        assert_eq!(iron_rank_label(5), "5");
        assert_eq!(iron_rank_label(PITCHING_WEDGE_RANK), "PW");
    }

    #[rstest]
    fn normalize_folds_separators() {
        assert_eq!(normalize(" Lob__Wedge "), "lob-wedge");
        assert_eq!(normalize("3 - Hybrid"), "3-hybrid");
    }
}
