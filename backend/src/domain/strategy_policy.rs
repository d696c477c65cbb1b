//! Replacement strategy policy table.
//!
//! Immutable data describing, per club category, whether a replacement
//! should default to a single club or a matched set, whether the set option
//! is offered at all, and how confident the recommendation is.

use serde::{Deserialize, Serialize};

use super::classifier::ClubCategory;
use super::ledger::ReplacementMode;

/// Confidence attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Category has a clear convention.
    High,
    /// Either option is common.
    Medium,
    /// Category not recognised.
    Low,
}

/// One row of the strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyPolicy {
    /// Category the row applies to.
    pub category: ClubCategory,
    /// Recommended replacement mode.
    pub default_option: ReplacementMode,
    /// Whether the set option should be offered.
    pub show_set_option: bool,
    /// Confidence of the recommendation.
    pub confidence: Confidence,
    /// Message shown alongside the recommendation.
    pub message: &'static str,
}

const POLICIES: [StrategyPolicy; 6] = [
    StrategyPolicy {
        category: ClubCategory::Driver,
        default_option: ReplacementMode::Single,
        show_set_option: false,
        confidence: Confidence::High,
        message: "Drivers are replaced on their own.",
    },
    StrategyPolicy {
        category: ClubCategory::Putter,
        default_option: ReplacementMode::Single,
        show_set_option: false,
        confidence: Confidence::High,
        message: "Putters are replaced on their own.",
    },
    StrategyPolicy {
        category: ClubCategory::Iron,
        default_option: ReplacementMode::Set,
        show_set_option: true,
        confidence: Confidence::High,
        message: "Irons are usually fitted and replaced as a matched set.",
    },
    StrategyPolicy {
        category: ClubCategory::Wedge,
        default_option: ReplacementMode::Single,
        show_set_option: true,
        confidence: Confidence::Medium,
        message: "Wedges are often replaced one at a time, but a matched wedge set is an option.",
    },
    StrategyPolicy {
        category: ClubCategory::Wood,
        default_option: ReplacementMode::Single,
        show_set_option: true,
        confidence: Confidence::Medium,
        message: "Fairway woods are usually replaced individually; matching them is optional.",
    },
    StrategyPolicy {
        category: ClubCategory::Hybrid,
        default_option: ReplacementMode::Single,
        show_set_option: true,
        confidence: Confidence::Medium,
        message: "Hybrids are usually replaced individually; matching them is optional.",
    },
];

const FALLBACK: StrategyPolicy = StrategyPolicy {
    category: ClubCategory::Unknown,
    default_option: ReplacementMode::Single,
    show_set_option: false,
    confidence: Confidence::Low,
    message: "Club type not recognised; replacing this club only.",
};

/// Look up the strategy row for `category`.
///
/// # Examples
/// ```
/// use fitting_backend::domain::{ClubCategory, Confidence, ReplacementMode, policy_for};
///
/// let policy = policy_for(ClubCategory::Iron);
/// assert_eq!(policy.default_option, ReplacementMode::Set);
/// assert_eq!(policy_for(ClubCategory::Unknown).confidence, Confidence::Low);
/// ```
pub fn policy_for(category: ClubCategory) -> &'static StrategyPolicy {
    POLICIES
        .iter()
        .find(|policy| policy.category == category)
        .unwrap_or(&FALLBACK)
}

/// Canonical matched-set range offered when the owner has none of a
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSetRange {
    /// Category the range applies to.
    pub category: ClubCategory,
    /// Range label, e.g. `5-PW`.
    pub range: &'static str,
    /// Number of clubs the range covers.
    pub clubs: usize,
}

const DEFAULT_SET_RANGES: [DefaultSetRange; 4] = [
    DefaultSetRange {
        category: ClubCategory::Iron,
        range: "5-PW",
        clubs: 6,
    },
    DefaultSetRange {
        category: ClubCategory::Wedge,
        range: "PW-LW",
        clubs: 3,
    },
    DefaultSetRange {
        category: ClubCategory::Wood,
        range: "3-wood, 5-wood",
        clubs: 2,
    },
    DefaultSetRange {
        category: ClubCategory::Hybrid,
        range: "3-hybrid, 4-hybrid",
        clubs: 2,
    },
];

/// Canonical set range for `category`, if the category forms sets.
pub fn default_set_range(category: ClubCategory) -> Option<&'static DefaultSetRange> {
    DEFAULT_SET_RANGES
        .iter()
        .find(|range| range.category == category)
}

/// Range description attached to set-capable recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOptions {
    /// Range currently in the bag, `None` when empty or `Unknown` when the
    /// inventory could not be read.
    pub current_range: String,
    /// Range the set replacement would cover.
    pub suggested_range: String,
    /// Number of clubs a set replacement would affect.
    pub clubs_affected: usize,
}

impl SetOptions {
    /// Placeholder used when the inventory read fails.
    pub fn unknown() -> Self {
        Self {
            current_range: "Unknown".to_owned(),
            suggested_range: "Unknown".to_owned(),
            clubs_affected: 0,
        }
    }
}

/// Advisor output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Recommended replacement mode.
    pub default_option: ReplacementMode,
    /// Whether the set option should be offered.
    pub show_set_option: bool,
    /// Confidence of the recommendation.
    pub confidence: Confidence,
    /// Message shown alongside the recommendation.
    pub message: String,
    /// Set range description when the set option is offered.
    pub set_options: Option<SetOptions>,
}

impl Recommendation {
    /// Recommendation built from a policy row.
    pub fn from_policy(policy: &StrategyPolicy, set_options: Option<SetOptions>) -> Self {
        Self {
            default_option: policy.default_option,
            show_set_option: policy.show_set_option,
            confidence: policy.confidence,
            message: policy.message.to_owned(),
            set_options,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Strategy table coverage.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ClubCategory::Driver, ReplacementMode::Single, false, Confidence::High)]
    #[case(ClubCategory::Putter, ReplacementMode::Single, false, Confidence::High)]
    #[case(ClubCategory::Iron, ReplacementMode::Set, true, Confidence::High)]
    #[case(ClubCategory::Wedge, ReplacementMode::Single, true, Confidence::Medium)]
    #[case(ClubCategory::Wood, ReplacementMode::Single, true, Confidence::Medium)]
    #[case(ClubCategory::Hybrid, ReplacementMode::Single, true, Confidence::Medium)]
    #[case(ClubCategory::Unknown, ReplacementMode::Single, false, Confidence::Low)]
    fn policy_table(
        #[case] category: ClubCategory,
        #[case] default_option: ReplacementMode,
        #[case] show_set_option: bool,
        #[case] confidence: Confidence,
    ) {
        let policy = policy_for(category);
        assert_eq!(policy.default_option, default_option);
        assert_eq!(policy.show_set_option, show_set_option);
        assert_eq!(policy.confidence, confidence);
    }

    #[rstest]
    fn set_capable_categories_have_default_ranges() {
        for policy in POLICIES.iter().filter(|policy| policy.show_set_option) {
            assert!(
                default_set_range(policy.category).is_some(),
                "missing default range for {}",
                policy.category
            );
        }
        assert!(default_set_range(ClubCategory::Driver).is_none());
    }

    #[rstest]
    fn recommendation_serialises_null_set_options() {
        let recommendation = Recommendation::from_policy(policy_for(ClubCategory::Driver), None);
        let value = serde_json::to_value(&recommendation).expect("serialise");
        assert_eq!(value["defaultOption"], "single");
        assert!(value["setOptions"].is_null());
    }
}
