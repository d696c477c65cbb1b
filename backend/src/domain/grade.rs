//! Bag grade snapshots and the per-category impact table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Grade returned by the grading service for one owner's bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    /// Overall bag score.
    pub overall_score: f64,
    /// Letter grade, e.g. `B+`.
    pub letter_grade: String,
    /// Component scores keyed by the grader's category names.
    #[serde(default)]
    pub component_scores: BTreeMap<String, f64>,
}

impl Grade {
    /// Score for an impact category, defaulting to zero when absent.
    pub fn component(&self, category: ImpactCategory) -> f64 {
        self.component_scores
            .get(category.as_str())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Fixed set of grade categories reported on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImpactCategory {
    /// Equipment age.
    Age,
    /// Shaft weight progression through the set.
    WeightProgression,
    /// Loft gapping between adjacent clubs.
    LoftGapping,
    /// Flex consistency.
    FlexConsistency,
    /// Kickpoint consistency.
    KickpointConsistency,
    /// Torque consistency.
    TorqueConsistency,
    /// Length progression.
    LengthProgression,
    /// Lie angle progression.
    LieAngleProgression,
}

impl ImpactCategory {
    /// Every category in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::WeightProgression,
        Self::LoftGapping,
        Self::FlexConsistency,
        Self::KickpointConsistency,
        Self::TorqueConsistency,
        Self::LengthProgression,
        Self::LieAngleProgression,
    ];

    /// Key used in [`Grade::component_scores`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::WeightProgression => "weightProgression",
            Self::LoftGapping => "loftGapping",
            Self::FlexConsistency => "flexConsistency",
            Self::KickpointConsistency => "kickpointConsistency",
            Self::TorqueConsistency => "torqueConsistency",
            Self::LengthProgression => "lengthProgression",
            Self::LieAngleProgression => "lieAngleProgression",
        }
    }
}

/// Before/after score pair for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChange {
    /// Score before the change.
    pub before: f64,
    /// Score after the change.
    pub after: f64,
    /// `after - before`.
    pub change: f64,
}

impl ScoreChange {
    /// Pair two scores.
    pub fn between(before: f64, after: f64) -> Self {
        Self {
            before,
            after,
            change: after - before,
        }
    }
}

/// Per-category impact of one change.
pub type ImpactTable = BTreeMap<ImpactCategory, ScoreChange>;

/// Build the impact table over [`ImpactCategory::ALL`].
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
///
/// use fitting_backend::domain::{Grade, ImpactCategory, impact_between};
///
/// let before = Grade {
///     overall_score: 70.0,
///     letter_grade: "C".to_owned(),
///     component_scores: BTreeMap::from([("age".to_owned(), 40.0)]),
/// };
/// let after = Grade {
///     overall_score: 78.0,
///     letter_grade: "C+".to_owned(),
///     component_scores: BTreeMap::from([("age".to_owned(), 90.0)]),
/// };
/// let impact = impact_between(&before, &after);
/// assert_eq!(impact.len(), 8);
/// assert_eq!(impact[&ImpactCategory::Age].change, 50.0);
/// assert_eq!(impact[&ImpactCategory::LoftGapping].after, 0.0);
/// ```
pub fn impact_between(before: &Grade, after: &Grade) -> ImpactTable {
    ImpactCategory::ALL
        .into_iter()
        .map(|category| {
            (
                category,
                ScoreChange::between(before.component(category), after.component(category)),
            )
        })
        .collect()
}

/// Ledger snapshot of the grades either side of a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeImpact {
    /// Grade before the mutation.
    pub before: Grade,
    /// Grade after the mutation.
    pub after: Grade,
    /// Per-category breakdown.
    pub categories: ImpactTable,
}

impl GradeImpact {
    /// Capture both grades and derive the category table.
    pub fn new(before: Grade, after: Grade) -> Self {
        let categories = impact_between(&before, &after);
        Self {
            before,
            after,
            categories,
        }
    }

    /// Overall score improvement (`after - before`).
    pub fn improvement(&self) -> f64 {
        self.after.overall_score - self.before.overall_score
    }
}
