//! Wire shapes exchanged with the grading service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Grade, OwnerId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GradeRequestDto<'a> {
    pub(super) owner_id: &'a OwnerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GradeResponseDto {
    pub(super) overall_score: f64,
    pub(super) letter_grade: String,
    #[serde(default)]
    pub(super) component_scores: BTreeMap<String, f64>,
}

impl GradeResponseDto {
    pub(super) fn into_domain(self) -> Result<Grade, String> {
        if !self.overall_score.is_finite() {
            return Err("overallScore must be finite".to_owned());
        }
        if self.letter_grade.trim().is_empty() {
            return Err("letterGrade must not be empty".to_owned());
        }
        if let Some((name, _)) = self
            .component_scores
            .iter()
            .find(|(_, score)| !score.is_finite())
        {
            return Err(format!("component score {name} must be finite"));
        }
        Ok(Grade {
            overall_score: self.overall_score,
            letter_grade: self.letter_grade,
            component_scores: self.component_scores,
        })
    }
}
