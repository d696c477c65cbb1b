//! Driven port for the external bag grading service.
//!
//! The grading algorithm is opaque to the change engine: it asks for a fresh
//! grade for an owner's current bag and records whatever comes back.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{Grade, OwnerId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while requesting a grade.
    pub enum BagGraderError {
        /// Transport failed or the service returned an error status.
        Unavailable { message: String } =>
            InternalError: "grading service unavailable: {message}",
        /// Service call exceeded the configured timeout.
        Timeout { message: String } =>
            InternalError: "grading service timeout: {message}",
        /// Response body could not be decoded.
        InvalidResponse { message: String } =>
            InternalError: "grading service returned an invalid response: {message}",
    }
}

/// Port for grading an owner's current bag.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BagGrader: Send + Sync {
    /// Grade the owner's active clubs as they are now.
    async fn grade(&self, owner_id: &OwnerId) -> Result<Grade, BagGraderError>;
}

/// Fixture grader returning the same grade for every bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureBagGrader;

impl FixtureBagGrader {
    /// Score reported by the fixture.
    pub const OVERALL_SCORE: f64 = 75.0;
}

#[async_trait]
impl BagGrader for FixtureBagGrader {
    async fn grade(&self, _owner_id: &OwnerId) -> Result<Grade, BagGraderError> {
        Ok(Grade {
            overall_score: Self::OVERALL_SCORE,
            letter_grade: "C".to_owned(),
            component_scores: BTreeMap::new(),
        })
    }
}
