mod config;
mod rules;

pub use config::{BadgeThresholds, ScoringTable};

use super::domain::{Observation, ObservationType, VerificationOutcome};
use serde::{Deserialize, Serialize};

/// Stateless calculator that applies a scoring table to observation events.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    table: ScoringTable,
}

impl ScoreCalculator {
    pub fn new(table: ScoringTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    /// Itemised points for a newly created observation.
    pub fn creation_score(&self, observation: &Observation, inside_mpa: bool) -> Score {
        Score::from_items(rules::creation_items(observation, inside_mpa, &self.table))
    }

    pub fn compute_creation_points(&self, observation: &Observation, inside_mpa: bool) -> i64 {
        self.creation_score(observation, inside_mpa).total
    }

    /// Itemised delta for a reviewer decision. Rejections carry only the penalty.
    pub fn verification_score(
        &self,
        observation_type: ObservationType,
        outcome: VerificationOutcome,
        has_photo_evidence: bool,
    ) -> Score {
        Score::from_items(rules::verification_items(
            observation_type,
            outcome,
            has_photo_evidence,
            &self.table,
        ))
    }

    pub fn compute_verification_delta(
        &self,
        observation_type: ObservationType,
        outcome: VerificationOutcome,
        has_photo_evidence: bool,
    ) -> i64 {
        self.verification_score(observation_type, outcome, has_photo_evidence)
            .total
    }
}

/// Named origin of a point item, each backed by a `ScoringTable` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointSource {
    BaseObservation,
    PhotoBonus,
    GpsBonus,
    MpaBonus,
    VerificationBase,
    TypeBonus(ObservationType),
    PhotoEvidenceBonus,
    RejectionPenalty,
}

/// Discrete contribution to an award, kept for audits and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointItem {
    pub source: PointSource,
    pub points: i64,
    pub notes: String,
}

/// Point total together with the items that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub total: i64,
    pub items: Vec<PointItem>,
}

impl Score {
    fn from_items(items: Vec<PointItem>) -> Self {
        let total = items.iter().map(|item| item.points).sum();
        Self { total, items }
    }
}
