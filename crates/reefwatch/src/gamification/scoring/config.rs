use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::ObservationType;

/// Named point values applied by the score calculator.
///
/// Loaded once at start-up and handed to `ScoreCalculator::new`; missing fields in a
/// JSON override fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub base_observation_points: i64,
    pub photo_bonus_points: i64,
    pub gps_bonus_points: i64,
    pub mpa_bonus_points: i64,
    pub verification_base_points: i64,
    pub photo_evidence_bonus: i64,
    pub rejection_penalty_points: i64,
    pub default_type_bonus: i64,
    pub type_bonuses: BTreeMap<ObservationType, i64>,
    pub badges: BadgeThresholds,
}

impl Default for ScoringTable {
    fn default() -> Self {
        let type_bonuses = BTreeMap::from([
            (ObservationType::CoralBleaching, 20),
            (ObservationType::IllegalFishing, 25),
            (ObservationType::WildlifeSighting, 15),
            (ObservationType::ReefHealth, 15),
        ]);

        Self {
            base_observation_points: 5,
            photo_bonus_points: 3,
            gps_bonus_points: 2,
            mpa_bonus_points: 5,
            verification_base_points: 10,
            photo_evidence_bonus: 10,
            rejection_penalty_points: 5,
            default_type_bonus: 10,
            type_bonuses,
            badges: BadgeThresholds::default(),
        }
    }
}

impl ScoringTable {
    /// Bonus for an approved observation of the given type; unmapped types get the default.
    pub fn type_bonus(&self, observation_type: ObservationType) -> i64 {
        self.type_bonuses
            .get(&observation_type)
            .copied()
            .unwrap_or(self.default_type_bonus)
    }
}

/// Unlock thresholds for each badge rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    pub ten_observations: u32,
    pub fifty_observations: u32,
    pub hundred_observations: u32,
    pub accurate_observer_min_verified: u32,
    pub accurate_observer_min_accuracy: f64,
    pub coral_expert_observations: u32,
    pub mpa_guardian_observations: u32,
    pub weekly_contributor_streak_days: u32,
    pub monthly_contributor_streak_days: u32,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            ten_observations: 10,
            fifty_observations: 50,
            hundred_observations: 100,
            accurate_observer_min_verified: 20,
            accurate_observer_min_accuracy: 0.9,
            coral_expert_observations: 25,
            mpa_guardian_observations: 10,
            weekly_contributor_streak_days: 7,
            monthly_contributor_streak_days: 30,
        }
    }
}
