use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::ObservationType;
use super::scoring::BadgeThresholds;
use super::stats::UserStats;

/// Achievement flags. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    TenObservations,
    FiftyObservations,
    HundredObservations,
    AccurateObserver,
    CoralExpert,
    MpaGuardian,
    WeeklyContributor,
    MonthlyContributor,
}

impl Badge {
    pub const ALL: [Badge; 8] = [
        Badge::TenObservations,
        Badge::FiftyObservations,
        Badge::HundredObservations,
        Badge::AccurateObserver,
        Badge::CoralExpert,
        Badge::MpaGuardian,
        Badge::WeeklyContributor,
        Badge::MonthlyContributor,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Badge::TenObservations => "ten_observations",
            Badge::FiftyObservations => "fifty_observations",
            Badge::HundredObservations => "hundred_observations",
            Badge::AccurateObserver => "accurate_observer",
            Badge::CoralExpert => "coral_expert",
            Badge::MpaGuardian => "mpa_guardian",
            Badge::WeeklyContributor => "weekly_contributor",
            Badge::MonthlyContributor => "monthly_contributor",
        }
    }
}

/// Checks cumulative stats against every badge rule on each update.
#[derive(Debug, Clone, Default)]
pub struct BadgeEvaluator {
    thresholds: BadgeThresholds,
}

impl BadgeEvaluator {
    pub fn new(thresholds: BadgeThresholds) -> Self {
        Self { thresholds }
    }

    /// Badges that qualify now and are not already held, in rule order.
    pub fn evaluate(&self, stats: &UserStats, held: &BTreeSet<Badge>) -> Vec<Badge> {
        Badge::ALL
            .into_iter()
            .filter(|badge| !held.contains(badge))
            .filter(|badge| self.qualifies(*badge, stats))
            .collect()
    }

    pub fn qualifies(&self, badge: Badge, stats: &UserStats) -> bool {
        let t = &self.thresholds;
        match badge {
            Badge::TenObservations => stats.total_observations >= t.ten_observations,
            Badge::FiftyObservations => stats.total_observations >= t.fifty_observations,
            Badge::HundredObservations => stats.total_observations >= t.hundred_observations,
            Badge::AccurateObserver => {
                stats.verified_observations >= t.accurate_observer_min_verified
                    && stats.verification_accuracy() >= t.accurate_observer_min_accuracy
            }
            Badge::CoralExpert => {
                stats.type_count(ObservationType::CoralBleaching) >= t.coral_expert_observations
            }
            Badge::MpaGuardian => stats.mpa_observations >= t.mpa_guardian_observations,
            Badge::WeeklyContributor => {
                stats.streak.current_days() >= t.weekly_contributor_streak_days
            }
            Badge::MonthlyContributor => {
                stats.streak.current_days() >= t.monthly_contributor_streak_days
            }
        }
    }
}
