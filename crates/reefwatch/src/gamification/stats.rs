use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::badges::Badge;
use super::domain::{Observation, ObservationType, UserId, VerificationOutcome};

/// Running contribution statistics for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user: UserId,
    pub total_points: u64,
    pub total_observations: u32,
    pub verified_observations: u32,
    pub rejected_observations: u32,
    pub mpa_observations: u32,
    pub per_type_counts: BTreeMap<ObservationType, u32>,
    pub streak: ContributionStreak,
    pub badges: BTreeSet<Badge>,
    /// Incremented on every committed update; stores reject stale writes.
    pub version: u64,
}

impl UserStats {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            total_points: 0,
            total_observations: 0,
            verified_observations: 0,
            rejected_observations: 0,
            mpa_observations: 0,
            per_type_counts: BTreeMap::new(),
            streak: ContributionStreak::default(),
            badges: BTreeSet::new(),
            version: 0,
        }
    }

    /// Share of submitted observations that reviewers approved, in `[0, 1]`.
    pub fn verification_accuracy(&self) -> f64 {
        if self.total_observations == 0 {
            return 0.0;
        }
        f64::from(self.verified_observations) / f64::from(self.total_observations)
    }

    pub fn type_count(&self, observation_type: ObservationType) -> u32 {
        self.per_type_counts
            .get(&observation_type)
            .copied()
            .unwrap_or(0)
    }

    /// Apply a signed delta, flooring the total at zero. Returns the new total.
    pub fn apply_points(&mut self, delta: i64) -> u64 {
        self.total_points = if delta >= 0 {
            self.total_points.saturating_add(delta.unsigned_abs())
        } else {
            self.total_points.saturating_sub(delta.unsigned_abs())
        };
        self.total_points
    }

    pub(crate) fn record_observation(&mut self, observation: &Observation, inside_mpa: bool) {
        self.total_observations = self.total_observations.saturating_add(1);
        *self
            .per_type_counts
            .entry(observation.observation_type)
            .or_insert(0) += 1;
        if inside_mpa {
            self.mpa_observations = self.mpa_observations.saturating_add(1);
        }
        self.streak
            .record_activity(observation.created_at.date_naive());
    }

    pub(crate) fn record_verification(&mut self, outcome: VerificationOutcome) {
        match outcome {
            VerificationOutcome::Approved => {
                self.verified_observations = self.verified_observations.saturating_add(1)
            }
            VerificationOutcome::Rejected => {
                self.rejected_observations = self.rejected_observations.saturating_add(1)
            }
        }
    }

    /// Badges are append-only; already held entries are left untouched.
    pub(crate) fn grant_badges(&mut self, badges: &[Badge]) {
        self.badges.extend(badges.iter().copied());
    }

    pub fn summary(&self) -> ContributorSummary {
        ContributorSummary {
            user: self.user.clone(),
            total_points: self.total_points,
            total_observations: self.total_observations,
            verified_observations: self.verified_observations,
            verification_accuracy_percent: self.verification_accuracy() * 100.0,
            current_streak_days: self.streak.current_days(),
            badges: self.badges.iter().map(|badge| badge.label()).collect(),
        }
    }
}

/// Active days kept verbatim behind the newest one; older runs are folded into a summary.
const ACTIVE_DAY_RETENTION: u64 = 400;

/// Consecutive UTC calendar days with at least one submitted observation.
///
/// Days may arrive out of order; a late day that fills a gap joins the runs on
/// either side of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionStreak {
    current_days: u32,
    longest_days: u32,
    active_days: BTreeSet<NaiveDate>,
    /// Newest pruned day and the length of the run ending there.
    folded_run: Option<(NaiveDate, u32)>,
}

impl ContributionStreak {
    pub fn current_days(&self) -> u32 {
        self.current_days
    }

    pub fn longest_days(&self) -> u32 {
        self.longest_days
    }

    pub fn last_active_day(&self) -> Option<NaiveDate> {
        self.active_days.last().copied()
    }

    /// Marks `day` active. The current streak is the run ending at the newest
    /// active day. Days further back than the retention window are ignored.
    pub fn record_activity(&mut self, day: NaiveDate) {
        if self.retention_cutoff().is_some_and(|cutoff| day < cutoff) {
            return;
        }
        if !self.active_days.insert(day) {
            return;
        }

        let mut end = day;
        while let Some(next) = end
            .succ_opt()
            .filter(|next| self.active_days.contains(next))
        {
            end = next;
        }
        let joined = run_ending_at(&self.active_days, self.folded_run, end);
        self.longest_days = self.longest_days.max(joined);

        self.prune();
        self.current_days = self
            .active_days
            .last()
            .map(|latest| run_ending_at(&self.active_days, self.folded_run, *latest))
            .unwrap_or(0);
        self.longest_days = self.longest_days.max(self.current_days);
    }

    fn retention_cutoff(&self) -> Option<NaiveDate> {
        self.active_days
            .last()
            .and_then(|latest| latest.checked_sub_days(Days::new(ACTIVE_DAY_RETENTION)))
    }

    fn prune(&mut self) {
        let Some(cutoff) = self.retention_cutoff() else {
            return;
        };
        let kept = self.active_days.split_off(&cutoff);
        let dropped = std::mem::replace(&mut self.active_days, kept);
        if let Some(newest) = dropped.last().copied() {
            let length = run_ending_at(&dropped, self.folded_run, newest);
            self.folded_run = Some((newest, length));
        }
    }
}

fn run_ending_at(
    days: &BTreeSet<NaiveDate>,
    folded: Option<(NaiveDate, u32)>,
    end: NaiveDate,
) -> u32 {
    let mut length = 0u32;
    let mut cursor = Some(end);
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        length = length.saturating_add(1);
        cursor = day.pred_opt();
    }

    match (cursor, folded) {
        (Some(before), Some((folded_end, folded_length))) if before == folded_end => {
            length.saturating_add(folded_length)
        }
        _ => length,
    }
}

/// Read-only projection of a contributor's standing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorSummary {
    pub user: UserId,
    pub total_points: u64,
    pub total_observations: u32,
    pub verified_observations: u32,
    pub verification_accuracy_percent: f64,
    pub current_streak_days: u32,
    pub badges: Vec<&'static str>,
}
