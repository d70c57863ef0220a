use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::badges::{Badge, BadgeEvaluator};
use super::domain::{
    Observation, ObservationId, UserId, Verification, VerificationId, VerificationOutcome,
    VerificationState,
};
use super::geo::{
    find_all_containing, BoundingBox, CoordinateError, GeoPoint, MpaBoundary, MpaId,
};
use super::repository::{
    rank_contributors, GamificationStore, LeaderboardEntry, StoreError, UnitOfWork,
};
use super::scoring::{PointItem, ScoreCalculator, ScoringTable};
use super::stats::{ContributorSummary, UserStats};

/// Shared flag letting callers abort an award before any collaborator is contacted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lifecycle trigger that produced an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AwardEvent {
    Created,
    Verified(VerificationOutcome),
}

/// Award computed for a single event, returned after it has been committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardResult {
    pub observation_id: ObservationId,
    pub user: UserId,
    pub event: AwardEvent,
    /// Sum of `breakdown`; may be negative for rejections.
    pub points_delta: i64,
    /// User total after the delta, floored at zero.
    pub total_points: u64,
    pub newly_earned_badges: Vec<Badge>,
    pub breakdown: Vec<PointItem>,
    pub containing_mpa: Option<MpaId>,
}

/// Orchestrates scoring, badge evaluation, and MPA attribution for observation events.
pub struct GamificationEngine<S> {
    store: Arc<S>,
    calculator: ScoreCalculator,
    badges: BadgeEvaluator,
    region: BoundingBox,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<S> GamificationEngine<S>
where
    S: GamificationStore + 'static,
{
    pub fn new(store: Arc<S>, table: ScoringTable, region: BoundingBox) -> Self {
        let badges = BadgeEvaluator::new(table.badges.clone());
        Self {
            store,
            calculator: ScoreCalculator::new(table),
            badges,
            region,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn region(&self) -> &BoundingBox {
        &self.region
    }

    /// Score a newly submitted observation and record it for its submitter.
    pub fn apply_creation(
        &self,
        observation: Observation,
        cancel: &CancellationFlag,
    ) -> Result<AwardResult, GamificationError> {
        if cancel.is_cancelled() {
            return Err(GamificationError::Cancelled);
        }
        if observation.verification.is_verified() {
            return Err(GamificationError::InvalidStateTransition {
                observation: observation.id.clone(),
                state: observation.verification.label(),
                event: "creation",
            });
        }
        if let Some(location) = observation.location {
            if !self.region.contains(&location) {
                return Err(CoordinateError::OutsideRegion(location).into());
            }
        }

        let submitter = observation.submitter.clone();
        self.with_user_lock(&submitter, || self.record_creation(observation))
    }

    fn record_creation(&self, observation: Observation) -> Result<AwardResult, GamificationError> {
        if self.store.load_observation(&observation.id)?.is_some() {
            return Err(GamificationError::InvalidStateTransition {
                observation: observation.id.clone(),
                state: "recorded",
                event: "creation",
            });
        }

        let containing_mpa = match &observation.location {
            Some(location) => {
                let mut boundaries = self.store.load_mpa_boundaries(&self.region)?;
                boundaries.sort_by(|a, b| a.id.cmp(&b.id));
                attribute_mpa(&observation.id, location, &boundaries)
            }
            None => None,
        };
        let inside_mpa = containing_mpa.is_some();

        let score = self.calculator.creation_score(&observation, inside_mpa);

        let mut stats = self.load_or_default(&observation.submitter)?;
        stats.record_observation(&observation, inside_mpa);
        let total_points = stats.apply_points(score.total);
        let newly_earned_badges = self.award_badges(&mut stats);
        stats.version += 1;

        let result = AwardResult {
            observation_id: observation.id.clone(),
            user: observation.submitter.clone(),
            event: AwardEvent::Created,
            points_delta: score.total,
            total_points,
            newly_earned_badges,
            breakdown: score.items,
            containing_mpa,
        };

        self.store.commit(UnitOfWork { stats, observation })?;

        info!(
            observation = %result.observation_id,
            user = %result.user,
            points = result.points_delta,
            total = result.total_points,
            badges = result.newly_earned_badges.len(),
            "observation creation scored"
        );
        Ok(result)
    }

    /// Apply a reviewer decision. Each observation accepts exactly one verification.
    pub fn apply_verification(
        &self,
        observation: &Observation,
        verification: &Verification,
        cancel: &CancellationFlag,
    ) -> Result<AwardResult, GamificationError> {
        if cancel.is_cancelled() {
            return Err(GamificationError::Cancelled);
        }
        if verification.observation_id != observation.id {
            return Err(GamificationError::MismatchedVerification {
                verification: verification.id.clone(),
                target: verification.observation_id.clone(),
                observation: observation.id.clone(),
            });
        }
        ensure_unverified(observation)?;

        let owner = self.load_stored(&observation.id)?.submitter;
        if owner != observation.submitter {
            return Err(GamificationError::SubmitterMismatch {
                observation: observation.id.clone(),
                claimed: observation.submitter.clone(),
                owner,
            });
        }

        self.with_user_lock(&owner, || self.record_verification(&observation.id, verification))
    }

    fn record_verification(
        &self,
        id: &ObservationId,
        verification: &Verification,
    ) -> Result<AwardResult, GamificationError> {
        let mut stored = self.load_stored(id)?;
        ensure_unverified(&stored)?;

        let score = self.calculator.verification_score(
            stored.observation_type,
            verification.outcome,
            verification.has_photo_evidence,
        );

        let mut stats = self.load_or_default(&stored.submitter)?;
        stats.record_verification(verification.outcome);
        let total_points = stats.apply_points(score.total);
        let newly_earned_badges = self.award_badges(&mut stats);
        stats.version += 1;

        stored.verification = VerificationState::Verified(verification.outcome);

        let result = AwardResult {
            observation_id: stored.id.clone(),
            user: stored.submitter.clone(),
            event: AwardEvent::Verified(verification.outcome),
            points_delta: score.total,
            total_points,
            newly_earned_badges,
            breakdown: score.items,
            containing_mpa: None,
        };

        self.store.commit(UnitOfWork {
            stats,
            observation: stored,
        })?;

        info!(
            observation = %result.observation_id,
            user = %result.user,
            outcome = verification.outcome.label(),
            points = result.points_delta,
            total = result.total_points,
            "observation verification scored"
        );
        Ok(result)
    }

    pub fn contributor_summary(
        &self,
        user: &UserId,
    ) -> Result<Option<ContributorSummary>, GamificationError> {
        Ok(self
            .store
            .load_user_stats(user)?
            .map(|stats| stats.summary()))
    }

    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, GamificationError> {
        let stats = self.store.leaderboard(limit)?;
        Ok(rank_contributors(stats, limit))
    }

    fn load_or_default(&self, user: &UserId) -> Result<UserStats, StoreError> {
        Ok(self
            .store
            .load_user_stats(user)?
            .unwrap_or_else(|| UserStats::new(user.clone())))
    }

    fn award_badges(&self, stats: &mut UserStats) -> Vec<Badge> {
        let earned = self.badges.evaluate(stats, &stats.badges);
        stats.grant_badges(&earned);
        earned
    }

    fn load_stored(&self, id: &ObservationId) -> Result<Observation, GamificationError> {
        self.store
            .load_observation(id)?
            .ok_or_else(|| GamificationError::ObservationNotFound(id.clone()))
    }

    /// Runs `work` under the user's lock. The map entry is dropped once no
    /// other caller holds or waits on it.
    fn with_user_lock<T>(&self, user: &UserId, work: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self
                .user_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            locks.entry(user.clone()).or_default().clone()
        };

        let outcome = {
            let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user);
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) fn tracked_user_locks(&self) -> usize {
        self.user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn ensure_unverified(observation: &Observation) -> Result<(), GamificationError> {
    if observation.verification.is_verified() {
        return Err(GamificationError::InvalidStateTransition {
            observation: observation.id.clone(),
            state: observation.verification.label(),
            event: "verification",
        });
    }
    Ok(())
}

fn attribute_mpa(
    observation: &ObservationId,
    location: &GeoPoint,
    boundaries: &[MpaBoundary],
) -> Option<MpaId> {
    let matches = find_all_containing(location, boundaries);
    if matches.len() > 1 {
        let ids: Vec<&str> = matches.iter().map(|boundary| boundary.id.0.as_str()).collect();
        warn!(
            %observation,
            mpas = ?ids,
            "observation falls inside overlapping MPA boundaries; attributing to the lowest id"
        );
    }

    match matches.first() {
        Some(boundary) => Some(boundary.id.clone()),
        None => {
            debug!(%observation, "observation outside every MPA boundary");
            None
        }
    }
}

/// Error raised by the gamification engine.
#[derive(Debug, thiserror::Error)]
pub enum GamificationError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    #[error("observation {observation} is {state} and cannot accept {event}")]
    InvalidStateTransition {
        observation: ObservationId,
        state: &'static str,
        event: &'static str,
    },
    #[error("observation {0} not found")]
    ObservationNotFound(ObservationId),
    #[error("verification {verification} targets observation {target}, not {observation}")]
    MismatchedVerification {
        verification: VerificationId,
        target: ObservationId,
        observation: ObservationId,
    },
    #[error("observation {observation} belongs to {owner}, not {claimed}")]
    SubmitterMismatch {
        observation: ObservationId,
        claimed: UserId,
        owner: UserId,
    },
    #[error("cancelled before contacting collaborators")]
    Cancelled,
    #[error(transparent)]
    Collaborator(#[from] StoreError),
}
