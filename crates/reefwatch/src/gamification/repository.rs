use serde::{Deserialize, Serialize};

use super::domain::{Observation, ObservationId, UserId};
use super::geo::{BoundingBox, MpaBoundary};
use super::stats::UserStats;

/// Everything an award changes, persisted together or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfWork {
    /// Stats with `version` already advanced; the store compares against `version - 1`.
    pub stats: UserStats,
    /// Observation carrying its current verification state tag.
    pub observation: Observation,
}

impl UnitOfWork {
    pub fn expected_version(&self) -> u64 {
        self.stats.version.saturating_sub(1)
    }
}

/// Storage abstraction so the engine can be exercised in isolation.
pub trait GamificationStore: Send + Sync {
    fn load_user_stats(&self, user: &UserId) -> Result<Option<UserStats>, StoreError>;
    fn load_mpa_boundaries(&self, region: &BoundingBox) -> Result<Vec<MpaBoundary>, StoreError>;
    fn load_observation(&self, id: &ObservationId) -> Result<Option<Observation>, StoreError>;
    /// Atomically saves the user stats and the observation state. Implementations
    /// must reject the write with `Conflict` when the stored stats version differs
    /// from `unit.expected_version()`.
    fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError>;
    fn leaderboard(&self, limit: usize) -> Result<Vec<UserStats>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("concurrent update detected for user {0}")]
    Conflict(UserId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Ranked row for leaderboard output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user: UserId,
    pub total_points: u64,
    pub badge_count: usize,
}

/// Orders by points descending, then user id, and assigns 1-based ranks.
pub fn rank_contributors(mut stats: Vec<UserStats>, limit: usize) -> Vec<LeaderboardEntry> {
    stats.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.user.cmp(&b.user))
    });
    stats
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            rank: index + 1,
            badge_count: entry.badges.len(),
            user: entry.user,
            total_points: entry.total_points,
        })
        .collect()
}
