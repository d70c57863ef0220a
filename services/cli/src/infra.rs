use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reefwatch::gamification::{
    BoundingBox, GamificationStore, MpaBoundary, Observation, ObservationId, StoreError,
    UnitOfWork, UserId, UserStats,
};

#[derive(Default)]
struct StoreState {
    stats: HashMap<UserId, UserStats>,
    observations: HashMap<ObservationId, Observation>,
}

/// Process-local store backing the CLI; boundaries are fixed at construction.
#[derive(Default, Clone)]
pub(crate) struct InMemoryGamificationStore {
    state: Arc<Mutex<StoreState>>,
    boundaries: Arc<Vec<MpaBoundary>>,
}

impl InMemoryGamificationStore {
    pub(crate) fn with_boundaries(boundaries: Vec<MpaBoundary>) -> Self {
        Self {
            state: Arc::default(),
            boundaries: Arc::new(boundaries),
        }
    }

    pub(crate) fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }
}

impl GamificationStore for InMemoryGamificationStore {
    fn load_user_stats(&self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.stats.get(user).cloned())
    }

    fn load_mpa_boundaries(&self, region: &BoundingBox) -> Result<Vec<MpaBoundary>, StoreError> {
        Ok(self
            .boundaries
            .iter()
            .filter(|boundary| {
                boundary
                    .bounding_box()
                    .map(|bbox| bbox.intersects(region))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn load_observation(&self, id: &ObservationId) -> Result<Option<Observation>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.observations.get(id).cloned())
    }

    fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        let current = guard
            .stats
            .get(&unit.stats.user)
            .map(|stats| stats.version)
            .unwrap_or(0);
        if current != unit.expected_version() {
            return Err(StoreError::Conflict(unit.stats.user.clone()));
        }
        guard
            .observations
            .insert(unit.observation.id.clone(), unit.observation);
        guard.stats.insert(unit.stats.user.clone(), unit.stats);
        Ok(())
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<UserStats>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        let mut stats: Vec<UserStats> = guard.stats.values().cloned().collect();
        stats.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.user.cmp(&b.user))
        });
        stats.truncate(limit);
        Ok(stats)
    }
}
