use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::gamification::domain::{
    Observation, ObservationId, ObservationType, UserId, Verification, VerificationId,
    VerificationOutcome, VerificationState,
};
use crate::gamification::engine::GamificationEngine;
use crate::gamification::geo::{BoundingBox, GeoPoint, MpaBoundary, MpaId};
use crate::gamification::repository::{GamificationStore, StoreError, UnitOfWork};
use crate::gamification::scoring::ScoringTable;
use crate::gamification::stats::UserStats;

pub(super) fn point(longitude: f64, latitude: f64) -> GeoPoint {
    GeoPoint::new(longitude, latitude).expect("valid coordinate")
}

/// Nassau harbour, inside `exuma_park` below.
pub(super) fn inside_mpa() -> GeoPoint {
    point(-77.35, 25.05)
}

/// Open water south of Inagua, inside the Bahamas box but outside every fixture MPA.
pub(super) fn outside_mpa() -> GeoPoint {
    point(-73.5, 21.2)
}

pub(super) fn exuma_park() -> MpaBoundary {
    MpaBoundary {
        id: MpaId("mpa-exuma".to_string()),
        name: "Exuma Cays Land and Sea Park".to_string(),
        ring: vec![
            point(-77.5, 24.9),
            point(-77.5, 25.2),
            point(-77.2, 25.2),
            point(-77.2, 24.9),
        ],
    }
}

pub(super) fn andros_reserve() -> MpaBoundary {
    MpaBoundary {
        id: MpaId("mpa-andros".to_string()),
        name: "Andros West Side".to_string(),
        ring: vec![
            point(-78.4, 24.0),
            point(-78.4, 24.6),
            point(-77.9, 24.6),
            point(-77.9, 24.0),
            point(-78.4, 24.0),
        ],
    }
}

pub(super) fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn diver() -> UserId {
    UserId("diver-7".to_string())
}

pub(super) fn observation(id: &str, observation_type: ObservationType) -> Observation {
    Observation {
        id: ObservationId(id.to_string()),
        submitter: diver(),
        location: Some(inside_mpa()),
        has_photo: true,
        observation_type,
        created_at: started_at(),
        verification: VerificationState::Unverified,
    }
}

pub(super) fn observation_on_day(id: &str, day: i64) -> Observation {
    let mut observation = observation(id, ObservationType::ReefHealth);
    observation.location = Some(outside_mpa());
    observation.created_at = started_at() + Duration::days(day);
    observation
}

pub(super) fn verification(
    observation: &Observation,
    outcome: VerificationOutcome,
    has_photo_evidence: bool,
) -> Verification {
    Verification {
        id: VerificationId(format!("ver-{}", observation.id.0)),
        observation_id: observation.id.clone(),
        outcome,
        has_photo_evidence,
        verifier: UserId("reviewer-1".to_string()),
        verified_at: started_at() + Duration::hours(2),
    }
}

pub(super) fn stats_with(
    total_observations: u32,
    verified_observations: u32,
    mpa_observations: u32,
) -> UserStats {
    let mut stats = UserStats::new(diver());
    stats.total_observations = total_observations;
    stats.verified_observations = verified_observations;
    stats.mpa_observations = mpa_observations;
    stats
}

pub(super) fn build_engine() -> (GamificationEngine<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_boundaries(vec![exuma_park(), andros_reserve()]));
    let engine = GamificationEngine::new(
        store.clone(),
        ScoringTable::default(),
        BoundingBox::BAHAMAS,
    );
    (engine, store)
}

#[derive(Default)]
pub(super) struct MemoryState {
    pub(super) stats: HashMap<UserId, UserStats>,
    pub(super) observations: HashMap<ObservationId, Observation>,
    pub(super) boundaries: Vec<MpaBoundary>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) state: Arc<Mutex<MemoryState>>,
    pub(super) boundary_loads: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub(super) fn with_boundaries(boundaries: Vec<MpaBoundary>) -> Self {
        let store = Self::default();
        store.state.lock().expect("store mutex poisoned").boundaries = boundaries;
        store
    }

    pub(super) fn seed_stats(&self, stats: UserStats) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .stats
            .insert(stats.user.clone(), stats);
    }

    pub(super) fn stats(&self, user: &UserId) -> Option<UserStats> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .stats
            .get(user)
            .cloned()
    }

    pub(super) fn observation(&self, id: &ObservationId) -> Option<Observation> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .observations
            .get(id)
            .cloned()
    }

    pub(super) fn boundary_loads(&self) -> usize {
        self.boundary_loads.load(Ordering::SeqCst)
    }
}

impl GamificationStore for MemoryStore {
    fn load_user_stats(&self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
        Ok(self.stats(user))
    }

    fn load_mpa_boundaries(&self, region: &BoundingBox) -> Result<Vec<MpaBoundary>, StoreError> {
        self.boundary_loads.fetch_add(1, Ordering::SeqCst);
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
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
        Ok(self.observation(id))
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

    fn leaderboard(&self, _limit: usize) -> Result<Vec<UserStats>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.stats.values().cloned().collect())
    }
}

/// Reads succeed but every commit fails, as when the database drops mid-request.
pub(super) struct CommitFailsStore {
    pub(super) inner: MemoryStore,
}

impl GamificationStore for CommitFailsStore {
    fn load_user_stats(&self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
        self.inner.load_user_stats(user)
    }

    fn load_mpa_boundaries(&self, region: &BoundingBox) -> Result<Vec<MpaBoundary>, StoreError> {
        self.inner.load_mpa_boundaries(region)
    }

    fn load_observation(&self, id: &ObservationId) -> Result<Option<Observation>, StoreError> {
        self.inner.load_observation(id)
    }

    fn commit(&self, _unit: UnitOfWork) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<UserStats>, StoreError> {
        self.inner.leaderboard(limit)
    }
}

pub(super) struct UnavailableStore;

impl GamificationStore for UnavailableStore {
    fn load_user_stats(&self, _user: &UserId) -> Result<Option<UserStats>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn load_mpa_boundaries(&self, _region: &BoundingBox) -> Result<Vec<MpaBoundary>, StoreError> {
        Err(StoreError::Unavailable("geometry service offline".to_string()))
    }

    fn load_observation(&self, _id: &ObservationId) -> Result<Option<Observation>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn commit(&self, _unit: UnitOfWork) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn leaderboard(&self, _limit: usize) -> Result<Vec<UserStats>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
