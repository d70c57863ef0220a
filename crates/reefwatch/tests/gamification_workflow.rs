//! End-to-end scenarios driven through the public engine facade and export importers,
//! without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use reefwatch::gamification::{
        BoundingBox, GamificationEngine, GamificationStore, MpaBoundary, Observation,
        ObservationId, ScoringTable, StoreError, UnitOfWork, UserId, UserStats,
    };

    #[derive(Default)]
    struct State {
        stats: HashMap<UserId, UserStats>,
        observations: HashMap<ObservationId, Observation>,
        boundaries: Vec<MpaBoundary>,
    }

    #[derive(Default, Clone)]
    pub struct MemoryStore {
        state: Arc<Mutex<State>>,
    }

    impl MemoryStore {
        pub fn with_boundaries(boundaries: Vec<MpaBoundary>) -> Self {
            let store = Self::default();
            store.state.lock().expect("store mutex poisoned").boundaries = boundaries;
            store
        }

        pub fn stats(&self, user: &str) -> Option<UserStats> {
            self.state
                .lock()
                .expect("store mutex poisoned")
                .stats
                .get(&UserId(user.to_string()))
                .cloned()
        }
    }

    impl GamificationStore for MemoryStore {
        fn load_user_stats(&self, user: &UserId) -> Result<Option<UserStats>, StoreError> {
            let guard = self.state.lock().expect("store mutex poisoned");
            Ok(guard.stats.get(user).cloned())
        }

        fn load_mpa_boundaries(
            &self,
            region: &BoundingBox,
        ) -> Result<Vec<MpaBoundary>, StoreError> {
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

        fn leaderboard(&self, _limit: usize) -> Result<Vec<UserStats>, StoreError> {
            let guard = self.state.lock().expect("store mutex poisoned");
            Ok(guard.stats.values().cloned().collect())
        }
    }

    pub const BOUNDARIES: &str = r#"[
        {
            "id": "mpa-exuma",
            "name": "Exuma Cays Land and Sea Park",
            "ring": [
                {"longitude": -77.5, "latitude": 24.9},
                {"longitude": -77.5, "latitude": 25.2},
                {"longitude": -77.2, "latitude": 25.2},
                {"longitude": -77.2, "latitude": 24.9}
            ]
        }
    ]"#;

    pub fn engine() -> (GamificationEngine<MemoryStore>, MemoryStore) {
        let boundaries = reefwatch::import::ExportImporter::boundaries_from_reader(
            std::io::Cursor::new(BOUNDARIES),
        )
        .expect("boundaries parse");
        let store = MemoryStore::with_boundaries(boundaries);
        let engine = GamificationEngine::new(
            Arc::new(store.clone()),
            ScoringTable::default(),
            BoundingBox::BAHAMAS,
        );
        (engine, store)
    }
}

use std::collections::HashMap;
use std::io::Cursor;

use common::engine;
use reefwatch::gamification::{
    AwardEvent, Badge, CancellationFlag, GamificationError, ObservationId, ObservationType,
    VerificationOutcome,
};
use reefwatch::import::ExportImporter;

const OBSERVATIONS: &str = "\
Observation ID,Submitter,Type,Longitude,Latitude,Has Photo,Created At
obs-1,diver-7,CoralBleaching,-77.35,25.05,yes,2025-06-01T14:00:00Z
obs-2,diver-7,WildlifeSighting,-75.10,23.50,no,2025-06-02T09:15:00Z
obs-3,snorkeler-2,IllegalFishing,,,yes,2025-06-02T11:00:00Z
";

const VERIFICATIONS: &str = "\
Verification ID,Observation ID,Outcome,Photo Evidence,Verifier,Verified At
ver-1,obs-1,Approved,yes,reviewer-1,2025-06-03T10:00:00Z
ver-2,obs-2,Approved,no,reviewer-1,2025-06-03T10:05:00Z
ver-3,obs-3,Rejected,yes,reviewer-2,2025-06-03T10:10:00Z
";

#[test]
fn imported_exports_replay_into_expected_totals() {
    let (engine, store) = engine();
    let cancel = CancellationFlag::new();
    let observations =
        ExportImporter::observations_from_reader(Cursor::new(OBSERVATIONS)).expect("parse");
    let verifications =
        ExportImporter::verifications_from_reader(Cursor::new(VERIFICATIONS)).expect("parse");

    let mut created = Vec::new();
    for observation in &observations {
        created.push(
            engine
                .apply_creation(observation.clone(), &cancel)
                .expect("creation scored"),
        );
    }
    assert_eq!(
        created
            .iter()
            .map(|award| award.points_delta)
            .collect::<Vec<_>>(),
        vec![15, 7, 8]
    );

    let by_id: HashMap<ObservationId, _> = observations
        .iter()
        .map(|observation| (observation.id.clone(), observation))
        .collect();
    let mut deltas = Vec::new();
    for verification in &verifications {
        let observation = by_id[&verification.observation_id];
        let award = engine
            .apply_verification(observation, verification, &cancel)
            .expect("verification scored");
        deltas.push(award.points_delta);
    }
    assert_eq!(deltas, vec![40, 25, -5]);

    let diver = store.stats("diver-7").expect("diver stats");
    assert_eq!(diver.total_points, 15 + 7 + 40 + 25);
    assert_eq!(diver.verified_observations, 2);
    assert_eq!(diver.streak.current_days(), 2);

    let snorkeler = store.stats("snorkeler-2").expect("snorkeler stats");
    assert_eq!(snorkeler.total_points, 8 - 5);
    assert_eq!(snorkeler.rejected_observations, 1);
    assert_eq!(snorkeler.verification_accuracy(), 0.0);

    let board = engine.leaderboard(10).expect("leaderboard");
    assert_eq!(board[0].user.0, "diver-7");
    assert_eq!(board[1].user.0, "snorkeler-2");
}

#[test]
fn replaying_a_verification_is_refused() {
    let (engine, store) = engine();
    let cancel = CancellationFlag::new();
    let observations =
        ExportImporter::observations_from_reader(Cursor::new(OBSERVATIONS)).expect("parse");
    let verifications =
        ExportImporter::verifications_from_reader(Cursor::new(VERIFICATIONS)).expect("parse");

    engine
        .apply_creation(observations[0].clone(), &cancel)
        .expect("creation scored");
    let first = engine
        .apply_verification(&observations[0], &verifications[0], &cancel)
        .expect("verification scored");
    assert_eq!(
        first.event,
        AwardEvent::Verified(VerificationOutcome::Approved)
    );

    let replay = engine.apply_verification(&observations[0], &verifications[0], &cancel);
    assert!(matches!(
        replay,
        Err(GamificationError::InvalidStateTransition { .. })
    ));
    assert_eq!(
        store.stats("diver-7").expect("stats").total_points,
        15 + 40
    );
}

#[test]
fn badges_are_awarded_once_across_many_submissions() {
    let (engine, store) = engine();
    let cancel = CancellationFlag::new();
    let template = ExportImporter::observations_from_reader(Cursor::new(OBSERVATIONS))
        .expect("parse")
        .remove(0);

    let mut earned = Vec::new();
    for index in 0..30 {
        let mut observation = template.clone();
        observation.id = ObservationId(format!("bulk-{index}"));
        let award = engine
            .apply_creation(observation, &cancel)
            .expect("creation scored");
        earned.extend(award.newly_earned_badges);
    }

    assert_eq!(
        earned,
        vec![Badge::TenObservations, Badge::MpaGuardian, Badge::CoralExpert]
    );
    let stats = store.stats("diver-7").expect("stats");
    assert_eq!(stats.type_count(ObservationType::CoralBleaching), 30);
    assert_eq!(stats.badges.len(), 3);
}
