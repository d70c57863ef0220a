use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use reefwatch::config::AppConfig;
use reefwatch::error::AppError;
use reefwatch::gamification::{
    GamificationError, GeoPoint, MpaBoundary, MpaId, Observation, ObservationId,
    ObservationType, UserId, Verification, VerificationId, VerificationOutcome,
    VerificationState,
};

use crate::replay::replay_events;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the scenario (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub(crate) start: Option<NaiveDate>,
    /// Emit each award as a JSON line instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(|| Utc::now().date_naive());
    let scenario = DemoScenario::build(start)?;
    replay_events(
        config,
        scenario.boundaries,
        scenario.observations,
        scenario.verifications,
        10,
        args.json,
    )
}

struct DemoScenario {
    boundaries: Vec<MpaBoundary>,
    observations: Vec<Observation>,
    verifications: Vec<Verification>,
}

impl DemoScenario {
    fn build(start: NaiveDate) -> Result<Self, AppError> {
        let morning = Utc.from_utc_datetime(&start.and_time(NaiveTime::default()))
            + Duration::hours(9);

        let boundaries = vec![MpaBoundary {
            id: MpaId("mpa-exuma".to_string()),
            name: "Exuma Cays Land and Sea Park".to_string(),
            ring: vec![
                point(-77.5, 24.9)?,
                point(-77.5, 25.2)?,
                point(-77.2, 25.2)?,
                point(-77.2, 24.9)?,
            ],
        }];

        let diver = UserId("diver-7".to_string());
        let snorkeler = UserId("snorkeler-2".to_string());
        let reviewer = UserId("reviewer-1".to_string());

        let observations = vec![
            observation(
                "obs-1",
                &diver,
                Some(point(-77.35, 25.05)?),
                true,
                ObservationType::CoralBleaching,
                morning,
            ),
            observation(
                "obs-2",
                &diver,
                Some(point(-75.1, 23.5)?),
                false,
                ObservationType::WildlifeSighting,
                morning + Duration::days(1),
            ),
            observation(
                "obs-3",
                &snorkeler,
                None,
                true,
                ObservationType::IllegalFishing,
                morning + Duration::days(1) + Duration::hours(2),
            ),
            // Off Venezuela; refused by the region check and skipped.
            observation(
                "obs-4",
                &snorkeler,
                Some(point(-66.9, 10.6)?),
                true,
                ObservationType::ReefHealth,
                morning + Duration::days(2),
            ),
        ];

        let reviewed_at = morning + Duration::days(2) + Duration::hours(1);
        let verifications = [
            ("ver-1", "obs-1", VerificationOutcome::Approved, true),
            ("ver-2", "obs-2", VerificationOutcome::Approved, false),
            ("ver-3", "obs-3", VerificationOutcome::Rejected, true),
        ]
        .into_iter()
        .map(|(id, target, outcome, evidence)| Verification {
            id: VerificationId(id.to_string()),
            observation_id: ObservationId(target.to_string()),
            outcome,
            has_photo_evidence: evidence,
            verifier: reviewer.clone(),
            verified_at: reviewed_at,
        })
        .collect();

        Ok(Self {
            boundaries,
            observations,
            verifications,
        })
    }
}

fn point(longitude: f64, latitude: f64) -> Result<GeoPoint, AppError> {
    GeoPoint::new(longitude, latitude).map_err(|err| GamificationError::from(err).into())
}

fn observation(
    id: &str,
    submitter: &UserId,
    location: Option<GeoPoint>,
    has_photo: bool,
    observation_type: ObservationType,
    created_at: DateTime<Utc>,
) -> Observation {
    Observation {
        id: ObservationId(id.to_string()),
        submitter: submitter.clone(),
        location,
        has_photo,
        observation_type,
        created_at,
        verification: VerificationState::Unverified,
    }
}
