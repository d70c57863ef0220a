use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use reefwatch::config::AppConfig;
use reefwatch::error::AppError;
use reefwatch::gamification::{
    AwardEvent, AwardResult, CancellationFlag, GamificationEngine, GamificationError,
    MpaBoundary, Observation, ObservationId, Verification,
};
use reefwatch::import::ExportImporter;
use tracing::warn;

use crate::infra::InMemoryGamificationStore;

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    /// Observation export CSV
    #[arg(long)]
    pub(crate) observations: PathBuf,
    /// Optional verification export CSV, applied after every observation
    #[arg(long)]
    pub(crate) verifications: Option<PathBuf>,
    /// Optional MPA boundary JSON (array of boundaries)
    #[arg(long)]
    pub(crate) boundaries: Option<PathBuf>,
    /// Number of leaderboard rows to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
    /// Emit each award as a JSON line instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_replay(args: ReplayArgs, config: &AppConfig) -> Result<(), AppError> {
    let ReplayArgs {
        observations,
        verifications,
        boundaries,
        top,
        json,
    } = args;

    let observations = ExportImporter::observations_from_path(observations)?;
    let verifications = match verifications {
        Some(path) => ExportImporter::verifications_from_path(path)?,
        None => Vec::new(),
    };
    let boundaries = match boundaries {
        Some(path) => ExportImporter::boundaries_from_path(path)?,
        None => Vec::new(),
    };

    replay_events(config, boundaries, observations, verifications, top, json)
}

/// Feeds creations then verifications through a fresh engine and prints the outcome.
/// Caller errors skip the offending event; store failures abort the run.
pub(crate) fn replay_events(
    config: &AppConfig,
    boundaries: Vec<MpaBoundary>,
    observations: Vec<Observation>,
    verifications: Vec<Verification>,
    top: usize,
    json: bool,
) -> Result<(), AppError> {
    let store = Arc::new(InMemoryGamificationStore::with_boundaries(boundaries));
    let engine = GamificationEngine::new(store.clone(), config.scoring.clone(), config.region);
    let cancel = CancellationFlag::new();

    if !json {
        println!(
            "Replaying {} observation(s) and {} verification(s) against {} MPA boundary(ies)",
            observations.len(),
            verifications.len(),
            store.boundary_count()
        );
    }

    let mut known: HashMap<ObservationId, Observation> = HashMap::new();
    let mut skipped = 0usize;

    for observation in observations {
        match engine.apply_creation(observation.clone(), &cancel) {
            Ok(award) => {
                render_award(&award, json)?;
                known.insert(observation.id.clone(), observation);
            }
            Err(err) if is_caller_error(&err) => {
                warn!(observation = %observation.id, error = %err, "skipping observation");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    for verification in verifications {
        let Some(observation) = known.get(&verification.observation_id) else {
            warn!(
                verification = %verification.id,
                observation = %verification.observation_id,
                "verification references an observation that was not recorded"
            );
            skipped += 1;
            continue;
        };

        match engine.apply_verification(observation, &verification, &cancel) {
            Ok(award) => render_award(&award, json)?,
            Err(err) if is_caller_error(&err) => {
                warn!(verification = %verification.id, error = %err, "skipping verification");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if json {
        return Ok(());
    }

    if skipped > 0 {
        println!("\n{skipped} event(s) skipped; see log output for details");
    }

    println!("\nLeaderboard");
    for entry in engine.leaderboard(top)? {
        println!(
            "  {:>2}. {:<20} {:>6} pts  {} badge(s)",
            entry.rank, entry.user.0, entry.total_points, entry.badge_count
        );
    }

    Ok(())
}

fn is_caller_error(err: &GamificationError) -> bool {
    matches!(
        err,
        GamificationError::InvalidCoordinate(_)
            | GamificationError::InvalidStateTransition { .. }
            | GamificationError::MismatchedVerification { .. }
            | GamificationError::SubmitterMismatch { .. }
            | GamificationError::ObservationNotFound(_)
    )
}

fn render_award(award: &AwardResult, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string(award)?);
        return Ok(());
    }

    let event = match award.event {
        AwardEvent::Created => "created".to_string(),
        AwardEvent::Verified(outcome) => format!("verified ({})", outcome.label()),
    };
    println!(
        "- {} by {} {}: {:+} pts -> total {}",
        award.observation_id.0, award.user.0, event, award.points_delta, award.total_points
    );
    for item in &award.breakdown {
        println!("    {:+4}  {}", item.points, item.notes);
    }
    if let Some(mpa) = &award.containing_mpa {
        println!("    inside MPA {}", mpa.0);
    }
    if !award.newly_earned_badges.is_empty() {
        let labels: Vec<&str> = award
            .newly_earned_badges
            .iter()
            .map(|badge| badge.label())
            .collect();
        println!("    badges earned: {}", labels.join(", "));
    }
    Ok(())
}
