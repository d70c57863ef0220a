use super::super::domain::{Observation, ObservationType, VerificationOutcome};
use super::config::ScoringTable;
use super::{PointItem, PointSource};

pub(crate) fn creation_items(
    observation: &Observation,
    inside_mpa: bool,
    table: &ScoringTable,
) -> Vec<PointItem> {
    let mut items = vec![PointItem {
        source: PointSource::BaseObservation,
        points: table.base_observation_points,
        notes: "observation submitted".to_string(),
    }];

    if observation.has_photo {
        items.push(PointItem {
            source: PointSource::PhotoBonus,
            points: table.photo_bonus_points,
            notes: "photo attached".to_string(),
        });
    }

    if let Some(location) = &observation.location {
        items.push(PointItem {
            source: PointSource::GpsBonus,
            points: table.gps_bonus_points,
            notes: format!("gps fix at {location}"),
        });
    }

    if inside_mpa {
        items.push(PointItem {
            source: PointSource::MpaBonus,
            points: table.mpa_bonus_points,
            notes: "inside a marine protected area".to_string(),
        });
    }

    items
}

pub(crate) fn verification_items(
    observation_type: ObservationType,
    outcome: VerificationOutcome,
    has_photo_evidence: bool,
    table: &ScoringTable,
) -> Vec<PointItem> {
    match outcome {
        VerificationOutcome::Rejected => vec![PointItem {
            source: PointSource::RejectionPenalty,
            points: -table.rejection_penalty_points,
            notes: "observation rejected by reviewer".to_string(),
        }],
        VerificationOutcome::Approved => {
            let mut items = vec![
                PointItem {
                    source: PointSource::VerificationBase,
                    points: table.verification_base_points,
                    notes: "observation approved".to_string(),
                },
                PointItem {
                    source: PointSource::TypeBonus(observation_type),
                    points: table.type_bonus(observation_type),
                    notes: format!("{} report", observation_type.label()),
                },
            ];

            if has_photo_evidence {
                items.push(PointItem {
                    source: PointSource::PhotoEvidenceBonus,
                    points: table.photo_evidence_bonus,
                    notes: "photo evidence confirmed".to_string(),
                });
            }

            items
        }
    }
}
