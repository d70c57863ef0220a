//! Readers for field-app exports: observation and verification CSVs plus MPA boundary JSON.

mod parser;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::gamification::{
    CoordinateError, GeoPoint, MpaBoundary, Observation, ObservationId, ObservationType, UserId,
    Verification, VerificationId, VerificationOutcome, VerificationState,
};
use parser::{ObservationRow, VerificationRow};

#[derive(Debug)]
pub enum ExportImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    InvalidRow { row: usize, reason: String },
}

impl std::fmt::Display for ExportImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportImportError::Io(err) => write!(f, "failed to read export: {}", err),
            ExportImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ExportImportError::Json(err) => write!(f, "invalid boundary JSON: {}", err),
            ExportImportError::InvalidRow { row, reason } => {
                write!(f, "row {} rejected: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for ExportImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportImportError::Io(err) => Some(err),
            ExportImportError::Csv(err) => Some(err),
            ExportImportError::Json(err) => Some(err),
            ExportImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for ExportImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExportImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ExportImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub struct ExportImporter;

impl ExportImporter {
    pub fn observations_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<Observation>, ExportImportError> {
        Self::observations_from_reader(File::open(path)?)
    }

    /// Rows are numbered from 1, excluding the header.
    pub fn observations_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<Observation>, ExportImportError> {
        parser::parse_rows::<_, ObservationRow>(reader)?
            .into_iter()
            .enumerate()
            .map(|(index, row)| observation_from_row(index + 1, row))
            .collect()
    }

    pub fn verifications_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<Verification>, ExportImportError> {
        Self::verifications_from_reader(File::open(path)?)
    }

    pub fn verifications_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<Verification>, ExportImportError> {
        parser::parse_rows::<_, VerificationRow>(reader)?
            .into_iter()
            .enumerate()
            .map(|(index, row)| verification_from_row(index + 1, row))
            .collect()
    }

    pub fn boundaries_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<MpaBoundary>, ExportImportError> {
        Self::boundaries_from_reader(File::open(path)?)
    }

    pub fn boundaries_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<MpaBoundary>, ExportImportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

fn observation_from_row(row: usize, raw: ObservationRow) -> Result<Observation, ExportImportError> {
    let location = match (raw.longitude.as_deref(), raw.latitude.as_deref()) {
        (Some(longitude), Some(latitude)) => Some(
            parse_point(longitude, latitude)
                .map_err(|reason| ExportImportError::InvalidRow { row, reason })?,
        ),
        (None, None) => None,
        _ => {
            return Err(ExportImportError::InvalidRow {
                row,
                reason: "longitude and latitude must both be present or both empty".to_string(),
            })
        }
    };

    let created_at =
        parser::parse_timestamp(&raw.created_at).ok_or_else(|| ExportImportError::InvalidRow {
            row,
            reason: format!("unparseable timestamp '{}'", raw.created_at),
        })?;

    Ok(Observation {
        id: ObservationId(raw.id),
        submitter: UserId(raw.submitter),
        location,
        has_photo: parser::parse_flag(&raw.has_photo),
        observation_type: ObservationType::parse_lenient(&raw.observation_type),
        created_at,
        verification: VerificationState::Unverified,
    })
}

fn verification_from_row(
    row: usize,
    raw: VerificationRow,
) -> Result<Verification, ExportImportError> {
    let outcome = match raw.outcome.trim().to_ascii_lowercase().as_str() {
        "approved" | "approve" | "verified" => VerificationOutcome::Approved,
        "rejected" | "reject" => VerificationOutcome::Rejected,
        other => {
            return Err(ExportImportError::InvalidRow {
                row,
                reason: format!("unknown verification outcome '{other}'"),
            })
        }
    };

    let verified_at =
        parser::parse_timestamp(&raw.verified_at).ok_or_else(|| ExportImportError::InvalidRow {
            row,
            reason: format!("unparseable timestamp '{}'", raw.verified_at),
        })?;

    Ok(Verification {
        id: VerificationId(raw.id),
        observation_id: ObservationId(raw.observation_id),
        outcome,
        has_photo_evidence: parser::parse_flag(&raw.photo_evidence),
        verifier: UserId(raw.verifier),
        verified_at,
    })
}

fn parse_point(longitude: &str, latitude: &str) -> Result<GeoPoint, String> {
    let longitude: f64 = longitude
        .trim()
        .parse()
        .map_err(|_| format!("longitude '{longitude}' is not a number"))?;
    let latitude: f64 = latitude
        .trim()
        .parse()
        .map_err(|_| format!("latitude '{latitude}' is not a number"))?;
    GeoPoint::new(longitude, latitude).map_err(|err: CoordinateError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OBSERVATIONS: &str = "\
Observation ID,Submitter,Type,Longitude,Latitude,Has Photo,Created At
obs-1,diver-7,Coral Bleaching,-77.35,25.05,yes,2025-06-01T14:00:00Z
obs-2,diver-7,Sea Serpent,,,no,2025-06-02
";

    #[test]
    fn observations_import_with_optional_gps_and_unknown_types() {
        let observations = ExportImporter::observations_from_reader(Cursor::new(OBSERVATIONS))
            .expect("observations parse");

        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations[0].observation_type,
            ObservationType::CoralBleaching
        );
        assert!(observations[0].has_photo);
        assert!(observations[0].location.is_some());
        assert_eq!(
            observations[1].observation_type,
            ObservationType::Unrecognized
        );
        assert!(observations[1].location.is_none());
        assert!(!observations[1].has_photo);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected_with_row_number() {
        let csv = "\
Observation ID,Submitter,Type,Longitude,Latitude,Has Photo,Created At
obs-1,diver-7,ReefHealth,-77.35,25.05,no,2025-06-01
obs-2,diver-7,ReefHealth,-277.35,25.05,no,2025-06-01
";
        match ExportImporter::observations_from_reader(Cursor::new(csv)) {
            Err(ExportImportError::InvalidRow { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("longitude"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn verifications_require_a_known_outcome() {
        let csv = "\
Verification ID,Observation ID,Outcome,Photo Evidence,Verifier,Verified At
ver-1,obs-1,Approved,true,reviewer-1,2025-06-03T09:30:00Z
ver-2,obs-2,Maybe,false,reviewer-1,2025-06-03
";
        match ExportImporter::verifications_from_reader(Cursor::new(csv)) {
            Err(ExportImportError::InvalidRow { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected invalid outcome, got {other:?}"),
        }
    }

    #[test]
    fn boundaries_reject_invalid_vertices() {
        let json = r#"[{"id":"mpa-1","name":"Bad","ring":[{"longitude":-200.0,"latitude":25.0}]}]"#;
        assert!(matches!(
            ExportImporter::boundaries_from_reader(Cursor::new(json)),
            Err(ExportImportError::Json(_))
        ));
    }
}
