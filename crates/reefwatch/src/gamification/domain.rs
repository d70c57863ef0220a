use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Identifier wrapper for submitted field observations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservationId(pub String);

/// Identifier wrapper for reviewer verifications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerificationId(pub String);

/// Identifier for contributors and reviewers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event category reported by the contributor.
///
/// `Unrecognized` absorbs any value this build does not know about so that
/// newer clients never fail scoring; it is scored with the default type bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    CoralBleaching,
    IllegalFishing,
    WildlifeSighting,
    ReefHealth,
    Other,
    #[serde(other)]
    Unrecognized,
}

impl ObservationType {
    pub const fn label(self) -> &'static str {
        match self {
            ObservationType::CoralBleaching => "coral_bleaching",
            ObservationType::IllegalFishing => "illegal_fishing",
            ObservationType::WildlifeSighting => "wildlife_sighting",
            ObservationType::ReefHealth => "reef_health",
            ObservationType::Other => "other",
            ObservationType::Unrecognized => "unrecognized",
        }
    }

    /// Lenient parser used by the export importers; unknown labels map to `Unrecognized`.
    pub fn parse_lenient(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "coralbleaching" | "bleaching" => ObservationType::CoralBleaching,
            "illegalfishing" => ObservationType::IllegalFishing,
            "wildlifesighting" | "wildlife" => ObservationType::WildlifeSighting,
            "reefhealth" => ObservationType::ReefHealth,
            "other" => ObservationType::Other,
            _ => ObservationType::Unrecognized,
        }
    }
}

/// Reviewer judgment attached to an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationOutcome {
    Approved,
    Rejected,
}

impl VerificationOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationOutcome::Approved => "approved",
            VerificationOutcome::Rejected => "rejected",
        }
    }
}

/// Explicit lifecycle tag: an observation is verified exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerificationState {
    #[default]
    Unverified,
    Verified(VerificationOutcome),
}

impl VerificationState {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationState::Unverified => "unverified",
            VerificationState::Verified(VerificationOutcome::Approved) => "verified_approved",
            VerificationState::Verified(VerificationOutcome::Rejected) => "verified_rejected",
        }
    }

    pub const fn is_verified(self) -> bool {
        matches!(self, VerificationState::Verified(_))
    }
}

/// Field report submitted by a contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObservationId,
    pub submitter: UserId,
    pub location: Option<GeoPoint>,
    pub has_photo: bool,
    pub observation_type: ObservationType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub verification: VerificationState,
}

impl Observation {
    pub fn has_gps(&self) -> bool {
        self.location.is_some()
    }
}

/// Reviewer decision finalizing a single observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub id: VerificationId,
    pub observation_id: ObservationId,
    pub outcome: VerificationOutcome,
    pub has_photo_evidence: bool,
    pub verifier: UserId,
    pub verified_at: DateTime<Utc>,
}
