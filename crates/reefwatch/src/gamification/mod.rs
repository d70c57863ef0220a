//! Observation scoring, badge awards, and Marine Protected Area attribution.
//!
//! Scoring and badge rules are pure and driven by an explicit `ScoringTable`; the
//! `GamificationEngine` layers per-user serialisation and the verification state
//! machine on top and persists through a `GamificationStore`.

pub mod badges;
pub mod domain;
pub mod engine;
pub mod geo;
pub mod repository;
pub mod scoring;
pub mod stats;

#[cfg(test)]
mod tests;

pub use badges::{Badge, BadgeEvaluator};
pub use domain::{
    Observation, ObservationId, ObservationType, UserId, Verification, VerificationId,
    VerificationOutcome, VerificationState,
};
pub use engine::{
    AwardEvent, AwardResult, CancellationFlag, GamificationEngine, GamificationError,
};
pub use geo::{
    contains, find_all_containing, find_containing_mpa, BoundingBox, CoordinateError, GeoPoint,
    MpaBoundary, MpaId,
};
pub use repository::{
    rank_contributors, GamificationStore, LeaderboardEntry, StoreError, UnitOfWork,
};
pub use scoring::{BadgeThresholds, PointItem, PointSource, Score, ScoreCalculator, ScoringTable};
pub use stats::{ContributionStreak, ContributorSummary, UserStats};
