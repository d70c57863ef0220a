//! Scoring and gamification core for citizen-science reef observations in The Bahamas.

pub mod config;
pub mod error;
pub mod gamification;
pub mod import;
pub mod telemetry;
