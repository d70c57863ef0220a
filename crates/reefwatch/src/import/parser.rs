use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationRow {
    #[serde(rename = "Observation ID")]
    pub(crate) id: String,
    #[serde(rename = "Submitter")]
    pub(crate) submitter: String,
    #[serde(rename = "Type")]
    pub(crate) observation_type: String,
    #[serde(rename = "Longitude", default, deserialize_with = "empty_string_as_none")]
    pub(crate) longitude: Option<String>,
    #[serde(rename = "Latitude", default, deserialize_with = "empty_string_as_none")]
    pub(crate) latitude: Option<String>,
    #[serde(rename = "Has Photo", default)]
    pub(crate) has_photo: String,
    #[serde(rename = "Created At")]
    pub(crate) created_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerificationRow {
    #[serde(rename = "Verification ID")]
    pub(crate) id: String,
    #[serde(rename = "Observation ID")]
    pub(crate) observation_id: String,
    #[serde(rename = "Outcome")]
    pub(crate) outcome: String,
    #[serde(rename = "Photo Evidence", default)]
    pub(crate) photo_evidence: String,
    #[serde(rename = "Verifier")]
    pub(crate) verifier: String,
    #[serde(rename = "Verified At")]
    pub(crate) verified_at: String,
}

pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}
