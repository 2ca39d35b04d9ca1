//! Remote version endpoint access.

use crate::error::{Result, WatchError};

/// A fresh observation from the version endpoint.
///
/// Both fields are opaque identifiers compared by equality; `version_date`
/// is never parsed as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub platform_version: String,
    pub version_date: String,
}

/// Fetch the current version record.
///
/// The endpoint must return a JSON object carrying the two configured
/// fields as strings. A missing or non-string field is a
/// [`WatchError::MissingField`], so a half-populated response never looks
/// like a change.
pub async fn fetch_version_record(
    client: &reqwest::Client,
    endpoint: &str,
    version_field: &str,
    date_field: &str,
) -> Result<VersionRecord> {
    let body = client
        .get(endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(WatchError::Fetch)?
        .error_for_status()
        .map_err(WatchError::Fetch)?
        .text()
        .await
        .map_err(WatchError::Fetch)?;

    let value: serde_json::Value = serde_json::from_str(&body).map_err(WatchError::Parse)?;

    Ok(VersionRecord {
        platform_version: string_field(&value, version_field)?,
        version_date: string_field(&value, date_field)?,
    })
}

fn string_field(value: &serde_json::Value, field: &str) -> Result<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| WatchError::missing_field(field))
}
