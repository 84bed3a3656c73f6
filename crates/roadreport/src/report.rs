//! Core report types for roadreport.
//!
//! A [`Report`] is one submitted traffic-violation observation. Reports are
//! created from a [`NewReport`], which may leave the id and timestamp for the
//! store to fill in.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Prefix of generated report ids.
pub const REPORT_ID_PREFIX: &str = "report_";

/// Review state of a report.
///
/// Always written in lowercase. Reading accepts any casing, since older
/// records were stored as `Submitted`, `Accepted` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportStatus {
    /// Sent for review.
    #[default]
    Submitted,
    /// Accepted as a valid violation.
    Accepted,
    /// Rejected on review.
    Rejected,
}

impl ReportStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Submitted, Self::Accepted, Self::Rejected];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for ReportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A persisted traffic-violation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique identifier, `report_<millis>` when generated.
    pub id: String,

    /// When the report was created.
    pub timestamp: DateTime<Utc>,

    /// Free-text location.
    pub location: String,

    /// Free-text violation classification.
    pub violation_type: String,

    /// Review state.
    pub status: ReportStatus,

    /// Classifier confidence score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Local reference to the submitted media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_uri: Option<String>,

    /// Structured details returned by the classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    /// The full classifier response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_results: Option<Value>,
}

/// Input to [`ReportStore::save`](crate::storage::ReportStore::save).
///
/// `id` and `timestamp` are filled in by the store when absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReport {
    /// Caller-chosen id.
    pub id: Option<String>,
    /// Caller-chosen creation time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-text location.
    pub location: String,
    /// Free-text violation classification.
    pub violation_type: String,
    /// Review state.
    pub status: ReportStatus,
    /// Classifier confidence score.
    pub confidence: Option<f64>,
    /// Local reference to the submitted media.
    pub video_uri: Option<String>,
    /// Structured details returned by the classifier.
    pub details: Option<Value>,
    /// The full classifier response.
    pub ml_results: Option<Value>,
}

impl NewReport {
    /// Create a submitted report with the given location and violation type.
    #[must_use]
    pub fn new(location: impl Into<String>, violation_type: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            violation_type: violation_type.into(),
            ..Self::default()
        }
    }

    /// Set an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an explicit creation time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }

    /// Turn this into a [`Report`], filling a missing id and timestamp from `now`.
    #[must_use]
    pub fn into_report(self, now: DateTime<Utc>) -> Report {
        let timestamp = self.timestamp.unwrap_or(now);
        Report {
            id: self.id.unwrap_or_else(|| generate_id(now)),
            timestamp,
            location: self.location,
            violation_type: self.violation_type,
            status: self.status,
            confidence: self.confidence,
            video_uri: self.video_uri,
            details: self.details,
            ml_results: self.ml_results,
        }
    }
}

/// Generate a report id from a creation time.
#[must_use]
pub fn generate_id(at: DateTime<Utc>) -> String {
    format!("{REPORT_ID_PREFIX}{}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_status_display_is_lowercase() {
        assert_eq!(ReportStatus::Submitted.to_string(), "submitted");
        assert_eq!(ReportStatus::Accepted.to_string(), "accepted");
        assert_eq!(ReportStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_status_parse_any_casing() {
        assert_eq!("Submitted".parse(), Ok(ReportStatus::Submitted));
        assert_eq!("ACCEPTED".parse(), Ok(ReportStatus::Accepted));
        assert_eq!(" rejected ".parse(), Ok(ReportStatus::Rejected));
        assert!("pending".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_status_default() {
        assert_eq!(ReportStatus::default(), ReportStatus::Submitted);
    }

    #[test]
    fn test_status_deserialize_normalises() {
        let status: ReportStatus = serde_json::from_str("\"Accepted\"").unwrap();
        assert_eq!(status, ReportStatus::Accepted);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"accepted\"");
    }

    #[test]
    fn test_generate_id() {
        let id = generate_id(fixed_time());
        assert_eq!(id, format!("report_{}", fixed_time().timestamp_millis()));
    }

    #[test]
    fn test_into_report_fills_missing_fields() {
        let report = NewReport::new("Lahore", "Speeding").into_report(fixed_time());
        assert!(report.id.starts_with(REPORT_ID_PREFIX));
        assert_eq!(report.timestamp, fixed_time());
        assert_eq!(report.status, ReportStatus::Submitted);
        assert!(report.confidence.is_none());
    }

    #[test]
    fn test_into_report_keeps_caller_values() {
        let earlier = fixed_time() - chrono::Duration::hours(2);
        let report = NewReport::new("Islamabad", "Signal Violation")
            .with_id("custom")
            .with_timestamp(earlier)
            .with_status(ReportStatus::Rejected)
            .into_report(fixed_time());
        assert_eq!(report.id, "custom");
        assert_eq!(report.timestamp, earlier);
        assert_eq!(report.status, ReportStatus::Rejected);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut report = NewReport::new("Lahore", "Speeding").into_report(fixed_time());
        report.video_uri = Some("/tmp/clip.mp4".to_string());
        report.ml_results = Some(serde_json::json!({"status": "submitted"}));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("violationType").is_some());
        assert!(json.get("videoUri").is_some());
        assert!(json.get("mlResults").is_some());
        assert!(json.get("violation_type").is_none());
        // absent optionals are omitted
        assert!(json.get("confidence").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_report_reads_legacy_capitalised_record() {
        let json = r#"{
            "id": "report_1700000000000",
            "timestamp": "2023-11-14T22:13:20.000Z",
            "location": "Blue Area, Islamabad, PK",
            "violationType": "Speeding",
            "status": "Submitted",
            "confidence": 85
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.status, ReportStatus::Submitted);
        assert_eq!(report.confidence, Some(85.0));
        assert!(report.video_uri.is_none());
    }
}
