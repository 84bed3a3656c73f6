//! The classifier's verdict and its mapping onto a report.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::config::ReportDefaults;
use crate::report::{NewReport, ReportStatus};

use super::MediaFile;

/// Fields of interest in a classifier response.
///
/// Every field is optional: the endpoint may leave any of them out, send
/// `null`, an empty string or a zero, and each of those falls back to a
/// configured default when the report is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierResponse {
    /// Where the violation happened.
    pub location: Option<String>,
    /// What kind of violation was detected.
    pub violation_type: Option<String>,
    /// Mean detection confidence.
    pub average_confidence: Option<f64>,
    /// Structured details.
    pub details: Option<Value>,
    /// Review status assigned by the server.
    pub status: Option<ReportStatus>,
    /// The response exactly as received.
    pub raw: Value,
}

impl ClassifierResponse {
    /// Extract the known fields from a JSON response body.
    ///
    /// Never fails: unusable values are treated as absent.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let status = non_empty_str(&raw, "status").and_then(|s| match s.parse() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Ignoring classifier status: {e}");
                None
            }
        });

        Self {
            location: non_empty_str(&raw, "location"),
            violation_type: non_empty_str(&raw, "violation_type"),
            average_confidence: confidence(&raw),
            details: raw.get("details").filter(|v| !is_falsy(v)).cloned(),
            status,
            raw,
        }
    }

    /// Build the report to save, substituting defaults for missing fields.
    #[must_use]
    pub fn into_new_report(
        self,
        defaults: &ReportDefaults,
        media: &MediaFile,
        received_at: DateTime<Utc>,
    ) -> NewReport {
        NewReport {
            id: None,
            timestamp: Some(received_at),
            location: self.location.unwrap_or_else(|| defaults.location.clone()),
            violation_type: self
                .violation_type
                .unwrap_or_else(|| defaults.violation_type.clone()),
            status: self.status.unwrap_or(defaults.status),
            confidence: Some(self.average_confidence.unwrap_or(defaults.confidence)),
            video_uri: Some(media.uri()),
            details: Some(
                self.details
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            ),
            ml_results: Some(self.raw),
        }
    }
}

fn non_empty_str(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `null`, `false`, zero and the empty string.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn confidence(raw: &Value) -> Option<f64> {
    let value = raw.get("average_confidence")?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (number.is_finite() && number != 0.0).then_some(number)
}
