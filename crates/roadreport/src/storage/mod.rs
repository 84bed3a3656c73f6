//! Storage layer for roadreport.
//!
//! All reports live as one JSON array under a single backing key of a
//! [`KeyValueBackend`]. Every mutation loads the whole array and writes it
//! back; there is no per-record storage and no locking between operations,
//! so two concurrent saves can race and the last write wins.

pub mod backend;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub use backend::KeyValueBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::error::{Error, Result};
use crate::report::{NewReport, Report, ReportStatus, REPORT_ID_PREFIX};

/// Default backing key for the report collection.
pub const DEFAULT_BACKING_KEY: &str = "traffic_reports";

/// Newest-first collection of reports persisted under one backing key.
#[derive(Debug, Clone)]
pub struct ReportStore<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueBackend> ReportStore<B> {
    /// Create a store using the default backing key.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_BACKING_KEY)
    }

    /// Create a store using a custom backing key.
    #[must_use]
    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// The backing key holding the collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Save a report, newest first, and return the updated collection.
    ///
    /// A missing id becomes `report_<millis>`; a missing timestamp becomes now.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails, the stored collection is corrupt,
    /// or a caller-supplied id is already present.
    pub async fn save(&self, report: NewReport) -> Result<Vec<Report>> {
        self.save_at(report, Utc::now()).await
    }

    /// Like [`save`](Self::save), with an explicit notion of "now".
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub async fn save_at(&self, mut report: NewReport, now: DateTime<Utc>) -> Result<Vec<Report>> {
        let mut reports = self.load().await?;

        let id = match report.id.take() {
            Some(id) if reports.iter().any(|r| r.id == id) => {
                return Err(Error::DuplicateReport { id });
            }
            Some(id) => id,
            None => unused_generated_id(&reports, now),
        };
        report.id = Some(id);

        let report = report.into_report(now);
        debug!("Saving report {} under key {}", report.id, self.key);
        reports.insert(0, report);
        self.write(&reports).await?;
        Ok(reports)
    }

    /// All reports, newest first. Empty when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn get_all(&self) -> Result<Vec<Report>> {
        self.load().await
    }

    /// The first report with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Report>> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    /// Reports with the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn get_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let mut reports = self.load().await?;
        reports.retain(|r| r.status == status);
        Ok(reports)
    }

    /// Remove every report with the given id and return what remains.
    ///
    /// The collection is rewritten even when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn delete_by_id(&self, id: &str) -> Result<Vec<Report>> {
        let mut reports = self.load().await?;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        debug!("Deleting report {}: {} removed", id, before - reports.len());
        self.write(&reports).await?;
        Ok(reports)
    }

    /// Remove the backing key entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn clear_all(&self) -> Result<()> {
        self.backend.remove(&self.key).await?;
        info!("Cleared all reports under key {}", self.key);
        Ok(())
    }

    /// Number of stored reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Summary of the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection is corrupt.
    pub async fn stats(&self) -> Result<ReportStats> {
        Ok(ReportStats::from_reports(&self.load().await?))
    }

    async fn load(&self) -> Result<Vec<Report>> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| Error::CorruptCollection {
            key: self.key.clone(),
            source,
        })
    }

    async fn write(&self, reports: &[Report]) -> Result<()> {
        let json = serde_json::to_string(reports)?;
        self.backend.set(&self.key, &json).await
    }
}

/// Pick `report_<millis>` for `now`, stepping forward a millisecond at a time
/// past ids that are already taken.
fn unused_generated_id(reports: &[Report], now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("{REPORT_ID_PREFIX}{millis}");
        if !reports.iter().any(|r| r.id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}

/// Statistics about the stored reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Total number of reports.
    pub total: usize,
    /// Reports still awaiting review.
    pub submitted: usize,
    /// Reports accepted on review.
    pub accepted: usize,
    /// Reports rejected on review.
    pub rejected: usize,
    /// Timestamp of the oldest report.
    pub oldest: Option<DateTime<Utc>>,
    /// Timestamp of the newest report.
    pub newest: Option<DateTime<Utc>>,
}

impl ReportStats {
    /// Compute statistics over a collection.
    #[must_use]
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut stats = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status {
                ReportStatus::Submitted => stats.submitted += 1,
                ReportStatus::Accepted => stats.accepted += 1,
                ReportStatus::Rejected => stats.rejected += 1,
            }
        }
        stats.oldest = reports.iter().map(|r| r.timestamp).min();
        stats.newest = reports.iter().map(|r| r.timestamp).max();
        stats
    }

    /// Count for one status.
    #[must_use]
    pub fn count_for(&self, status: ReportStatus) -> usize {
        match status {
            ReportStatus::Submitted => self.submitted,
            ReportStatus::Accepted => self.accepted,
            ReportStatus::Rejected => self.rejected,
        }
    }
}
