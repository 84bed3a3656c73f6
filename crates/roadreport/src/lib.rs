//! `roadreport` - Traffic violation reporting
//!
//! This library provides the report store, which keeps the history of
//! submitted violations as a single JSON collection, and the submission flow,
//! which uploads media to a classification endpoint and records the verdict.
//! A small assistant answers traffic-rules questions over a chat-completions API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod storage;
pub mod submission;

#[cfg(test)]
mod test_support;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use report::{NewReport, Report, ReportStatus};
pub use storage::{KeyValueBackend, MemoryBackend, ReportStats, ReportStore, SqliteBackend};
pub use submission::{Classifier, HttpClassifier, MediaFile, MediaKind, SubmissionFlow};
