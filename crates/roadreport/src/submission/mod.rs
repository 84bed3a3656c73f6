//! Submission of a recorded violation for classification.
//!
//! A [`SubmissionFlow`] uploads one media file to a [`Classifier`], turns the
//! verdict into a report and saves it through the [`ReportStore`]. A simulated
//! progress value runs alongside the upload.

mod http;
mod progress;
mod response;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::{Config, ReportDefaults};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::storage::{KeyValueBackend, ReportStore};

pub use http::{HttpClassifier, MEDIA_FIELD};
pub use progress::{next_value, ProgressSettings, SimulatedProgress};
pub use response::ClassifierResponse;

/// What kind of media is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    /// A video clip.
    #[default]
    Video,
    /// A still photo.
    Photo,
}

impl MediaKind {
    /// Top-level MIME type.
    #[must_use]
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Photo => "image",
        }
    }

    fn fallback_extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Photo => "jpg",
        }
    }
}

/// A local media file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaFile {
    /// Describe the file at `path`.
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Media kind.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Lowercased file extension, or a per-kind fallback when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map_or_else(
                || self.kind.fallback_extension().to_string(),
                str::to_ascii_lowercase,
            )
    }

    /// File name sent with the multipart part.
    #[must_use]
    pub fn upload_file_name(&self) -> String {
        format!("video.{}", self.extension())
    }

    /// MIME type sent with the multipart part.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.kind.mime_prefix(), self.extension())
    }

    /// Location recorded in the saved report.
    #[must_use]
    pub fn uri(&self) -> String {
        self.path.display().to_string()
    }
}

/// Something that can judge a media file.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Upload `media` and return the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the request fails, or the
    /// endpoint rejects it.
    async fn classify(&self, media: &MediaFile) -> Result<ClassifierResponse>;
}

/// Uploads media, builds a report from the verdict and stores it.
#[derive(Debug)]
pub struct SubmissionFlow<C, B> {
    classifier: C,
    store: ReportStore<B>,
    defaults: ReportDefaults,
    progress: ProgressSettings,
}

impl<C: Classifier, B: KeyValueBackend> SubmissionFlow<C, B> {
    /// Create a flow with default report values and progress timing.
    pub fn new(classifier: C, store: ReportStore<B>) -> Self {
        Self {
            classifier,
            store,
            defaults: ReportDefaults::default(),
            progress: ProgressSettings::default(),
        }
    }

    /// Create a flow using the submission section of `config`.
    pub fn from_config(classifier: C, store: ReportStore<B>, config: &Config) -> Self {
        Self {
            classifier,
            store,
            defaults: config.submission.defaults.clone(),
            progress: ProgressSettings::from_config(config),
        }
    }

    /// The store reports are saved to.
    #[must_use]
    pub fn store(&self) -> &ReportStore<B> {
        &self.store
    }

    /// Start a progress ticker with this flow's settings.
    ///
    /// Pass it to [`submit_with_progress`](Self::submit_with_progress) after
    /// subscribing to it.
    #[must_use]
    pub fn start_progress(&self) -> SimulatedProgress {
        SimulatedProgress::start(self.progress)
    }

    /// Submit `media` and return the saved report.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, classification fails, or the
    /// report cannot be saved. Nothing is stored on error.
    pub async fn submit(&self, media: &MediaFile) -> Result<Report> {
        let progress = self.start_progress();
        self.submit_with_progress(media, &progress).await
    }

    /// Submit `media`, driving `progress` to 1.0 on success or 0.0 on failure.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub async fn submit_with_progress(
        &self,
        media: &MediaFile,
        progress: &SimulatedProgress,
    ) -> Result<Report> {
        match self.upload_and_save(media).await {
            Ok(report) => {
                progress.complete();
                info!("Saved report {} ({})", report.id, report.violation_type);
                Ok(report)
            }
            Err(e) => {
                progress.reset();
                warn!("Submission of {} failed: {e}", media.uri());
                Err(e)
            }
        }
    }

    async fn upload_and_save(&self, media: &MediaFile) -> Result<Report> {
        match tokio::fs::metadata(media.path()).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(Error::MediaNotFound {
                    path: media.path().to_path_buf(),
                })
            }
        }

        let started = Utc::now();
        info!("Submitting {} for classification", media.uri());

        let response = self.classifier.classify(media).await?;
        let new_report = response.into_new_report(&self.defaults, media, Utc::now());

        let mut reports = self.store.save_at(new_report, started).await?;
        if reports.is_empty() {
            return Err(Error::internal("store returned no reports after save"));
        }
        Ok(reports.swap_remove(0))
    }
}
