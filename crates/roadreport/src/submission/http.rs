//! HTTP client for the classification endpoint.
//!
//! Sends the media as a single multipart file field and reads the JSON
//! verdict. No retries: any failure goes straight back to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use super::{Classifier, ClassifierResponse, MediaFile};
use crate::config::Config;
use crate::error::{Error, Result};

/// Name of the multipart field carrying the media file.
pub const MEDIA_FIELD: &str = "video";

const USER_AGENT: &str = concat!("roadreport/", env!("CARGO_PKG_VERSION"));

/// [`Classifier`] backed by a remote HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpClassifier {
    /// Create a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the client
    /// cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            Error::config_validation(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Create a client from the submission section of the configuration.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.submission.endpoint, config.request_timeout())
    }

    /// The endpoint receiving uploads.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, media: &MediaFile) -> Result<ClassifierResponse> {
        let data = tokio::fs::read(media.path()).await?;
        debug!(
            "Uploading {} ({} bytes, {}) to {}",
            media.uri(),
            data.len(),
            media.mime_type(),
            self.endpoint
        );

        let part = Part::bytes(data)
            .file_name(media.upload_file_name())
            .mime_str(&media.mime_type())?;
        let form = Form::new().part(MEDIA_FIELD, part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        info!("Upload completed with status {}", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upload_rejected(
                status.as_u16(),
                rejection_message(status.as_u16(), &body),
            ));
        }

        let raw: Value = response.json().await?;
        Ok(ClassifierResponse::from_value(raw))
    }
}

/// The server's `error` field when the body carries one, else a generic message.
fn rejection_message(status: u16, body: &str) -> String {
    let reported = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .and_then(|e| match e {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Null | Value::String(_) | Value::Bool(false) => None,
            other => Some(other.to_string()),
        });
    reported.unwrap_or_else(|| format!("Request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::MediaKind;
    use crate::test_support::serve_once;
    use std::io::Write;

    fn write_media(dir: &tempfile::TempDir, name: &str) -> MediaFile {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"fake video bytes").unwrap();
        MediaFile::new(path, MediaKind::Video)
    }

    #[test]
    fn test_rejection_message_uses_error_field() {
        assert_eq!(
            rejection_message(400, r#"{"error": "No video file provided"}"#),
            "No video file provided"
        );
    }

    #[test]
    fn test_rejection_message_fallbacks() {
        assert_eq!(
            rejection_message(500, "<html>oops</html>"),
            "Request failed with status 500"
        );
        assert_eq!(
            rejection_message(502, r#"{"message": "bad gateway"}"#),
            "Request failed with status 502"
        );
        assert_eq!(
            rejection_message(400, r#"{"error": ""}"#),
            "Request failed with status 400"
        );
        assert_eq!(rejection_message(418, r#"{"error": 7}"#), "7");
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let err = HttpClassifier::new("::not a url::", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_from_config() {
        let classifier = HttpClassifier::from_config(&Config::default()).unwrap();
        assert_eq!(classifier.endpoint().path(), "/traffic_violation");
    }

    #[tokio::test]
    async fn test_classify_success_sends_multipart_video() {
        let (endpoint, server) = serve_once(
            "/traffic_violation",
            "200 OK",
            r#"{"location": "Lahore", "violation_type": "Speeding", "average_confidence": 91.0}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let media = write_media(&dir, "clip.mp4");

        let classifier = HttpClassifier::new(&endpoint, Duration::from_secs(5)).unwrap();
        let response = classifier.classify(&media).await.unwrap();

        assert_eq!(response.location.as_deref(), Some("Lahore"));
        assert_eq!(response.violation_type.as_deref(), Some("Speeding"));
        assert_eq!(response.average_confidence, Some(91.0));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /traffic_violation"));
        assert!(request.contains("name=\"video\""));
        assert!(request.contains("filename=\"video.mp4\""));
        assert!(request.contains("video/mp4"));
        assert!(request.contains("fake video bytes"));
        assert!(request.to_ascii_lowercase().contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_classify_rejection_carries_server_error() {
        let (endpoint, server) = serve_once(
            "/traffic_violation",
            "422 Unprocessable Entity",
            r#"{"error": "No vehicle detected"}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let media = write_media(&dir, "clip.mov");

        let classifier = HttpClassifier::new(&endpoint, Duration::from_secs(5)).unwrap();
        let err = classifier.classify(&media).await.unwrap_err();

        match err {
            Error::UploadRejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "No vehicle detected");
            }
            other => panic!("Expected UploadRejected, got: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_classify_missing_file_is_io_error() {
        let classifier =
            HttpClassifier::new("http://127.0.0.1:9/traffic_violation", Duration::from_secs(1))
                .unwrap();
        let media = MediaFile::new("/nonexistent/clip.mp4", MediaKind::Video);
        let err = classifier.classify(&media).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
