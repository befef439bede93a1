use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::ConvertError;

/// Video metadata returned by the backend, used only for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
}

impl VideoMetadata {
    /// Format the duration for display: "1:01:01" for 3661 seconds,
    /// "1:05" for 65 seconds.
    pub fn formatted_duration(&self) -> String {
        let hours = self.duration_seconds / 3600;
        let minutes = (self.duration_seconds % 3600) / 60;
        let seconds = self.duration_seconds % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }
}

/// Lifecycle states the backend reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One status poll response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Progress percentage, 0-100
    #[serde(default)]
    pub progress: Option<u8>,
    /// Human-readable progress message
    #[serde(default)]
    pub message: Option<String>,
    /// Server error text when status is failed
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConvertRequestBody<'a> {
    url: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Backend operations the job controller depends on.
///
/// `ApiClient` is the production implementation; tests drive the controller
/// with scripted fakes.
#[async_trait]
pub trait ConvertBackend: Send + Sync {
    /// Fetch display metadata for a source URL.
    async fn video_info(&self, url: &str) -> Result<VideoMetadata, ConvertError>;

    /// Create a conversion job, returning its id.
    async fn create_job(&self, url: &str, format: &str) -> Result<String, ConvertError>;

    /// Check the status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ConvertError>;

    /// Retrieve the finished file for a completed job.
    async fn download(&self, job_id: &str) -> Result<Vec<u8>, ConvertError>;
}

/// HTTP client for the converter backend.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConvertError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConvertError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Direct URL of the download endpoint for a job, for consumers that
    /// hand retrieval off to something else (e.g. a browser navigation).
    pub fn download_url(&self, job_id: &str) -> String {
        format!("{}/download/{}", self.base_url, job_id)
    }

    fn transport_error(error: reqwest::Error) -> ConvertError {
        debug!("Transport failure: {}", error);
        ConvertError::transport()
    }

    /// Map a non-success response to a remote error, preferring the
    /// server-supplied detail text.
    async fn remote_error(response: reqwest::Response, fallback: &str) -> ConvertError {
        let status = response.status();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);
        debug!("Backend returned {}: {:?}", status, detail);
        ConvertError::Remote(detail.unwrap_or_else(|| fallback.to_string()))
    }
}

#[async_trait]
impl ConvertBackend for ApiClient {
    async fn video_info(&self, url: &str) -> Result<VideoMetadata, ConvertError> {
        let response = self
            .client
            .get(format!("{}/info", self.base_url))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, "Failed to fetch video info").await);
        }

        response.json().await.map_err(Self::transport_error)
    }

    async fn create_job(&self, url: &str, format: &str) -> Result<String, ConvertError> {
        let response = self
            .client
            .post(format!("{}/convert", self.base_url))
            .json(&ConvertRequestBody { url, format })
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, "Failed to start conversion").await);
        }

        let body: ConvertResponse = response.json().await.map_err(Self::transport_error)?;
        Ok(body.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ConvertError> {
        let response = self
            .client
            .get(format!("{}/status/{}", self.base_url, job_id))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, "Failed to check status").await);
        }

        response.json().await.map_err(Self::transport_error)
    }

    async fn download(&self, job_id: &str) -> Result<Vec<u8>, ConvertError> {
        let response = self
            .client
            .get(self.download_url(job_id))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, "Failed to download file").await);
        }

        let bytes = response.bytes().await.map_err(Self::transport_error)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_with_duration(duration_seconds: u64) -> VideoMetadata {
        VideoMetadata {
            title: "Test Video".to_string(),
            channel: "Test Channel".to_string(),
            duration_seconds,
            thumbnail_url: "https://example.com/thumb.jpg".to_string(),
        }
    }

    #[test]
    fn formats_duration_with_hours() {
        assert_eq!(metadata_with_duration(3661).formatted_duration(), "1:01:01");
    }

    #[test]
    fn formats_duration_without_hours() {
        assert_eq!(metadata_with_duration(65).formatted_duration(), "1:05");
        assert_eq!(metadata_with_duration(0).formatted_duration(), "0:00");
    }

    #[test]
    fn deserializes_status_report_with_optional_fields() {
        let report: JobStatusReport = serde_json::from_str(
            r#"{"status": "processing", "progress": 55, "message": "Converting..."}"#,
        )
        .unwrap();
        assert_eq!(report.status, JobStatus::Processing);
        assert_eq!(report.progress, Some(55));
        assert_eq!(report.message.as_deref(), Some("Converting..."));
        assert_eq!(report.error, None);
    }

    #[test]
    fn deserializes_bare_terminal_status() {
        let report: JobStatusReport = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.progress, None);

        let report: JobStatusReport =
            serde_json::from_str(r#"{"status": "failed", "error": "codec unsupported"}"#).unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.error.as_deref(), Some("codec unsupported"));
    }

    #[test]
    fn deserializes_metadata_wire_names() {
        let metadata: VideoMetadata = serde_json::from_str(
            r#"{"title": "T", "channel": "C", "duration": 120, "thumbnail": "https://example.com/t.jpg"}"#,
        )
        .unwrap();
        assert_eq!(metadata.duration_seconds, 120);
        assert_eq!(metadata.thumbnail_url, "https://example.com/t.jpg");
    }

    #[test]
    fn download_url_joins_base_and_job_id() {
        let client = ApiClient::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.download_url("abc123"),
            "http://localhost:8000/api/download/abc123"
        );
    }
}
