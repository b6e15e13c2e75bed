use crate::link::NormalizedUrl;
use crate::transport::{MessageRef, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to start extractor: {0}")]
    Spawn(std::io::Error),
    #[error("{0}")]
    Failed(String),
    #[error("Extractor finished without reporting the downloaded file")]
    MissingMetadata,
    #[error("Could not read extractor metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress reported by the extractor while a job downloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        percent: f64,
        speed: Option<String>,
        eta: Option<String>,
    },
    Finished,
    Other(String),
}

/// Everything the extractor needs to fetch one item.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub url: NormalizedUrl,
    /// Output path template; `%(title)s` and `%(ext)s` are filled in by the extractor.
    pub output_template: PathBuf,
    pub format: String,
    pub no_playlist: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    pub ext: String,
    #[serde(rename = "filepath")]
    pub file_path: PathBuf,
}

/// Media extraction and download backend.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Download the media behind `request.url`, reporting progress on `progress`.
    async fn extract_and_download(
        &self,
        request: &ExtractRequest,
        progress: UnboundedSender<ProgressEvent>,
    ) -> Result<MediaMetadata, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Preparing,
    Downloading,
    Uploading,
    Delivered,
    Failed,
}

/// Last progress phase shown in the status message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportedPhase {
    Downloading,
    Finished,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Could not send status message: {0}")]
    StatusMessage(TransportError),
    #[error("Could not prepare download directory: {0}")]
    Workspace(std::io::Error),
    #[error(transparent)]
    Extraction(ExtractError),
    #[error("Could not deliver video: {0}")]
    Delivery(TransportError),
}

#[derive(Debug)]
pub enum JobOutcome {
    Delivered,
    Failed(JobError),
}

impl JobOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, JobOutcome::Delivered)
    }
}

/// One link's trip from acceptance to delivery.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: String,
    pub source_url: NormalizedUrl,
    pub state: JobState,
    pub status_message: Option<MessageRef>,
    pub local_file_path: Option<PathBuf>,
    pub last_reported_percent: Option<f64>,
    pub last_reported_phase: Option<ReportedPhase>,
    pub last_edit_at: Option<Instant>,
}

impl DownloadJob {
    pub fn new(source_url: NormalizedUrl) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_url,
            state: JobState::Created,
            status_message: None,
            local_file_path: None,
            last_reported_percent: None,
            last_reported_phase: None,
            last_edit_at: None,
        }
    }

    pub fn transition(&mut self, next: JobState) {
        tracing::debug!(job_id = %self.id, from = ?self.state, to = ?next, "job state");
        self.state = next;
    }
}
