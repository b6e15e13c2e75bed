use super::progress::ProgressReporter;
use super::types::*;
use crate::link::NormalizedUrl;
use crate::transport::{ChatTransport, MessageRef, TransportError, VideoUpload};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::{ChatId, MessageId};

pub const PREPARING_TEXT: &str = "Preparing to download...";
pub const DELIVERY_ERROR_TEXT: &str = "❌ Error: the video could not be sent. Please try again.";

/// Settings shared by every job.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub download_dir: PathBuf,
    pub format: String,
    pub caption: String,
    pub progress_interval: Duration,
}

/// Runs a single accepted link through download and delivery.
pub struct Orchestrator {
    transport: Arc<dyn ChatTransport>,
    extractor: Arc<dyn MediaExtractor>,
    settings: DownloadSettings,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        extractor: Arc<dyn MediaExtractor>,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            transport,
            extractor,
            settings,
        }
    }

    /// Download `url` and send it to `chat_id` as a reply flow to `reply_to`.
    ///
    /// Every failure is reported to the chat here; the returned outcome is
    /// informational. Nothing the job wrote survives this call.
    pub async fn handle(&self, chat_id: ChatId, reply_to: MessageId, url: NormalizedUrl) -> JobOutcome {
        let mut job = DownloadJob::new(url);
        let job_dir = self.settings.download_dir.join(&job.id);
        tracing::info!(job_id = %job.id, url = %job.source_url, "job accepted");

        let outcome = self.run(&mut job, &job_dir, chat_id, reply_to).await;
        self.cleanup(&job, &job_dir).await;

        match &outcome {
            JobOutcome::Delivered => {
                job.transition(JobState::Delivered);
                tracing::info!(job_id = %job.id, "job delivered");
            }
            JobOutcome::Failed(e) => {
                job.transition(JobState::Failed);
                tracing::warn!(job_id = %job.id, error = %e, "job failed");
            }
        }
        outcome
    }

    async fn run(
        &self,
        job: &mut DownloadJob,
        job_dir: &Path,
        chat_id: ChatId,
        reply_to: MessageId,
    ) -> JobOutcome {
        job.transition(JobState::Preparing);
        match self.post_status(job, chat_id, reply_to).await {
            Ok(status) => job.status_message = Some(status),
            Err(e) => return JobOutcome::Failed(JobError::StatusMessage(e)),
        }

        if let Err(e) = tokio::fs::create_dir_all(job_dir).await {
            self.report(chat_id, &format!("❌ Error: {}", e)).await;
            return JobOutcome::Failed(JobError::Workspace(e));
        }

        job.transition(JobState::Downloading);
        let request = ExtractRequest {
            url: job.source_url.clone(),
            output_template: job_dir.join("%(title)s.%(ext)s"),
            format: self.settings.format.clone(),
            no_playlist: true,
        };
        let reporter = ProgressReporter::new(self.transport.clone(), self.settings.progress_interval);
        let (progress_tx, progress_rx) = tokio::sync::mpsc::unbounded_channel();

        let (result, ()) = tokio::join!(
            self.extractor.extract_and_download(&request, progress_tx),
            reporter.run(job, progress_rx),
        );

        let metadata = match result {
            Ok(metadata) => metadata,
            Err(e) => {
                self.report(chat_id, &format!("❌ Error: {}", e)).await;
                return JobOutcome::Failed(JobError::Extraction(e));
            }
        };
        tracing::info!(job_id = %job.id, title = %metadata.title, "download finished");
        job.local_file_path = Some(metadata.file_path.clone());

        job.transition(JobState::Uploading);
        match self.deliver(chat_id, &metadata).await {
            Ok(()) => JobOutcome::Delivered,
            Err(e) => {
                self.report(chat_id, DELIVERY_ERROR_TEXT).await;
                JobOutcome::Failed(JobError::Delivery(e))
            }
        }
    }

    /// Post the status message, as a reply when possible and standalone otherwise.
    async fn post_status(
        &self,
        job: &DownloadJob,
        chat_id: ChatId,
        reply_to: MessageId,
    ) -> Result<MessageRef, TransportError> {
        match self.transport.reply_to(chat_id, reply_to, PREPARING_TEXT).await {
            Ok(status) => Ok(status),
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "status reply failed, sending without reply");
                self.transport.send_message(chat_id, PREPARING_TEXT).await
            }
        }
    }

    async fn deliver(
        &self,
        chat_id: ChatId,
        metadata: &MediaMetadata,
    ) -> Result<(), TransportError> {
        let file = tokio::fs::File::open(&metadata.file_path)
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        let file_name = metadata
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.{}", metadata.title, metadata.ext));

        self.transport
            .send_video(chat_id, VideoUpload { file, file_name }, &self.settings.caption)
            .await
    }

    async fn report(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "could not report job failure");
        }
    }

    /// Remove the produced file and everything else under the job directory.
    async fn cleanup(&self, job: &DownloadJob, job_dir: &Path) {
        if let Some(path) = &job.local_file_path {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(job_id = %job.id, path = %path.display(), error = %e, "could not remove file");
                }
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(job_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(job_id = %job.id, dir = %job_dir.display(), error = %e, "could not remove job directory");
            }
        }
    }
}
