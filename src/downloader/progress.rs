use super::types::{DownloadJob, ProgressEvent, ReportedPhase};
use crate::transport::{ChatTransport, MessageRef, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

pub const FINISHED_TEXT: &str = "✔ Download complete! Uploading...";

/// Status message body while a download is running.
pub fn render_downloading(percent: f64, speed: Option<&str>, eta: Option<&str>) -> String {
    format!(
        "📥 Downloading...\nProgress: {:.1}%\nSpeed: {}\nETA: {}",
        percent,
        speed.unwrap_or("???/s"),
        eta.unwrap_or("??")
    )
}

/// Mirrors extractor progress into edits of a job's status message.
///
/// Edits are best effort. A failed edit is logged and never retried.
pub struct ProgressReporter {
    transport: Arc<dyn ChatTransport>,
    min_interval: Duration,
}

impl ProgressReporter {
    pub fn new(transport: Arc<dyn ChatTransport>, min_interval: Duration) -> Self {
        Self {
            transport,
            min_interval,
        }
    }

    /// Consume events until the extractor drops its sender.
    pub async fn run(&self, job: &mut DownloadJob, mut events: UnboundedReceiver<ProgressEvent>) {
        while let Some(event) = events.recv().await {
            self.on_progress(job, event).await;
        }
    }

    pub async fn on_progress(&self, job: &mut DownloadJob, event: ProgressEvent) {
        let Some(message) = job.status_message else {
            return;
        };

        let text = match &event {
            ProgressEvent::Downloading {
                percent,
                speed,
                eta,
            } => {
                if !self.should_report(job, *percent) {
                    return;
                }
                job.last_reported_phase = Some(ReportedPhase::Downloading);
                job.last_reported_percent = Some(*percent);
                render_downloading(*percent, speed.as_deref(), eta.as_deref())
            }
            ProgressEvent::Finished => {
                if job.last_reported_phase == Some(ReportedPhase::Finished) {
                    return;
                }
                job.last_reported_phase = Some(ReportedPhase::Finished);
                FINISHED_TEXT.to_string()
            }
            ProgressEvent::Other(_) => return,
        };

        job.last_edit_at = Some(Instant::now());

        if let Err(e) = self.try_edit(message, &text).await {
            tracing::debug!(job_id = %job.id, error = %e, "status edit skipped");
        }
    }

    pub async fn try_edit(&self, message: MessageRef, text: &str) -> Result<(), TransportError> {
        self.transport.edit_message_text(message, text).await
    }

    fn should_report(&self, job: &DownloadJob, percent: f64) -> bool {
        if job.last_reported_phase != Some(ReportedPhase::Downloading) {
            return true;
        }
        if job.last_reported_percent == Some(percent) {
            return false;
        }
        match job.last_edit_at {
            Some(at) => percent >= 100.0 || at.elapsed() >= self.min_interval,
            None => true,
        }
    }
}
