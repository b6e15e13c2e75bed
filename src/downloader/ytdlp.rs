use super::types::*;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

const PROGRESS_MARKER: &str = "[fbget:progress]";
const METADATA_MARKER: &str = "[fbget:meta]";

static ANSI_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Extraction backed by the `yt-dlp` command line tool.
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check if the binary can be started
    pub async fn available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

fn build_args(request: &ExtractRequest) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        request.format.clone(),
        if request.no_playlist {
            "--no-playlist".to_string()
        } else {
            "--yes-playlist".to_string()
        },
        "--newline".to_string(),
        "--progress".to_string(),
        "--no-warnings".to_string(),
        "--progress-template".to_string(),
        format!(
            "download:{}%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s",
            PROGRESS_MARKER
        ),
        // after_move runs once the final file is in place, so filepath is exact.
        "--print".to_string(),
        format!("after_move:{}%(.{{title,ext,filepath}})j", METADATA_MARKER),
        "-o".to_string(),
        request.output_template.to_string_lossy().to_string(),
    ];
    args.push("--".to_string());
    args.push(request.url.to_string());
    args
}

fn present(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() || field == "NA" || field == "N/A" {
        None
    } else {
        Some(field.to_string())
    }
}

/// Parse one line written by our `--progress-template`.
fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = ANSI_REGEX.replace_all(line, "");
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let mut fields = rest.split('|');
    let status = fields.next()?.trim();

    match status {
        "downloading" => {
            let percent = fields
                .next()
                .and_then(|p| p.trim().trim_end_matches('%').trim().parse::<f64>().ok())
                .unwrap_or(0.0)
                .clamp(0.0, 100.0);
            Some(ProgressEvent::Downloading {
                percent,
                speed: fields.next().and_then(present),
                eta: fields.next().and_then(present),
            })
        }
        "finished" => Some(ProgressEvent::Finished),
        other => Some(ProgressEvent::Other(other.to_string())),
    }
}

fn parse_metadata_line(line: &str) -> Option<Result<MediaMetadata, serde_json::Error>> {
    let json = line.trim().strip_prefix(METADATA_MARKER)?;
    Some(serde_json::from_str(json))
}

/// Pick the message worth showing the user from yt-dlp's stderr.
fn error_message(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
}

#[async_trait::async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract_and_download(
        &self,
        request: &ExtractRequest,
        progress: UnboundedSender<ProgressEvent>,
    ) -> Result<MediaMetadata, ExtractError> {
        let args = build_args(request);
        tracing::debug!(binary = %self.binary.display(), ?args, "spawning yt-dlp");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ExtractError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractError::Failed("yt-dlp stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractError::Failed("yt-dlp stderr unavailable".into()))?;

        let stderr_reader = tokio::spawn(async move {
            let mut buf = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let mut metadata = None;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(event) = parse_progress_line(&line) {
                // Receiver gone means nobody is watching; keep downloading.
                let _ = progress.send(event);
            } else if let Some(parsed) = parse_metadata_line(&line) {
                metadata = Some(parsed?);
            }
        }

        let status = child.wait().await?;
        let stderr_content = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            let message = error_message(&stderr_content)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            return Err(ExtractError::Failed(message));
        }

        metadata.ok_or(ExtractError::MissingMetadata)
    }
}
