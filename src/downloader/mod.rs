mod orchestrator;
mod progress;
mod types;
mod ytdlp;

pub use orchestrator::{DownloadSettings, Orchestrator, DELIVERY_ERROR_TEXT, PREPARING_TEXT};
pub use progress::{render_downloading, ProgressReporter, FINISHED_TEXT};
pub use types::*;
pub use ytdlp::YtDlpExtractor;
