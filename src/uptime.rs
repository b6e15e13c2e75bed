use chrono::{DateTime, Utc};
use std::time::Duration;

/// Process start time, captured once at bootstrap.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started_at: DateTime<Utc>,
}

impl Uptime {
    pub fn start() -> Self {
        Self::since(Utc::now())
    }

    pub fn since(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or_default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Utc::now())
    }
}

/// `{h}h {m}m {s}s`, hours not wrapped into days.
pub fn format_uptime(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}
