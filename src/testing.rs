//! In-memory doubles for the chat transport and the extractor.

use crate::downloader::{ExtractError, ExtractRequest, MediaExtractor, MediaMetadata, ProgressEvent};
use crate::link::{LinkResolver, NormalizedUrl};
use crate::transport::{ChatTransport, MessageRef, TransportError, VideoUpload};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reply {
        chat_id: ChatId,
        reply_to: MessageId,
        text: String,
    },
    Send {
        chat_id: ChatId,
        text: String,
    },
    Edit {
        message: MessageRef,
        text: String,
    },
    Video {
        chat_id: ChatId,
        file_name: String,
        caption: String,
        bytes: usize,
    },
}

#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI32,
    fail_edits: bool,
    fail_replies: bool,
    fail_sends: bool,
    fail_videos: bool,
}

impl RecordingTransport {
    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn failing_replies() -> Self {
        Self {
            fail_replies: true,
            ..Self::default()
        }
    }

    /// Every reply and plain message is rejected; nothing reaches the chat.
    pub fn unreachable() -> Self {
        Self {
            fail_replies: true,
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn failing_videos() -> Self {
        Self {
            fail_videos: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Reply { text, .. } | Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn videos(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Video { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_ref(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)),
        }
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn reply_to(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<MessageRef, TransportError> {
        self.record(Call::Reply {
            chat_id,
            reply_to: message_id,
            text: text.to_string(),
        });
        if self.fail_replies {
            return Err(TransportError::Other("replies disabled".into()));
        }
        Ok(self.next_ref(chat_id))
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<MessageRef, TransportError> {
        self.record(Call::Send {
            chat_id,
            text: text.to_string(),
        });
        if self.fail_sends {
            return Err(TransportError::Other("chat unreachable".into()));
        }
        Ok(self.next_ref(chat_id))
    }

    async fn edit_message_text(&self, message: MessageRef, text: &str) -> Result<(), TransportError> {
        self.record(Call::Edit {
            message,
            text: text.to_string(),
        });
        if self.fail_edits {
            return Err(TransportError::Other("message is not modified".into()));
        }
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        mut video: VideoUpload,
        caption: &str,
    ) -> Result<(), TransportError> {
        let mut contents = Vec::new();
        video
            .file
            .read_to_end(&mut contents)
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        self.record(Call::Video {
            chat_id,
            file_name: video.file_name,
            caption: caption.to_string(),
            bytes: contents.len(),
        });
        if self.fail_videos {
            return Err(TransportError::Other("upload rejected".into()));
        }
        Ok(())
    }
}

/// What the fake extractor does when asked to download.
pub enum FakeBehavior {
    Succeed {
        title: String,
        events: Vec<ProgressEvent>,
    },
    /// Leaves a partial file next to the output, then fails.
    Fail { message: String },
}

pub struct FakeExtractor {
    behavior: FakeBehavior,
    requests: Mutex<Vec<ExtractRequest>>,
}

impl FakeExtractor {
    pub fn succeeding(title: &str) -> Self {
        Self::new(FakeBehavior::Succeed {
            title: title.to_string(),
            events: vec![
                ProgressEvent::Downloading {
                    percent: 10.0,
                    speed: Some("1.00MiB/s".into()),
                    eta: Some("00:09".into()),
                },
                ProgressEvent::Downloading {
                    percent: 55.0,
                    speed: Some("1.20MiB/s".into()),
                    eta: Some("00:04".into()),
                },
                ProgressEvent::Finished,
            ],
        })
    }

    pub fn failing(message: &str) -> Self {
        Self::new(FakeBehavior::Fail {
            message: message.to_string(),
        })
    }

    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ExtractRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn fill_template(template: &std::path::Path, title: &str, ext: &str) -> PathBuf {
    PathBuf::from(
        template
            .to_string_lossy()
            .replace("%(title)s", title)
            .replace("%(ext)s", ext),
    )
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    async fn extract_and_download(
        &self,
        request: &ExtractRequest,
        progress: UnboundedSender<ProgressEvent>,
    ) -> Result<MediaMetadata, ExtractError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.behavior {
            FakeBehavior::Succeed { title, events } => {
                let file_path = fill_template(&request.output_template, title, "mp4");
                tokio::fs::write(&file_path, b"fake video bytes").await?;
                for event in events {
                    let _ = progress.send(event.clone());
                }
                Ok(MediaMetadata {
                    title: title.clone(),
                    ext: "mp4".into(),
                    file_path,
                })
            }
            FakeBehavior::Fail { message } => {
                let partial = fill_template(&request.output_template, "partial", "mp4.part");
                tokio::fs::write(&partial, b"half").await?;
                let _ = progress.send(ProgressEvent::Downloading {
                    percent: 12.5,
                    speed: None,
                    eta: None,
                });
                Err(ExtractError::Failed(message.clone()))
            }
        }
    }
}

/// Resolver that treats every link as a share link but never reaches the network.
#[derive(Default)]
pub struct OfflineResolver {
    pub resolved: Mutex<Vec<String>>,
}

#[async_trait]
impl LinkResolver for OfflineResolver {
    fn applies(&self, url: &NormalizedUrl) -> bool {
        url.path().starts_with("/share/")
    }

    async fn resolve(&self, url: NormalizedUrl) -> NormalizedUrl {
        self.resolved.lock().unwrap().push(url.to_string());
        url
    }
}
