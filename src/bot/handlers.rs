use super::BotContext;
use crate::downloader::JobOutcome;
use crate::link::{classify, normalize, OtherPlatform, Platform};
use crate::uptime::format_uptime;
use teloxide::types::{ChatId, Message, MessageId};

pub const WELCOME_TEXT: &str = "Hello 👋 Welcome to Streamify-FB\n\n\
    Send me any Facebook video link, and I'll download it for you with fast speed and live progress updates.";
pub const UNAUTHORIZED_TEXT: &str = "❌ You are not authorized to use this command.";
pub const INVALID_LINK_TEXT: &str = "❌ Invalid link. Please send a valid Facebook video link.";
pub const UNSUPPORTED_TEXT: &str = "❌ Unsupported link. Please send a valid Facebook video link.";

/// The parts of an inbound chat message the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub from_user_id: Option<u64>,
    pub text: String,
}

impl IncomingMessage {
    /// `None` for messages without text (stickers, photos, ...).
    pub fn from_telegram(msg: &Message) -> Option<Self> {
        Some(Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            from_user_id: msg.from.as_ref().map(|user| user.id.0),
            text: msg.text()?.to_string(),
        })
    }
}

/// What happened to a text message sent to the bot.
#[derive(Debug)]
pub enum IntakeOutcome {
    InvalidLink,
    KnownOtherPlatform(OtherPlatform),
    Unsupported,
    Job(JobOutcome),
}

impl BotContext {
    pub async fn handle_start(&self, msg: &IncomingMessage) {
        self.reply(msg, WELCOME_TEXT).await;
    }

    /// Reply text for `/uptime`. Only the owner ever sees the elapsed time.
    pub fn uptime_reply(&self, from_user_id: Option<u64>) -> String {
        if from_user_id != Some(self.owner_id) {
            return UNAUTHORIZED_TEXT.to_string();
        }
        format!("⏱ Bot Uptime: {}", format_uptime(self.uptime.elapsed()))
    }

    pub async fn handle_uptime(&self, msg: &IncomingMessage) {
        let text = self.uptime_reply(msg.from_user_id);
        self.reply(msg, &text).await;
    }

    /// Normalize, resolve, classify and, for supported links, download.
    pub async fn handle_link(&self, msg: &IncomingMessage) -> IntakeOutcome {
        let mut url = match normalize(&msg.text) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(chat_id = msg.chat_id.0, error = %e, "rejected message");
                self.reply(msg, INVALID_LINK_TEXT).await;
                return IntakeOutcome::InvalidLink;
            }
        };

        if self.resolver.applies(&url) {
            url = self.resolver.resolve(url).await;
            self.reply(
                msg,
                &format!("Detected Facebook redirect URL.\nUsing resolved URL:\n{}", url),
            )
            .await;
        }

        match classify(&url) {
            Platform::Supported => {
                let outcome = self
                    .orchestrator
                    .handle(msg.chat_id, msg.message_id, url)
                    .await;
                IntakeOutcome::Job(outcome)
            }
            Platform::KnownUnsupported(other) => {
                self.reply(msg, other.suggestion()).await;
                IntakeOutcome::KnownOtherPlatform(other)
            }
            Platform::Unsupported => {
                self.reply(msg, UNSUPPORTED_TEXT).await;
                IntakeOutcome::Unsupported
            }
        }
    }

    async fn reply(&self, msg: &IncomingMessage, text: &str) {
        if let Err(e) = self.transport.reply_to(msg.chat_id, msg.message_id, text).await {
            tracing::warn!(chat_id = msg.chat_id.0, error = %e, "reply failed");
        }
    }
}
