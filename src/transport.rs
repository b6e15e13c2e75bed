use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
    #[error("{0}")]
    Other(String),
}

/// A message that was sent by the bot and can be edited later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// An opened video file ready to be streamed to the chat.
#[derive(Debug)]
pub struct VideoUpload {
    pub file: tokio::fs::File,
    pub file_name: String,
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn reply_to(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<MessageRef, TransportError>;

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<MessageRef, TransportError>;

    async fn edit_message_text(&self, message: MessageRef, text: &str) -> Result<(), TransportError>;

    async fn send_video(
        &self,
        chat_id: ChatId,
        video: VideoUpload,
        caption: &str,
    ) -> Result<(), TransportError>;
}

/// Telegram Bot API transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: message.chat.id,
        message_id: message.id,
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn reply_to(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<MessageRef, TransportError> {
        let sent = self
            .bot
            .send_message(chat_id, text)
            .reply_parameters(ReplyParameters::new(message_id).allow_sending_without_reply())
            .await?;
        Ok(message_ref(&sent))
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<MessageRef, TransportError> {
        let sent = self.bot.send_message(chat_id, text).await?;
        Ok(message_ref(&sent))
    }

    async fn edit_message_text(&self, message: MessageRef, text: &str) -> Result<(), TransportError> {
        self.bot
            .edit_message_text(message.chat_id, message.message_id, text)
            .await?;
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        video: VideoUpload,
        caption: &str,
    ) -> Result<(), TransportError> {
        let input = InputFile::read(video.file).file_name(video.file_name);
        self.bot
            .send_video(chat_id, input)
            .caption(caption)
            .supports_streaming(true)
            .await?;
        Ok(())
    }
}
