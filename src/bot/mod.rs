mod handlers;

pub use handlers::*;

use crate::downloader::Orchestrator;
use crate::link::LinkResolver;
use crate::transport::ChatTransport;
use crate::uptime::Uptime;
use std::sync::Arc;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "show the welcome message.")]
    Start,
    #[command(description = "show how long the bot has been running.")]
    Uptime,
}

/// Everything a handler needs, built once at startup and shared by reference.
pub struct BotContext {
    owner_id: u64,
    uptime: Uptime,
    transport: Arc<dyn ChatTransport>,
    resolver: Arc<dyn LinkResolver>,
    orchestrator: Orchestrator,
}

impl BotContext {
    pub fn new(
        owner_id: u64,
        uptime: Uptime,
        transport: Arc<dyn ChatTransport>,
        resolver: Arc<dyn LinkResolver>,
        orchestrator: Orchestrator,
    ) -> Self {
        Self {
            owner_id,
            uptime,
            transport,
            resolver,
            orchestrator,
        }
    }
}

async fn command_endpoint(msg: Message, cmd: Command, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(incoming) = IncomingMessage::from_telegram(&msg) else {
        return Ok(());
    };
    match cmd {
        Command::Start => ctx.handle_start(&incoming).await,
        Command::Uptime => ctx.handle_uptime(&incoming).await,
    }
    Ok(())
}

async fn link_endpoint(incoming: IncomingMessage, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let outcome = ctx.handle_link(&incoming).await;
    tracing::debug!(chat_id = incoming.chat_id.0, ?outcome, "message handled");
    Ok(())
}

pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_endpoint),
        )
        .branch(
            dptree::filter_map(|msg: Message| IncomingMessage::from_telegram(&msg))
                .endpoint(link_endpoint),
        )
}

/// Poll Telegram until Ctrl-C.
pub async fn dispatch(bot: Bot, ctx: Arc<BotContext>) {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|update| async move {
            tracing::debug!(update_id = ?update.id, "ignored update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
