//! Update dispatching: routes messages and button taps to the
//! [`InteractionHandler`] and renders its replies.

use std::future::Future;
use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, Message, ParseMode, Update, UserId};
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use super::main_menu;
use crate::commands::{CommandResult, InteractionHandler, StartCommand};

/// Builds the update handler tree.
#[must_use]
pub fn schema() -> UpdateHandler<RequestError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

/// Runs long polling until Ctrl+C.
pub async fn run_dispatcher(bot: Bot, handler: Arc<InteractionHandler>) {
    info!("Starting update dispatcher");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![handler])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Update dispatcher stopped");
}

async fn on_message(
    bot: Bot,
    msg: Message,
    handler: Arc<InteractionHandler>,
) -> ResponseResult<()> {
    let Some(command) = msg.text().and_then(StartCommand::parse) else {
        return Ok(());
    };
    let Some(user_id) = msg.from.as_ref().and_then(|user| ledger_id(user.id)) else {
        debug!("Ignoring /start without a usable sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let reply = handler
        .handle_start(user_id, &command)
        .await
        .unwrap_or_else(|e| {
            error!("Start handler failed for {}: {}", user_id, e);
            CommandResult::failure()
        });

    let chat = msg.chat.id;
    let sent = async {
        bot.send_message(chat, reply.message)
            .parse_mode(ParseMode::Html)
            .reply_markup(main_menu())
            .await?;
        Ok::<(), RequestError>(())
    };

    reply_with_fallback(sent, |notice| send_plain(&bot, chat, notice)).await
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    handler: Arc<InteractionHandler>,
) -> ResponseResult<()> {
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!("Failed to answer callback query: {}", e);
    }

    let Some(user_id) = ledger_id(query.from.id) else {
        return Ok(());
    };
    let data = query.data.as_deref().unwrap_or_default();

    let reply = handler
        .handle_callback(user_id, data)
        .await
        .unwrap_or_else(|e| {
            error!("Button handler failed for {} ({}): {}", user_id, data, e);
            CommandResult::failure()
        });

    let message = query.regular_message();
    let chat = message.map_or_else(|| ChatId::from(query.from.id), |m| m.chat.id);
    let sent = async {
        if let Some(message) = message {
            bot.edit_message_text(message.chat.id, message.id, reply.message)
                .parse_mode(ParseMode::Html)
                .reply_markup(main_menu())
                .await?;
        } else {
            bot.send_message(chat, reply.message)
                .parse_mode(ParseMode::Html)
                .reply_markup(main_menu())
                .await?;
        }
        Ok::<(), RequestError>(())
    };

    reply_with_fallback(sent, |notice| send_plain(&bot, chat, notice)).await
}

/// Awaits `reply`. On any error other than an unchanged message, logs it
/// and hands the generic failure text to `fallback` once.
async fn reply_with_fallback<R, F, Fut>(reply: R, fallback: F) -> ResponseResult<()>
where
    R: Future<Output = ResponseResult<()>>,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = ResponseResult<()>>,
{
    match reply.await {
        Ok(()) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => {
            warn!("Reply failed, sending plain failure notice: {}", e);
            fallback(CommandResult::failure().message).await
        }
    }
}

/// Sends `text` with no parse mode, so nothing in it can be rejected as markup.
async fn send_plain(bot: &Bot, chat: ChatId, text: String) -> ResponseResult<()> {
    bot.send_message(chat, text).reply_markup(main_menu()).await?;
    Ok(())
}

/// Telegram user ids fit in 52 bits; anything else is not a real user.
fn ledger_id(user: UserId) -> Option<i64> {
    i64::try_from(user.0).ok()
}
