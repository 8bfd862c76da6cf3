//! Maps Telegram updates onto dialog events and renders the replies back.

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, MessageId,
    ReplyMarkup, User,
};

use ledger::UserId as LedgerUserId;

use crate::reply::{Event, Keyboard, Reply};
use crate::{ConfigParameters, dialog};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user = LedgerUserId(from.id.0);
    let event = match text.trim().strip_prefix('/') {
        Some(rest) => Event::Command(rest.split_whitespace().next().unwrap_or("")),
        None => Event::Text(text),
    };

    let replies = dialog::respond(&cfg.ledger, &cfg.sessions, user, event).await;
    send_replies(&bot, msg.chat.id, None, replies).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let user = LedgerUserId(q.from.id.0);

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let replies = dialog::respond(&cfg.ledger, &cfg.sessions, user, Event::Button(data)).await;
    send_replies(&bot, chat_id, Some(message_id), replies).await
}

/// Sends each reply in order; `tapped` is the message the button lived on,
/// used as the edit target.
pub(crate) async fn send_replies(
    bot: &Bot,
    chat_id: ChatId,
    tapped: Option<MessageId>,
    replies: Vec<Reply>,
) -> ResponseResult<()> {
    for reply in replies {
        match reply {
            Reply::Text(text) => {
                bot.send_message(chat_id, text).await?;
            }
            Reply::Keyboard { text, keyboard } => {
                bot.send_message(chat_id, text)
                    .reply_markup(reply_markup(keyboard))
                    .await?;
            }
            Reply::EditPrevious(text) => {
                let edited = match tapped {
                    Some(message_id) => bot
                        .edit_message_text(chat_id, message_id, text.clone())
                        .await
                        .is_ok(),
                    None => false,
                };
                if !edited {
                    bot.send_message(chat_id, text).await?;
                }
            }
        }
    }
    Ok(())
}

fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Menu(rows) => {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
        Keyboard::Inline(rows) => {
            let rows = rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|(label, payload)| InlineKeyboardButton::callback(label, payload))
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
    }
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}
