//! Telegram update handlers.
//!
//! Each handler converts the teloxide type into a core `IncomingUpdate` and
//! hands it to the router; nothing here knows about the conversation itself.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, UpdateKind},
};

use newsbot_core::messaging::types::IncomingUpdate;

use crate::router::{self, AppState};

mod callback;
mod commands;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    match callback::callback_from_query(&q) {
        Some(cb) => router::dispatch(&state, IncomingUpdate::Callback(cb)).await,
        None => {
            // Always answer so the client stops its spinner.
            let _ = bot.answer_callback_query(q.id).await;
        }
    }
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(cmd) = commands::command_from_message(&msg) {
        router::dispatch(&state, IncomingUpdate::Command(cmd)).await;
    }
    Ok(())
}

/// Entry point for updates delivered through the webhook.
pub async fn handle_update(state: Arc<AppState>, update: Update) {
    if let Some(incoming) = incoming_from_update(&update) {
        router::dispatch(&state, incoming).await;
        return;
    }
    if let UpdateKind::CallbackQuery(q) = update.kind {
        let _ = state.bot.answer_callback_query(q.id).await;
    }
}

/// Core view of an update, if it is one the conversation reacts to.
pub fn incoming_from_update(update: &Update) -> Option<IncomingUpdate> {
    match &update.kind {
        UpdateKind::Message(msg) => commands::command_from_message(msg).map(IncomingUpdate::Command),
        UpdateKind::CallbackQuery(q) => {
            callback::callback_from_query(q).map(IncomingUpdate::Callback)
        }
        _ => None,
    }
}
