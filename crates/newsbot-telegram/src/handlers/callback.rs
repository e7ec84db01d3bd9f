use teloxide::types::CallbackQuery as TgCallbackQuery;

use newsbot_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::CallbackQuery,
};

/// Button presses on our own messages. Inline-mode queries carry no message
/// and empty payloads carry no action; both yield `None`.
pub(crate) fn callback_from_query(q: &TgCallbackQuery) -> Option<CallbackQuery> {
    let message = q.message.as_ref()?;
    let data = q.data.as_deref().filter(|d| !d.is_empty())?;

    Some(CallbackQuery {
        chat_id: ChatId(message.chat.id.0),
        user_id: UserId(q.from.id.0 as i64),
        first_name: Some(q.from.first_name.clone()).filter(|n| !n.is_empty()),
        callback_id: q.id.clone(),
        data: data.to_string(),
        message: MessageRef {
            chat_id: ChatId(message.chat.id.0),
            message_id: MessageId(message.id.0),
        },
    })
}
