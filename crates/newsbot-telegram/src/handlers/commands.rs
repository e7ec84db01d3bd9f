use teloxide::types::Message;

use newsbot_core::{
    domain::{ChatId, UserId},
    messaging::types::Command,
};

/// Command name without the slash, any `@botname` suffix or arguments.
pub(crate) fn command_name(text: &str) -> String {
    // Telegram may send `/cmd@botname arg1 ...`
    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Slash commands only; plain text and media are not part of the conversation.
pub(crate) fn command_from_message(msg: &Message) -> Option<Command> {
    let text = msg.text()?;
    if !text.starts_with('/') {
        return None;
    }
    let user = msg.from()?;
    let name = command_name(text);
    if name.is_empty() {
        return None;
    }

    Some(Command {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0 as i64),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
        name,
    })
}
