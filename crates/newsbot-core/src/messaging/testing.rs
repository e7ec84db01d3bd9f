use std::sync::{
    atomic::{AtomicI32, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    Send {
        chat_id: ChatId,
        html: String,
        keyboard: Option<InlineKeyboard>,
    },
    Edit {
        msg: MessageRef,
        html: String,
        keyboard: Option<InlineKeyboard>,
    },
    EditKeyboard {
        msg: MessageRef,
        keyboard: Option<InlineKeyboard>,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
    },
}

/// Messenger fake that records every call in order.
#[derive(Default)]
pub struct RecordingMessenger {
    log: Mutex<Vec<Outbound>>,
    next_id: AtomicI32,
    /// Sends to this chat fail with an upstream error.
    pub failing_chat: Option<ChatId>,
}

impl RecordingMessenger {
    pub fn failing_for(chat_id: ChatId) -> Self {
        Self {
            failing_chat: Some(chat_id),
            ..Default::default()
        }
    }

    pub fn all(&self) -> Vec<Outbound> {
        self.log.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(ChatId, String, Option<InlineKeyboard>)> {
        self.all()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Send {
                    chat_id,
                    html,
                    keyboard,
                } => Some((chat_id, html, keyboard)),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(String, Option<InlineKeyboard>)> {
        self.all()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Edit { html, keyboard, .. } => Some((html, keyboard)),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<Option<String>> {
        self.all()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Answer { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, o: Outbound) {
        self.log.lock().unwrap().push(o);
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        if self.failing_chat == Some(chat_id) {
            return Err(Error::Upstream("telegram error: chat not found".to_string()));
        }
        self.push(Outbound::Send {
            chat_id,
            html: html.to_string(),
            keyboard,
        });
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        self.push(Outbound::Edit {
            msg,
            html: html.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn edit_keyboard(
        &self,
        msg: MessageRef,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        self.push(Outbound::EditKeyboard { msg, keyboard });
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.push(Outbound::Answer {
            callback_id: callback_id.to_string(),
            text: text.map(|t| t.to_string()),
        });
        Ok(())
    }
}
