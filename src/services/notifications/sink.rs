use async_trait::async_trait;
use std::time::Duration;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, Recipient};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DispatchCause {
    #[error("invalid chat id")]
    InvalidChatId,
    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Reply keyboard, independent of the delivery client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
}

impl ReplyKeyboard {
    pub fn single_button(label: &str) -> Self {
        Self {
            rows: vec![vec![label.to_string()]],
            resize: true,
        }
    }
}

/// Delivers one message to one chat.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<ReplyKeyboard>,
    ) -> Result<(), DispatchCause>;
}

pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<ReplyKeyboard>,
    ) -> Result<(), DispatchCause> {
        let recipient = parse_recipient(chat_id)?;
        debug!("Sending message to {}", chat_id);

        let mut request = self.bot.send_message(recipient, text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_markup(&keyboard));
        }
        request.await?;

        Ok(())
    }
}

/// Accepts numeric chat ids and `@channel` usernames.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient, DispatchCause> {
    let chat_id = chat_id.trim();

    if let Ok(id) = chat_id.parse::<i64>() {
        if id != 0 {
            return Ok(Recipient::Id(ChatId(id)));
        }
    } else if chat_id.len() > 1 && chat_id.starts_with('@') {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }

    Err(DispatchCause::InvalidChatId)
}

fn to_markup(keyboard: &ReplyKeyboard) -> KeyboardMarkup {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect::<Vec<_>>());

    let markup = KeyboardMarkup::new(rows);
    if keyboard.resize {
        markup.resize_keyboard()
    } else {
        markup
    }
}
