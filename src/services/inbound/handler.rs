// File: src/services/inbound/handler.rs
use crate::db::postgres::models::user::NewUser;
use crate::db::postgres::repository::user_repository::TraitUserRepository;
use crate::services::notifications::dispatcher::NotificationDispatcher;
use crate::services::notifications::sink::ReplyKeyboard;
use crate::services::rates::fetcher::RateFetcher;
use crate::services::rates::format::format_quote_message;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Label of the reply-keyboard button; pressing it sends this exact text.
pub const EXCHANGE_RATE_BUTTON: &str = "📊 Exchange Rate";

pub const WELCOME_MESSAGE: &str = "👋 Welcome to the Kazakhstan Currency Exchange Bot! 🇰🇿\n\n\
    I can provide you with the latest exchange rates for the Kazakhstani Tenge (KZT) \
    against major currencies like USD, EUR, and RUB. 💱\n\n";

pub const RATES_UNAVAILABLE_MESSAGE: &str =
    "⚠️ Exchange rates are temporarily unavailable. Please try again later.";

/// A chat message already extracted from the webhook payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InboundMessage {
    pub chat_id: Option<i64>,
    pub text: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCommand {
    Start,
    ExchangeRate,
}

impl InboundCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with("/start") {
            Some(InboundCommand::Start)
        } else if text == EXCHANGE_RATE_BUTTON || text == "/rate" {
            Some(InboundCommand::ExchangeRate)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Missing chat id, empty text or an unknown command
    Ignored,
    Welcomed { newly_registered: bool },
    RateSent,
    RateUnavailable,
}

pub struct InboundMessageHandler {
    users: Arc<dyn TraitUserRepository + Send + Sync>,
    fetcher: Arc<RateFetcher>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl InboundMessageHandler {
    pub fn new(
        users: Arc<dyn TraitUserRepository + Send + Sync>,
        fetcher: Arc<RateFetcher>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            fetcher,
            dispatcher,
        }
    }

    pub async fn handle(&self, message: InboundMessage) -> InboundOutcome {
        let (Some(chat_id), Some(text)) = (message.chat_id, message.text.as_deref()) else {
            debug!("Ignoring update without chat id or text");
            return InboundOutcome::Ignored;
        };
        if text.trim().is_empty() {
            debug!("Ignoring empty message from chat {}", chat_id);
            return InboundOutcome::Ignored;
        }

        match InboundCommand::parse(text) {
            Some(InboundCommand::Start) => self.handle_start(chat_id, &message).await,
            Some(InboundCommand::ExchangeRate) => self.handle_rate_request(chat_id).await,
            None => {
                debug!("Ignoring unrecognized message from chat {}", chat_id);
                InboundOutcome::Ignored
            }
        }
    }

    async fn handle_start(&self, chat_id: i64, message: &InboundMessage) -> InboundOutcome {
        let user = NewUser {
            tg_id: chat_id,
            username: message.username.clone(),
            first_name: message.first_name.clone(),
            last_name: message.last_name.clone(),
        };

        // Registration commits before the welcome goes out.
        let newly_registered = match self.users.register(&user).await {
            Ok(created) => {
                if created {
                    info!("Registered new user {}", chat_id);
                }
                created
            }
            Err(e) => {
                error!("Failed to register user {}: {}", chat_id, e);
                false
            }
        };

        self.dispatcher
            .send_one(
                &chat_id.to_string(),
                WELCOME_MESSAGE,
                Some(ReplyKeyboard::single_button(EXCHANGE_RATE_BUTTON)),
            )
            .await;

        InboundOutcome::Welcomed { newly_registered }
    }

    async fn handle_rate_request(&self, chat_id: i64) -> InboundOutcome {
        let recipient = chat_id.to_string();

        match self.fetcher.fetch().await {
            Ok(quote) => {
                self.dispatcher
                    .send_one(&recipient, &format_quote_message(&quote), None)
                    .await;
                InboundOutcome::RateSent
            }
            Err(e) => {
                warn!("Rate request from chat {} failed: {}", chat_id, e);
                self.dispatcher
                    .send_one(&recipient, RATES_UNAVAILABLE_MESSAGE, None)
                    .await;
                InboundOutcome::RateUnavailable
            }
        }
    }
}
