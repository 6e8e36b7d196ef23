use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app_state::models::AppState;
use crate::services::inbound::handler::InboundMessage;

/// The subset of a Telegram `Update` the bot reads. Every field is optional so
/// that any well-formed JSON decodes.
#[derive(Debug, Default, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub message: Option<UpdateMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMessage {
    #[serde(default)]
    pub chat: Option<UpdateChat>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<UpdateSender>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChat {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSender {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl TelegramUpdate {
    /// Decodes a raw body; anything that does not fit the schema is an empty update.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(update) => update,
            Err(e) => {
                debug!("Undecodable webhook payload treated as empty: {}", e);
                TelegramUpdate::default()
            }
        }
    }

    pub fn into_inbound(self) -> InboundMessage {
        let Some(message) = self.message else {
            return InboundMessage::default();
        };
        let sender = message.from.unwrap_or_default();

        InboundMessage {
            chat_id: message.chat.and_then(|chat| chat.id),
            text: message.text,
            username: sender.username,
            first_name: sender.first_name,
            last_name: sender.last_name,
        }
    }
}

/// An empty configured secret disables the check.
pub fn is_authorized(expected: &str, given: &str) -> bool {
    expected.is_empty() || expected == given
}

pub async fn webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(secret): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    if !is_authorized(&app_state.settings.app_env.webhook_secret, &secret) {
        warn!("Rejected webhook call with invalid secret");
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "forbidden"})));
    }

    let inbound = TelegramUpdate::from_body(&body).into_inbound();
    let outcome = app_state.inbound_handler.handle(inbound).await;
    debug!("Webhook handled: {:?}", outcome);

    (StatusCode::OK, Json(json!({"ok": true})))
}
