use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Client for the Telegram Bot API send-message endpoint
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
}

// ============== Webhook Types ==============

/// One inbound webhook update.
///
/// Updates that are not new messages (edits, channel posts, callbacks)
/// deserialize with `message: None` and are acknowledged without a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// The message portion of an update; `text` is absent for stickers, photos,
/// voice notes, and membership events
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

/// Group chat ids are negative, so the full i64 range is kept
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

// ============== Errors ==============

/// Failure to hand a reply to the chat platform.
///
/// Delivery is best-effort: callers log these and keep serving.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("send request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("send rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

// ============== Implementation ==============

impl TelegramClient {
    pub fn new(bot_token: String) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token,
        })
    }

    /// Point the client at another base URL (tests)
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    /// Post one Markdown-formatted message, optionally threaded as a reply.
    /// Endpoint: POST /bot{token}/sendMessage
    pub async fn send_message(
        &self,
        text: &str,
        chat_id: i64,
        reply_to_message_id: Option<i64>,
    ) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "reply_to_message_id": reply_to_message_id,
        });

        let response = self.client.post(&url).json(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        tracing::debug!(chat_id, "reply delivered");
        Ok(())
    }
}
