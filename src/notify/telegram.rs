//! Telegram notification channel via the Bot API.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;

const TELEGRAM_TIMEOUT_SECS: u64 = 10;

pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TELEGRAM_TIMEOUT_SECS))
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    /// Send one message. The title goes in bold above the body, HTML parse
    /// mode, link previews left on.
    pub fn send(&self, title: &str, body: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let payload = json!({
            "chat_id": self.chat_id,
            "text": format!("<b>{title}</b>\n\n{body}"),
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .context("Telegram sendMessage request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Telegram sendMessage returned HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            );
        }

        Ok(())
    }
}
