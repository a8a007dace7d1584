//! Bot API configuration.
//!
//! # Environment Variables
//!
//! - `BOT_TOKEN`: Bot API token (required for the Telegram transport)
//! - `ADMIN_CHAT_ID`: Chat that receives support tickets (optional)
//! - `TELEGRAM_API_URL`: Bot API base URL (default: `https://api.telegram.org`)
//! - `WEBHOOK_SECRET`: Expected `X-Telegram-Bot-Api-Secret-Token` header (optional)
//! - `POLL_TIMEOUT_SECONDS`: Long-polling timeout for `getUpdates` (default: 30)

use crate::{env_opt, env_or};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: Option<String>,

    /// Chat id of the staffed admin channel tickets are forwarded to.
    pub admin_chat_id: Option<i64>,

    pub api_url: String,

    pub webhook_secret: Option<String>,

    pub poll_timeout_seconds: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            admin_chat_id: None,
            api_url: DEFAULT_API_URL.to_string(),
            webhook_secret: None,
            poll_timeout_seconds: 30,
        }
    }
}

impl BotConfig {
    /// Creates a new `BotConfig` from environment variables.
    ///
    /// Falls back to default values if optional variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            token: env_opt("BOT_TOKEN"),
            admin_chat_id: env_opt("ADMIN_CHAT_ID").and_then(|v| v.parse().ok()),
            api_url: env_opt("TELEGRAM_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            webhook_secret: env_opt("WEBHOOK_SECRET"),
            poll_timeout_seconds: env_or("POLL_TIMEOUT_SECONDS", 30),
        }
    }

    /// Base URL for Bot API method calls, e.g. `<api>/bot<token>/sendMessage`.
    pub fn method_url(&self, method: &str) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("{}/bot{}/{}", self.api_url, token, method))
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("admin_chat_id", &self.admin_chat_id)
            .field("api_url", &self.api_url)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("poll_timeout_seconds", &self.poll_timeout_seconds)
            .finish()
    }
}
