use crate::messenger::Messenger;
use crate::modules::telegram::model::{
    AnswerCallbackQueryRequest, ApiResponse, GetUpdatesRequest, SendMessageRequest,
    SetWebhookRequest, Update,
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};
use tutorbot_config::BotConfig;
use tutorbot_models::OutgoingMessage;

const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("BOT_TOKEN is not configured")]
    MissingToken,

    #[error("request to Bot API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API method {method} failed: {description}")]
    Api { method: String, description: String },
}

/// Thin Bot API client over reqwest.
#[derive(Clone, Debug)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: BotConfig,
}

impl TelegramClient {
    pub fn new(config: BotConfig) -> Result<Self, TelegramError> {
        if config.token.is_none() {
            return Err(TelegramError::MissingToken);
        }

        // Long polls must finish before the client gives up on them.
        let http = reqwest::Client::builder()
            .user_agent(format!("tutorbot/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.poll_timeout_seconds + 15))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    async fn call<P, R>(&self, method: &str, payload: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .config
            .method_url(method)
            .ok_or(TelegramError::MissingToken)?;

        let response: ApiResponse<R> = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method: method.to_string(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    #[instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest::from(message))
            .await?;
        debug!("Message sent");
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQueryRequest {
                    callback_query_id: callback_query_id.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: self.config.poll_timeout_seconds,
                allowed_updates: ALLOWED_UPDATES.to_vec(),
            },
        )
        .await
    }

    /// Registers `url` as the webhook, passing the configured secret token.
    #[instrument(skip(self))]
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "setWebhook",
                &SetWebhookRequest {
                    url: url.to_string(),
                    secret_token: self.config.webhook_secret.clone(),
                    allowed_updates: ALLOWED_UPDATES.to_vec(),
                },
            )
            .await?;
        Ok(())
    }

    /// Removes any webhook so `getUpdates` can be used.
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, message: &OutgoingMessage) -> anyhow::Result<()> {
        TelegramClient::send_message(self, message).await?;
        Ok(())
    }
}
