use crate::messenger::{LogMessenger, Messenger};
use crate::modules::telegram::TelegramClient;
use crate::session::SessionRegistry;
use crate::store::{MemoryStorage, PgStorage, Storage};
use std::sync::Arc;
use tracing::{info, warn};
use tutorbot_config::{BotConfig, ServerConfig, StorageBackend, StorageConfig};
use tutorbot_db::init_db_pool;
use tutorbot_models::ChatId;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub sessions: SessionRegistry,
    pub messenger: Arc<dyn Messenger>,
    pub telegram: Option<TelegramClient>,
    pub bot_config: BotConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    /// State backed by in-process storage that logs instead of sending.
    pub fn in_memory(bot_config: BotConfig) -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            sessions: SessionRegistry::new(),
            messenger: Arc::new(LogMessenger),
            telegram: None,
            bot_config,
            server_config: ServerConfig::default(),
        }
    }

    pub fn admin_chat(&self) -> Option<ChatId> {
        self.bot_config.admin_chat_id.map(ChatId)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("telegram", &self.telegram.is_some())
            .field("bot_config", &self.bot_config)
            .field("server_config", &self.server_config)
            .finish()
    }
}

pub async fn init_storage(config: &StorageConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Postgres => {
            let pool = init_db_pool(config).await?;
            Ok(Arc::new(PgStorage::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; profiles and codes are lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let bot_config = BotConfig::from_env();
    let server_config = ServerConfig::from_env();
    let storage = init_storage(&StorageConfig::from_env()).await?;

    let telegram = match TelegramClient::new(bot_config.clone()) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "Telegram transport disabled; outgoing messages are only logged");
            None
        }
    };
    let messenger: Arc<dyn Messenger> = match &telegram {
        Some(client) => Arc::new(client.clone()),
        None => Arc::new(LogMessenger),
    };

    if bot_config.admin_chat_id.is_none() {
        info!("ADMIN_CHAT_ID not set; ticket submission is disabled");
    }

    Ok(AppState {
        storage,
        sessions: SessionRegistry::new(),
        messenger,
        telegram,
        bot_config,
        server_config,
    })
}
