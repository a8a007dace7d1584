//! # Tutorbot Config
//!
//! Configuration types for the Tutorbot service.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`bot`]: Bot API credentials, admin channel and polling settings
//! - [`server`]: HTTP listener settings
//! - [`storage`]: Storage backend selection and database settings
//!
//! # Example
//!
//! ```ignore
//! use tutorbot_config::{BotConfig, ServerConfig, StorageConfig};
//!
//! // Load all configs from environment
//! let bot_config = BotConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod bot;
pub mod server;
pub mod storage;

// Re-export commonly used types at crate root
pub use bot::BotConfig;
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a non-empty environment variable.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
