pub mod client;
pub mod controller;
pub mod model;
pub mod router;

pub use client::{TelegramClient, TelegramError};
pub use controller::{handle_update, run_polling};
