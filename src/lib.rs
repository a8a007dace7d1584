//! # Tutorbot
//!
//! Chat-bot front end for a school tutoring service, built with Rust, Axum
//! and PostgreSQL.
//!
//! ## Overview
//!
//! - **Registration**: a per-conversation state machine that turns a shared
//!   contact into a student, co-teacher or teacher profile
//! - **Enrollment codes**: teachers mint single-use five-character codes
//!   that bind a co-teacher to their subject
//! - **Ticket relay**: questions are forwarded to a staffed admin chat and
//!   admin replies are routed back to the requester
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # API key guard
//! ├── modules/          # Feature modules
//! │   ├── registration/ # Registration state machine
//! │   ├── codes/        # Code issuance and redemption
//! │   ├── tickets/      # Ticket submission and reply routing
//! │   ├── profiles/     # Account view and profile lookup
//! │   ├── dispatch/     # Event routing and the /api/events endpoint
//! │   └── telegram/     # Bot API client, webhook and long polling
//! ├── store/            # Storage traits, PostgreSQL and in-memory backends
//! ├── session.rs        # Per-conversation dialogue state
//! └── texts.rs          # User-facing texts and keyboards
//! ```
//!
//! Handlers never send anything themselves: the dispatcher returns
//! [`tutorbot_models::OutgoingMessage`]s and the transport delivers them
//! through a [`messenger::Messenger`].
//!
//! ## Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BOT_TOKEN` | - | Bot API token |
//! | `ADMIN_CHAT_ID` | - | Chat receiving tickets |
//! | `WEBHOOK_SECRET` | - | Expected webhook secret header |
//! | `STORAGE_BACKEND` | `postgres` | `postgres` or `memory` |
//! | `DATABASE_URL` | - | PostgreSQL connection string |
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` | HTTP listener |
//! | `API_KEY` | - | Required `X-Api-Key` for `/api` routes |
//! | `OBSERVABILITY_ENABLED` | `true` | Prometheus metrics |

pub mod logging;
pub mod messenger;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod session;
pub mod state;
pub mod store;
pub mod texts;

pub use state::AppState;
