use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tutorbot::logging::init_tracing;
use tutorbot::metrics::init_metrics;
use tutorbot::modules::codes::CodeService;
use tutorbot::modules::telegram::{TelegramClient, run_polling};
use tutorbot::router::init_router;
use tutorbot::state::{AppState, init_app_state, init_storage};
use tutorbot_config::{BotConfig, StorageConfig};
use tutorbot_db::{init_db_pool, run_migrations};
use tutorbot_models::UserIdentity;

#[derive(Parser)]
#[command(name = "tutorbot")]
#[command(about = "Tutoring school bot: registration, enrollment codes and support tickets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the webhook and HTTP API (default)
    Serve,
    /// Long-poll the Bot API for updates while serving the HTTP API
    Poll,
    /// Register the webhook URL with the Bot API
    SetWebhook {
        /// Public URL of `/telegram/webhook`
        url: String,
    },
    /// Apply pending database migrations
    Migrate,
    /// Issue an enrollment code for a registered teacher
    IssueCode {
        /// Teacher's handle or numeric id
        identity: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(init_app_state().await?, false).await,
        Commands::Poll => serve(init_app_state().await?, true).await,
        Commands::SetWebhook { url } => {
            let client = TelegramClient::new(BotConfig::from_env())?;
            client.set_webhook(&url).await?;
            info!(%url, "Webhook registered");
            Ok(())
        }
        Commands::Migrate => {
            let pool = init_db_pool(&StorageConfig::from_env()).await?;
            run_migrations(&pool).await?;
            Ok(())
        }
        Commands::IssueCode { identity } => {
            let storage = init_storage(&StorageConfig::from_env()).await?;
            let identity = UserIdentity::new(identity.trim_start_matches('@'));
            let code = CodeService::issue(storage.as_ref(), &identity)
                .await
                .with_context(|| format!("Failed to issue a code for {identity}"))?;
            println!("{} ({})", code.code, code.subject.display_name());
            Ok(())
        }
    }
}

async fn serve(state: AppState, poll: bool) -> anyhow::Result<()> {
    let metrics = init_metrics()?;
    let address = state.server_config.bind_address();

    if poll {
        let client = state
            .telegram
            .clone()
            .context("BOT_TOKEN must be set to poll for updates")?;
        tokio::spawn(run_polling(state.clone(), client));
    }

    let app = init_router(state, metrics);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
