//! Real State bot binary.
//!
//! Start the webhook server with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx WEBHOOK_URL=https://bot.example.com cargo run -p realstate-telegram
//! ```

use std::sync::Arc;

use clap::Parser;
use realstate_agent::{ClaudeCliRuntime, InMemorySessionStore, PropertyAgent, SystemClock};
use realstate_core::GroqTranscriber;
use realstate_persistence::SupabaseDirectory;
use realstate_telegram::{
    serve, AppState, InMemorySelectionStore, TelegramError, TelegramGateway, TeloxideGateway,
    WebhookHandler,
};
use tracing_subscriber::EnvFilter;

/// Real State Bot - property management assistant on Telegram
#[derive(Parser, Debug)]
#[command(name = "realstate-bot")]
#[command(about = "Telegram webhook server for the Real State property assistant")]
struct Args {
    /// Unregister the Telegram webhook and exit
    #[arg(long)]
    delete_webhook: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> realstate_telegram::Result<()> {
    let args = Args::parse();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "realstate_telegram=info,realstate_agent=info,realstate_persistence=info,realstate_core=info,tower_http=warn,teloxide=warn",
        1 => "realstate_telegram=debug,realstate_agent=debug,realstate_persistence=debug,realstate_core=debug,tower_http=info,teloxide=info",
        2 => "realstate_telegram=trace,realstate_agent=trace,realstate_persistence=trace,realstate_core=trace,tower_http=debug,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match realstate_core::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(TelegramError::Config(e));
        }
    };
    tracing::debug!(?settings, "Settings loaded");

    let gateway = Arc::new(TeloxideGateway::new(settings.telegram_bot_token.clone()));

    if args.delete_webhook {
        if gateway.delete_webhook().await {
            tracing::info!("Webhook deleted");
            return Ok(());
        }
        return Err(TelegramError::WebhookFailed(
            "deleteWebhook was not accepted".to_string(),
        ));
    }

    let agent = PropertyAgent::new(
        Arc::new(ClaudeCliRuntime::from_settings(settings)),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(SystemClock),
    );
    let handler = WebhookHandler::new(
        gateway.clone(),
        Arc::new(GroqTranscriber::new(settings.groq_api_key.clone())),
        Arc::new(SupabaseDirectory::new(
            &settings.supabase_url,
            settings.supabase_service_role_key.clone(),
        )),
        Arc::new(agent),
        Arc::new(InMemorySelectionStore::new()),
    );

    println!("\n[house] Real State Bot");
    println!("   Listening on: {}", settings.bind_address());
    println!("   Press Ctrl+C to stop\n");

    serve(settings, AppState::new(handler), gateway.as_ref()).await?;
    Ok(())
}
