use dotenvy::dotenv;
use filtre_bot::config::Settings;
use filtre_bot::gateway::GatewayClient;
use filtre_bot::bot;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting filtre-bot...");

    let settings = init_settings();
    let channels = settings.channels();
    if channels.is_empty() {
        warn!("No search channels configured; every query will come back empty.");
    }

    let client = init_gateway(&settings);
    let bot = Bot::new(settings.telegram_token.clone());

    info!(
        target_chat = settings.target_chat_id,
        channels = channels.len(),
        "Bot is running..."
    );

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![settings, client])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_gateway(settings: &Settings) -> Arc<GatewayClient> {
    match GatewayClient::new(&settings.gateway_url) {
        Ok(client) => {
            info!(url = %settings.gateway_url, "Search gateway client initialized.");
            Arc::new(client)
        }
        Err(e) => {
            error!("Failed to initialize search gateway client: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .filter(|msg: Message, settings: Arc<Settings>| {
            msg.chat.id.0 == settings.target_chat_id && msg.text().is_some()
        })
        .endpoint(handle_query_message)
}

async fn handle_query_message(
    bot: Bot,
    msg: Message,
    client: Arc<GatewayClient>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = Box::pin(bot::handlers::handle_query(bot, msg, client, settings)).await {
        error!("Query handler error: {}", e);
    }
    respond(())
}
