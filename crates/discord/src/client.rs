//! Builds the serenity gateway client wired to the watcher's shared state.

use {
    crate::handler::BotHandler,
    anyhow::{Context as _, Result, ensure},
    secrecy::ExposeSecret as _,
    serenity::all::Client,
    std::sync::{Arc, OnceLock},
    verwatch_config::VerwatchConfig,
    verwatch_watcher::WatermarkStore,
};

/// Builds a gateway client whose handler answers chat commands against
/// `store`. The client is not started; the caller drives [`Client::start`].
pub async fn build_client(
    config: &VerwatchConfig,
    store: Arc<dyn WatermarkStore>,
) -> Result<Client> {
    let token = config.discord.token.expose_secret();
    ensure!(!token.is_empty(), "discord token is not set");

    let shards = Arc::new(OnceLock::new());
    let handler = BotHandler {
        discord: config.discord.clone(),
        watch: config.watch.clone(),
        store,
        shards: Arc::clone(&shards),
    };
    let client = Client::builder(token, BotHandler::intents())
        .event_handler(handler)
        .await
        .context("failed to build discord client")?;
    // Handler reads shard latency for the ping command once this is set.
    let _ = shards.set(client.shard_manager.clone());
    Ok(client)
}
