//! Gateway event handler: bot presence plus the `ping` and `status`
//! chat commands.

use {
    serenity::{
        all::{ActivityData, Context, EventHandler, GatewayIntents, Message, Ready, ShardManager},
        async_trait,
    },
    std::sync::{Arc, OnceLock},
    tracing::{info, warn},
    verwatch_config::{DiscordConfig, WatchConfig},
    verwatch_watcher::WatermarkStore,
};

pub struct BotHandler {
    pub discord: DiscordConfig,
    pub watch: WatchConfig,
    pub store: Arc<dyn WatermarkStore>,
    /// Filled in once the serenity client has been built; `ping` reports
    /// `?ms` until then.
    pub shards: Arc<OnceLock<Arc<ShardManager>>>,
}

impl BotHandler {
    #[must_use]
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn latency_ms(&self, ctx: &Context) -> Option<u128> {
        let manager = self.shards.get()?;
        let runners = manager.runners.lock().await;
        runners
            .get(&ctx.shard_id)
            .and_then(|runner| runner.latency)
            .map(|latency| latency.as_millis())
    }

    async fn status_reply(&self) -> String {
        let watermark = match self.store.load().await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to read watermark for status command");
                None
            },
        };
        status_line(&self.watch.endpoint, watermark.as_deref())
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let presence = ActivityData::watching(format!("{} Tracker", self.watch.platform));
        ctx.set_activity(Some(presence));
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(command) = parse_command(&msg.content, &self.discord.command_prefix) else {
            return;
        };
        let response = match command {
            "ping" => ping_line(self.latency_ms(&ctx).await),
            "status" => self.status_reply().await,
            _ => return,
        };
        if let Err(e) = msg.reply(&ctx.http, &response).await {
            warn!(error = %e, command, "failed to send command reply");
        }
    }
}

fn parse_command<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    content.trim().strip_prefix(prefix)?.split_whitespace().next()
}

fn ping_line(latency_ms: Option<u128>) -> String {
    match latency_ms {
        Some(ms) => format!("> `Pong! {ms}ms`"),
        None => "> `Pong! ?ms`".to_owned(),
    }
}

fn status_line(endpoint: &str, watermark: Option<&str>) -> String {
    format!(
        "> `watching {endpoint} | last version date: {}`",
        watermark.unwrap_or("none yet")
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_commands() {
        assert_eq!(parse_command("!ping", "!"), Some("ping"));
        assert_eq!(parse_command("  !status now  ", "!"), Some("status"));
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("ping", "!"), None);
        assert_eq!(parse_command("?ping", "!"), None);
    }

    #[test]
    fn ping_reports_latency_or_placeholder() {
        assert_eq!(ping_line(Some(42)), "> `Pong! 42ms`");
        assert_eq!(ping_line(None), "> `Pong! ?ms`");
    }

    #[test]
    fn status_covers_first_run() {
        let line = status_line("https://example.com/api", None);
        assert_eq!(
            line,
            "> `watching https://example.com/api | last version date: none yet`"
        );

        let line = status_line("https://example.com/api", Some("08/20/2026-14:30"));
        assert!(line.ends_with("last version date: 08/20/2026-14:30`"));
    }
}
