//! Posts update notices to a Discord channel as an embed, optionally
//! preceded by a role mention.

use {
    anyhow::{Context as _, Result, ensure},
    async_trait::async_trait,
    serenity::all::{
        ChannelId, Colour, CreateEmbed, CreateMessage, Http, Mentionable as _, RoleId,
    },
    std::sync::Arc,
    verwatch_config::DiscordConfig,
    verwatch_watcher::{UpdateNotice, UpdateSink},
};

const EMBED_COLOUR: Colour = Colour::new(0x0043_B581);

/// Delivers [`UpdateNotice`]s to a single Discord channel.
pub struct ChannelSink {
    http: Arc<Http>,
    channel_id: ChannelId,
    ping_role_id: Option<RoleId>,
}

impl ChannelSink {
    /// Errors when the configured channel id is zero.
    pub fn new(http: Arc<Http>, config: &DiscordConfig) -> Result<Self> {
        ensure!(config.channel_id != 0, "discord channel_id is not set");
        Ok(Self {
            http,
            channel_id: ChannelId::new(config.channel_id),
            ping_role_id: config.ping_role_id.filter(|id| *id != 0).map(RoleId::new),
        })
    }
}

#[async_trait]
impl UpdateSink for ChannelSink {
    async fn publish(&self, notice: &UpdateNotice) -> Result<()> {
        let message = build_message(notice, self.ping_role_id);
        self.channel_id
            .send_message(&self.http, message)
            .await
            .with_context(|| format!("failed to post update to channel {}", self.channel_id))?;
        Ok(())
    }
}

fn build_message(notice: &UpdateNotice, ping_role_id: Option<RoleId>) -> CreateMessage {
    let message = CreateMessage::new().embed(build_embed(notice));
    match ping_role_id {
        Some(role) => message.content(format!(
            "{}\n{} client has been updated!",
            role.mention(),
            notice.platform
        )),
        None => message,
    }
}

fn build_embed(notice: &UpdateNotice) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{} Client Update", notice.platform))
        .description(format!("{} client has been updated!", notice.platform))
        .colour(EMBED_COLOUR)
        .field("Platform", code_block(&notice.platform), false)
        .field("Version", code_block(&notice.version), false)
        .field("Version Date", code_block(&notice.date), false)
}

fn code_block(value: &str) -> String {
    format!("```\n{value}\n```")
}
