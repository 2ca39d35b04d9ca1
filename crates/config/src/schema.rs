//! Config schema types for the watch loop and the Discord client.

use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerwatchConfig {
    pub watch: WatchConfig,
    pub discord: DiscordConfig,
}

/// Polling and endpoint configuration for the change watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Version endpoint polled for changes.
    pub endpoint: String,

    /// Seconds between polls.
    pub interval_secs: u64,

    /// Upper bound on a single fetch. An unbounded request would stall the
    /// whole loop, so this must stay finite.
    pub request_timeout_secs: u64,

    /// Platform label shown in notifications.
    pub platform: String,

    /// JSON field of the endpoint response holding the platform version.
    pub version_field: String,

    /// JSON field of the endpoint response holding the version date.
    pub date_field: String,

    /// Watermark file path. Unset means a per-user default under the data
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://whatexpsare.online/api/versions/current".into(),
            interval_secs: 100,
            request_timeout_secs: 30,
            platform: "Windows".into(),
            version_field: "Windows".into(),
            date_field: "WindowsDate".into(),
            state_file: None,
        }
    }
}

/// Configuration for the Discord delivery side.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Channel that receives update notifications.
    pub channel_id: u64,

    /// Role mentioned alongside each notification. Absent or 0 sends the
    /// notification without a ping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping_role_id: Option<u64>,

    /// Prefix for chat commands.
    pub command_prefix: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("ping_role_id", &self.ping_role_id)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            channel_id: 0,
            ping_role_id: None,
            command_prefix: "!".into(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = VerwatchConfig::default();
        assert_eq!(cfg.watch.interval_secs, 100);
        assert_eq!(cfg.watch.request_timeout_secs, 30);
        assert_eq!(cfg.watch.version_field, "Windows");
        assert_eq!(cfg.watch.date_field, "WindowsDate");
        assert_eq!(cfg.discord.command_prefix, "!");
        assert!(cfg.discord.ping_role_id.is_none());
    }

    #[test]
    fn deserialize_from_toml() {
        let toml = r#"
[watch]
endpoint = "https://example.com/versions"
interval_secs = 30

[discord]
token = "abc.def.ghi"
channel_id = 1234567890
ping_role_id = 42
"#;
        let cfg: VerwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.watch.endpoint, "https://example.com/versions");
        assert_eq!(cfg.watch.interval_secs, 30);
        assert_eq!(cfg.discord.token.expose_secret(), "abc.def.ghi");
        assert_eq!(cfg.discord.channel_id, 1234567890);
        assert_eq!(cfg.discord.ping_role_id, Some(42));
        // defaults for unspecified fields
        assert_eq!(cfg.watch.platform, "Windows");
        assert_eq!(cfg.discord.command_prefix, "!");
    }

    #[test]
    fn serialize_roundtrip() {
        let cfg = VerwatchConfig {
            discord: DiscordConfig {
                token: Secret::new("tok".into()),
                channel_id: 99,
                ..Default::default()
            },
            ..Default::default()
        };
        let toml = toml::to_string(&cfg).unwrap();
        let cfg2: VerwatchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(cfg2.discord.channel_id, 99);
        assert_eq!(cfg2.discord.token.expose_secret(), "tok");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = DiscordConfig {
            token: Secret::new("very-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("very-secret"));
    }
}
