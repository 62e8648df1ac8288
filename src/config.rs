//! Configuration and settings management
//!
//! Loads settings from environment variables and defines process-wide
//! constants for the search relay.

use crate::relay::ChannelRef;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Chat the bot listens in for search queries (group IDs start with -100)
    pub target_chat_id: i64,

    /// Ordered list of channels to search, separated by commas, semicolons
    /// or whitespace. Accepts @handles, numeric IDs and t.me invite links.
    #[serde(rename = "search_channels")]
    pub search_channels_str: Option<String>,

    /// Base URL of the MTProto search gateway sidecar
    pub gateway_url: String,

    /// Illustrative image attached to non-empty result replies
    #[serde(default = "default_result_image_path")]
    pub result_image_path: String,

    /// Global maximum number of hits per query, across all channels
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Maximum matches requested from each channel
    #[serde(default = "default_per_channel_limit")]
    pub per_channel_limit: usize,

    /// Timeout for one channel's resolve + search round trip
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
}

fn default_result_image_path() -> String {
    "result_image.jpg".to_string()
}

const fn default_result_cap() -> usize {
    5
}

const fn default_per_channel_limit() -> usize {
    2
}

const fn default_search_timeout_secs() -> u64 {
    20
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a required value is
    /// missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Environment::default() auto-converts UPPER_SNAKE_CASE to
            // snake_case; ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Returns the configured search channels, in priority order.
    ///
    /// Earlier channels are searched first and win when the global result
    /// cap is reached. Duplicate entries are kept as configured.
    #[must_use]
    pub fn channels(&self) -> Vec<ChannelRef> {
        self.search_channels_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(ChannelRef::parse)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// Telegram API retry configuration
/// Initial backoff before retrying a failed send
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound on the backoff delay
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 5_000;
/// Send attempts before giving up
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

/// Maximum caption length for photo replies with safety margin.
/// Telegram's official limit is 1024; the margin absorbs the truncation
/// suffix and HTML tags.
pub const TELEGRAM_CAPTION_LIMIT: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::ChannelRef;
    use std::env;

    fn dummy_settings(channels: Option<&str>) -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            target_chat_id: -1_001_234,
            search_channels_str: channels.map(str::to_string),
            gateway_url: "http://localhost:8800".to_string(),
            result_image_path: default_result_image_path(),
            result_cap: default_result_cap(),
            per_channel_limit: default_per_channel_limit(),
            search_timeout_secs: default_search_timeout_secs(),
        }
    }

    #[test]
    fn test_channel_list_parsing_keeps_order() {
        let settings = dummy_settings(Some(
            "@mycanals237, -1001234567890\nhttps://t.me/+0-3FLuSLHR5iOWVk",
        ));
        let channels = settings.channels();
        assert_eq!(
            channels,
            vec![
                ChannelRef::Handle("@mycanals237".to_string()),
                ChannelRef::Id(-1_001_234_567_890),
                ChannelRef::Invite("https://t.me/+0-3FLuSLHR5iOWVk".to_string()),
            ]
        );
    }

    #[test]
    fn test_channel_list_empty() {
        assert!(dummy_settings(None).channels().is_empty());
        assert!(dummy_settings(Some("  ;, ")).channels().is_empty());
    }

    #[test]
    fn test_defaults() {
        let settings = dummy_settings(None);
        assert_eq!(settings.result_cap, 5);
        assert_eq!(settings.per_channel_limit, 2);
        assert_eq!(settings.search_timeout_secs, 20);
        assert_eq!(settings.result_image_path, "result_image.jpg");
    }

    // Runs env mutations in a single test to avoid race conditions with
    // other tests reading the environment.
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("TELEGRAM_TOKEN", "dummy_token");
        env::set_var("TARGET_CHAT_ID", "-1009999");
        env::set_var("GATEWAY_URL", "http://gateway:8800");
        env::set_var("SEARCH_CHANNELS", "@a @b");

        let settings = Settings::new()?;
        assert_eq!(settings.telegram_token, "dummy_token");
        assert_eq!(settings.target_chat_id, -1_009_999);
        assert_eq!(settings.channels().len(), 2);

        env::remove_var("TELEGRAM_TOKEN");
        env::remove_var("TARGET_CHAT_ID");
        env::remove_var("GATEWAY_URL");
        env::remove_var("SEARCH_CHANNELS");
        Ok(())
    }
}
