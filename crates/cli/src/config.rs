//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// News source implementation: http, stub
    #[serde(default = "default_news_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for each remote call, in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a successful fetch satisfies reads, in seconds
    #[serde(default = "default_staleness_window")]
    pub staleness_window_secs: u64,

    /// Maximum entries in the related-articles list
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity implementation: cognito, stub
    #[serde(default = "default_identity_provider")]
    pub provider: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// User-pool app client id (public client, no secret)
    #[serde(default)]
    pub client_id: String,

    /// Endpoint override, mainly for testing against a local server
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_news_provider() -> String {
    "http".to_string()
}

fn default_base_url() -> String {
    "https://news.example.com".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

fn default_staleness_window() -> u64 {
    300
}

fn default_related_limit() -> usize {
    10
}

fn default_identity_provider() -> String {
    "cognito".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: default_news_provider(),
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness_window_secs: default_staleness_window(),
            related_limit: default_related_limit(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: default_identity_provider(),
            region: default_region(),
            client_id: String::new(),
            endpoint: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("NEWSDESK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# newsdesk configuration

[general]
log_level = "info"

[api]
provider = "http"  # http, stub
base_url = "https://news.example.com"
timeout_secs = 10

[cache]
# A successful fetch satisfies reads for this long
staleness_window_secs = 300
related_limit = 10

[identity]
provider = "cognito"  # cognito, stub
region = "us-east-1"
client_id = "your-app-client-id"
# endpoint = "http://localhost:9229"

[watch]
poll_interval_secs = 60
"#
        .to_string()
    }
}
