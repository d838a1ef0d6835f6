use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub storage: StorageSettings,
    pub ai: AiSettings,
    pub chat: ChatSettings,
    pub listing: ListingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
    pub server_selection_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

/// Local object storage for avatars, chat attachments and documents.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub root: String,
    pub max_upload_bytes: u64,
}

/// Generative-AI endpoint used by the feedback analysis helper.
#[derive(Debug, Deserialize, Clone)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatSettings {
    pub page_limit: u32,
    pub notification_dedup_capacity: usize,
}

/// Fixed result limits for one-shot listing pages.
#[derive(Debug, Deserialize, Clone)]
pub struct ListingSettings {
    pub fetch_limit: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("PEOPLEDESK"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "peopledesk")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.issuer", "peopledesk")?
            .set_default("storage.root", "/tmp/peopledesk-storage")?
            .set_default("storage.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("ai.endpoint", "https://api.anthropic.com/v1/messages")?
            .set_default("ai.model", "claude-sonnet-4-5-20250929")?
            .set_default("ai.max_tokens", 1024)?
            .set_default("chat.page_limit", 50)?
            .set_default("chat.notification_dedup_capacity", 100)?
            .set_default("listing.fetch_limit", 100)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
