use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub blob: BlobConfig,
    pub cdn: CdnConfig,
    pub verification: VerificationConfig,
    pub memory: MemorySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Server-side allowlist of curator passwords. Empty list locks curator
    /// mode and all `/api/admin/*` routes.
    pub curator_passwords: Vec<String>,
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Base URL of the key-addressed blob service. The `memory:` scheme
    /// selects the in-process store (local development, tests).
    pub base_url: String,
    pub read_token: Option<String>,
    pub write_token: Option<String>,
    pub timeout_secs: u64,
    pub list_page_size: u32,
    /// Append a cache-busting query parameter to blob reads.
    pub cache_bust: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CdnConfig {
    pub delivery_base_url: String,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout_secs: u64,
}

/// Anti-bot verification. A missing secret makes verification pass open,
/// intentional for environments without the secret configured.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    pub secret: Option<String>,
    pub verify_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemorySettings {
    /// Maximum accepted body length, in characters.
    pub body_max_len: usize,
    /// List previews are truncated to this many characters plus an ellipsis.
    pub preview_len: usize,
    /// The list view returns at most this many entries, newest first.
    pub index_cap: usize,
    pub hydrate_concurrency: usize,
    pub photo_delete_concurrency: usize,
    pub janitor_interval_secs: u64,
    pub list_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("KEEPSAKE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("KEEPSAKE_PORT", 3000),
                curator_passwords: env::var("KEEPSAKE_CURATOR_PASSWORDS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                session_ttl_secs: parse_env_or("KEEPSAKE_SESSION_TTL", 86400),
            },
            blob: BlobConfig {
                base_url: env::var("BLOB_STORE_URL").unwrap_or_else(|_| "memory:".to_string()),
                read_token: env::var("BLOB_READ_TOKEN").ok(),
                write_token: env::var("BLOB_WRITE_TOKEN").ok(),
                timeout_secs: parse_env_or("BLOB_TIMEOUT", 30),
                list_page_size: parse_env_or("BLOB_LIST_PAGE_SIZE", 100),
                cache_bust: parse_env_or("BLOB_CACHE_BUST", true),
            },
            cdn: CdnConfig {
                delivery_base_url: env::var("CDN_DELIVERY_URL")
                    .unwrap_or_else(|_| "https://cdn.keepsake.example/image".to_string()),
                api_base_url: env::var("CDN_API_URL")
                    .unwrap_or_else(|_| "https://api.cdn.keepsake.example/v1/image".to_string()),
                api_key: env::var("CDN_API_KEY").ok(),
                api_secret: env::var("CDN_API_SECRET").ok(),
                timeout_secs: parse_env_or("CDN_TIMEOUT", 30),
            },
            verification: VerificationConfig {
                secret: env::var("VERIFY_SECRET").ok(),
                verify_url: env::var("VERIFY_URL").unwrap_or_else(|_| {
                    "https://challenges.verification.example/siteverify".to_string()
                }),
                timeout_secs: parse_env_or("VERIFY_TIMEOUT", 10),
            },
            memory: MemorySettings {
                body_max_len: parse_env_or("MEMORY_BODY_MAX_LEN", 5000),
                preview_len: parse_env_or("MEMORY_PREVIEW_LEN", 200),
                index_cap: parse_env_or("MEMORY_INDEX_CAP", 500),
                hydrate_concurrency: parse_env_or("MEMORY_HYDRATE_CONCURRENCY", 8),
                photo_delete_concurrency: parse_env_or("PHOTO_DELETE_CONCURRENCY", 4),
                janitor_interval_secs: parse_env_or("JANITOR_INTERVAL", 3600),
                list_cache_capacity: parse_env_or("LIST_CACHE_CAPACITY", 4),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
