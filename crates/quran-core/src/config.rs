use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Local proxy/static server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for every path that is not an audio route.
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,
    /// Upstream mirrors tried in order. `{num}` is replaced by the
    /// zero-padded chapter number.
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
    #[serde(default = "default_mirror_timeout_secs")]
    pub mirror_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Metadata endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_chapters_primary")]
    pub chapters_primary: String,
    #[serde(default = "default_chapters_secondary")]
    pub chapters_secondary: String,
    #[serde(default = "default_editions")]
    pub editions: String,
    /// Base for `{ayahs}/{chapter}/{edition}`.
    #[serde(default = "default_ayahs")]
    pub ayahs: String,
    /// Edition used when the edition list cannot be fetched.
    #[serde(default = "default_edition")]
    pub default_edition: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How long one audio candidate may take to become playable.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
    /// Where the proxy is reachable from the player; empty disables the
    /// proxy candidate.
    #[serde(default = "default_proxy_base_url")]
    pub proxy_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the key-value store (favorites).
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            static_root: default_static_root(),
            mirrors: default_mirrors(),
            mirror_timeout_secs: default_mirror_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            chapters_primary: default_chapters_primary(),
            chapters_secondary: default_chapters_secondary(),
            editions: default_editions(),
            ayahs: default_ayahs(),
            default_edition: default_edition(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout_secs(),
            items_per_page: default_items_per_page(),
            proxy_base_url: default_proxy_base_url(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_mirrors() -> Vec<String> {
    vec![
        "https://everyayah.com/quran/{num}.mp3".to_string(),
        "https://data.alquran.cloud/files/audio/alafasy/{num}.mp3".to_string(),
        "https://www.quranaudio.com/quran/{num}_Muhammad_al-Jibaly.mp3".to_string(),
        "https://www.mp3quran.net/api/v3/files/get_file?file_id={num}_jbreen_128".to_string(),
    ]
}

fn default_mirror_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_chapters_primary() -> String {
    "https://api.quran.com/api/v4/chapters".to_string()
}

fn default_chapters_secondary() -> String {
    "https://api.alquran.cloud/v1/surah".to_string()
}

fn default_editions() -> String {
    "https://api.alquran.cloud/v1/edition?language=ar&format=audio".to_string()
}

fn default_ayahs() -> String {
    "https://api.alquran.cloud/v1/surah".to_string()
}

fn default_edition() -> String {
    "ar.abdulbasitmurattal".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_probe_timeout_secs() -> u64 {
    15
}

fn default_items_per_page() -> usize {
    12
}

fn default_proxy_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_store_dir() -> PathBuf {
    platform::data_dir().join("store")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
