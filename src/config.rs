use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub advisor: AdvisorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the sqlite snapshot database
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "pricing-studio.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    /// Minimum interval between advice calls (client-side rate limit)
    pub cooldown_seconds: u64,
    pub max_tokens: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
            cooldown_seconds: 15,
            max_tokens: 512,
        }
    }
}

/// Load configuration from the given TOML file (optional) merged with
/// `PRICING_STUDIO__`-prefixed environment variables.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("PRICING_STUDIO").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    if cfg.storage.path.trim().is_empty() {
        anyhow::bail!("storage.path cannot be empty");
    }

    if cfg.advisor.enabled {
        if cfg.advisor.base_url.trim().is_empty() {
            anyhow::bail!("advisor.base_url cannot be empty when the advisor is enabled");
        }
        if cfg.advisor.model.trim().is_empty() {
            anyhow::bail!("advisor.model cannot be empty when the advisor is enabled");
        }
        if cfg.advisor.timeout_seconds == 0 {
            anyhow::bail!("advisor.timeout_seconds must be non-zero");
        }
    }

    Ok(())
}

impl Config {
    /// Copy of the configuration with the advisor API key masked, for
    /// `config show` output and logs.
    pub fn masked(&self) -> Config {
        let mut cfg = self.clone();
        if !cfg.advisor.api_key.is_empty() {
            cfg.advisor.api_key = "***".to_string();
        }
        cfg
    }
}
