use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::engines;
use crate::error::{HarvestError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub engines: Vec<String>,
    pub harvest: HarvestConfig,
    pub stealth: StealthConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarvestConfig {
    pub max_pages: u32,
    pub links_per_page: usize,
    pub retry_attempts: u32,
    pub link_delay_range: (u64, u64), // milliseconds
    pub engine_switch_delay_range: (u64, u64), // milliseconds
    pub expand_query: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StealthConfig {
    pub randomize_user_agents: bool,
    pub proxy_list: Option<Vec<String>>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub format: String, // "text", "json"
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engines: engines::known_providers()
                .iter()
                .map(|p| p.name.to_string())
                .collect(),
            harvest: HarvestConfig {
                max_pages: 3,
                links_per_page: 20,
                retry_attempts: 3,
                link_delay_range: (1000, 3000),
                engine_switch_delay_range: (8000, 15000),
                expand_query: true,
            },
            stealth: StealthConfig {
                randomize_user_agents: true,
                proxy_list: None,
                request_timeout_secs: 30,
            },
            output: OutputConfig {
                format: "text".to_string(),
                directory: PathBuf::from("./pre-validated_lists"),
            },
        }
    }
}

#[async_trait::async_trait]
pub trait ConfigManager {
    async fn load_config(&self) -> Result<Config>;
    async fn save_config(&self, config: &Config) -> Result<()>;
    fn validate_config(&self, config: &Config) -> Result<()>;
}

pub struct FileConfigManager {
    config_path: PathBuf,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }
}

#[async_trait::async_trait]
impl ConfigManager for FileConfigManager {
    async fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        // check if config file exists, create default if not
        if !self.config_path.exists() {
            warn!(
                "Configuration file not found, creating default config at {:?}",
                self.config_path
            );
            self.create_default_config().await?;
        }

        // read and parse the config file
        let config_content = fs::read_to_string(&self.config_path)
            .map_err(|e| HarvestError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&config_content)
            .map_err(|e| HarvestError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;

        // validate the loaded config
        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    async fn save_config(&self, config: &Config) -> Result<()> {
        info!("Saving configuration to {:?}", self.config_path);

        let toml_content = toml::to_string_pretty(config)
            .map_err(|e| HarvestError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, toml_content)
            .map_err(|e| HarvestError::ConfigError(format!("Failed to write config file: {}", e)))?;

        info!("Configuration saved successfully");
        Ok(())
    }

    fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        // checking engine list against the known provider set
        if config.engines.is_empty() {
            return Err(
                HarvestError::ConfigError("Engine list cannot be empty".to_string()).into(),
            );
        }

        for engine in &config.engines {
            if engines::provider_by_name(engine).is_none() {
                return Err(HarvestError::ConfigError(format!(
                    "Unknown search engine '{}', known engines: {:?}",
                    engine,
                    engines::known_providers()
                        .iter()
                        .map(|p| p.name)
                        .collect::<Vec<_>>()
                ))
                .into());
            }
        }

        // checking harvest limits
        if config.harvest.max_pages == 0 {
            return Err(
                HarvestError::ConfigError("max_pages must be greater than 0".to_string()).into(),
            );
        }
        if config.harvest.max_pages > 10 {
            return Err(HarvestError::ConfigError(
                "max_pages cannot exceed 10, deep result pages are mostly noise".to_string(),
            )
            .into());
        }
        if config.harvest.links_per_page == 0 {
            return Err(HarvestError::ConfigError(
                "links_per_page must be greater than 0".to_string(),
            )
            .into());
        }
        if config.harvest.links_per_page > 50 {
            return Err(HarvestError::ConfigError(
                "links_per_page cannot exceed 50 to bound per-page cost".to_string(),
            )
            .into());
        }
        if config.harvest.retry_attempts == 0 || config.harvest.retry_attempts > 10 {
            return Err(HarvestError::ConfigError(
                "retry_attempts must be between 1 and 10".to_string(),
            )
            .into());
        }

        for (name, range) in [
            ("link_delay_range", config.harvest.link_delay_range),
            (
                "engine_switch_delay_range",
                config.harvest.engine_switch_delay_range,
            ),
        ] {
            if range.0 >= range.1 {
                return Err(HarvestError::ConfigError(format!(
                    "{} minimum must be less than maximum",
                    name
                ))
                .into());
            }
            if range.1 > 60000 {
                return Err(HarvestError::ConfigError(format!(
                    "{} maximum cannot exceed 60 seconds",
                    name
                ))
                .into());
            }
        }

        if config.stealth.request_timeout_secs == 0 || config.stealth.request_timeout_secs > 120 {
            return Err(HarvestError::ConfigError(
                "request_timeout_secs must be between 1 and 120".to_string(),
            )
            .into());
        }

        // checking proxy list if provided
        if let Some(ref proxies) = config.stealth.proxy_list {
            for proxy in proxies {
                if !proxy.starts_with("http://") && !proxy.starts_with("https://") {
                    return Err(HarvestError::ConfigError(format!(
                        "Invalid proxy '{}', expected 'http(s)://host:port'",
                        proxy
                    ))
                    .into());
                }
            }
        }

        // checking output config
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&config.output.format.as_str()) {
            return Err(HarvestError::ConfigError(format!(
                "Invalid output format '{}', must be one of: {:?}",
                config.output.format, valid_formats
            ))
            .into());
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl FileConfigManager {
    /// Create a default configuration file
    async fn create_default_config(&self) -> Result<()> {
        let default_config = Config::default();
        let toml_content = toml::to_string_pretty(&default_config).map_err(|e| {
            HarvestError::ConfigError(format!("Failed to serialize default config: {}", e))
        })?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HarvestError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(&self.config_path, toml_content).map_err(|e| {
            HarvestError::ConfigError(format!("Failed to write default config: {}", e))
        })?;

        info!(
            "Default configuration file created at {:?}",
            self.config_path
        );
        Ok(())
    }
}
