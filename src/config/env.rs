use config::{Config as ConfigLoader, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Environment variable prefixes for different configuration sections
const ENV_API_PREFIX: &str = "SCATTER_API";
const ENV_NETWORK_PREFIX: &str = "SCATTER_NETWORK";
const ENV_MINT_PREFIX: &str = "SCATTER_MINT";
const ENV_WALLET_PREFIX: &str = "SCATTER_WALLET";
const ENV_LOG_PREFIX: &str = "SCATTER_LOG";

/// Scatter API configuration loaded from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEnvConfig {
    /// Base URL of the Scatter API
    pub base_url: Option<String>,
    /// Collection slug the storefront serves
    pub collection_slug: Option<String>,
    /// HTTP request timeout (seconds)
    pub request_timeout_secs: Option<u64>,
}

/// Network configuration loaded from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkEnvConfig {
    /// EVM JSON-RPC endpoint URL
    pub rpc_url: Option<String>,
    /// EVM chain ID
    pub chain_id: Option<u64>,
}

/// Mint flow configuration from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintEnvConfig {
    /// Wallet counter source (auto, minted, balance_of)
    pub wallet_minted_source: Option<String>,
    /// Quantity used when the caller does not pick one
    pub default_quantity: Option<u32>,
    /// How long to wait for an approval to be mined (seconds)
    pub confirmation_timeout_secs: Option<u64>,
}

/// Local wallet configuration. The mnemonic itself is never read from files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletEnvConfig {
    /// BIP-44 account index
    pub account_index: Option<u32>,
}

/// Logging configuration from environment/files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingEnvConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: Option<String>,
    /// Log format (compact, pretty)
    pub format: Option<String>,
    /// Enable colored output
    pub enable_colors: Option<bool>,
}

/// Complete environment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub api: ApiEnvConfig,
    pub network: NetworkEnvConfig,
    pub mint: MintEnvConfig,
    pub wallet: WalletEnvConfig,
    pub logging: LoggingEnvConfig,
    /// Configuration file paths that were loaded
    #[serde(skip)]
    pub loaded_files: Vec<String>,
}

impl EnvironmentConfig {
    /// Load configuration from environment variables and files
    pub fn load() -> Result<Self, Error> {
        let mut env_config = Self::default();

        // Environment first; file values only fill what env left unset
        env_config.load_from_env()?;
        env_config.load_from_files()?;

        env_config.validate()?;

        Ok(env_config)
    }

    /// Load configuration from files
    fn load_from_files(&mut self) -> Result<(), Error> {
        let config_dir = env::var("SCATTER_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        // Configuration file names to try (in order of preference)
        let config_files = ["scatter.toml", "scatter.json", "config.toml", "config.json"];

        let mut search_paths = vec![config_dir, "config".to_string(), ".".to_string()];
        if let Some(user_dir) = dirs::config_dir() {
            search_paths.push(user_dir.join("scatter-mint").to_string_lossy().to_string());
        }
        search_paths.dedup();

        for search_path in &search_paths {
            for config_file in &config_files {
                let file_path = Path::new(search_path).join(config_file);
                if file_path.exists() {
                    self.load_config_file(&file_path)?;
                    self.loaded_files
                        .push(file_path.to_string_lossy().to_string());
                }
            }
        }

        Ok(())
    }

    /// Load a specific configuration file
    pub fn load_config_file(&mut self, file_path: &Path) -> Result<(), Error> {
        let file_format = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        let settings = ConfigLoader::builder()
            .add_source(File::from(file_path).format(file_format))
            .build()
            .map_err(|e| Error::Config(format!("Failed to load config file: {}", e)))?;

        if let Ok(api_config) = settings.get::<ApiEnvConfig>("api") {
            self.merge_api_config(api_config);
        }

        if let Ok(network_config) = settings.get::<NetworkEnvConfig>("network") {
            self.merge_network_config(network_config);
        }

        if let Ok(mint_config) = settings.get::<MintEnvConfig>("mint") {
            self.merge_mint_config(mint_config);
        }

        if let Ok(wallet_config) = settings.get::<WalletEnvConfig>("wallet") {
            if self.wallet.account_index.is_none() {
                self.wallet.account_index = wallet_config.account_index;
            }
        }

        if let Ok(logging_config) = settings.get::<LoggingEnvConfig>("logging") {
            self.merge_logging_config(logging_config);
        }

        Ok(())
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) -> Result<(), Error> {
        self.load_api_env();
        self.load_network_env();
        self.load_mint_env();
        self.load_logging_env();

        if let Some(index) = parse_env(&format!("{}_ACCOUNT_INDEX", ENV_WALLET_PREFIX)) {
            self.wallet.account_index = Some(index);
        }

        Ok(())
    }

    fn load_api_env(&mut self) {
        if let Ok(base_url) = env::var(format!("{}_BASE_URL", ENV_API_PREFIX)) {
            self.api.base_url = Some(base_url);
        }

        if let Ok(slug) = env::var(format!("{}_COLLECTION_SLUG", ENV_API_PREFIX)) {
            self.api.collection_slug = Some(slug);
        }

        if let Some(timeout) = parse_env(&format!("{}_REQUEST_TIMEOUT_SECS", ENV_API_PREFIX)) {
            self.api.request_timeout_secs = Some(timeout);
        }
    }

    fn load_network_env(&mut self) {
        if let Ok(rpc_url) = env::var(format!("{}_RPC_URL", ENV_NETWORK_PREFIX)) {
            self.network.rpc_url = Some(rpc_url);
        }

        if let Some(chain_id) = parse_env(&format!("{}_CHAIN_ID", ENV_NETWORK_PREFIX)) {
            self.network.chain_id = Some(chain_id);
        }
    }

    fn load_mint_env(&mut self) {
        if let Ok(source) = env::var(format!("{}_WALLET_MINTED_SOURCE", ENV_MINT_PREFIX)) {
            self.mint.wallet_minted_source = Some(source);
        }

        if let Some(quantity) = parse_env(&format!("{}_DEFAULT_QUANTITY", ENV_MINT_PREFIX)) {
            self.mint.default_quantity = Some(quantity);
        }

        if let Some(timeout) =
            parse_env(&format!("{}_CONFIRMATION_TIMEOUT_SECS", ENV_MINT_PREFIX))
        {
            self.mint.confirmation_timeout_secs = Some(timeout);
        }
    }

    fn load_logging_env(&mut self) {
        if let Ok(level) = env::var(format!("{}_LEVEL", ENV_LOG_PREFIX)) {
            self.logging.level = Some(level);
        }

        if let Ok(format) = env::var(format!("{}_FORMAT", ENV_LOG_PREFIX)) {
            self.logging.format = Some(format);
        }

        if let Some(colors) = parse_env(&format!("{}_ENABLE_COLORS", ENV_LOG_PREFIX)) {
            self.logging.enable_colors = Some(colors);
        }
    }

    /// Merge API configuration (file config is overridden by env)
    fn merge_api_config(&mut self, file_config: ApiEnvConfig) {
        if self.api.base_url.is_none() {
            self.api.base_url = file_config.base_url;
        }
        if self.api.collection_slug.is_none() {
            self.api.collection_slug = file_config.collection_slug;
        }
        if self.api.request_timeout_secs.is_none() {
            self.api.request_timeout_secs = file_config.request_timeout_secs;
        }
    }

    /// Merge network configuration (file config is overridden by env)
    fn merge_network_config(&mut self, file_config: NetworkEnvConfig) {
        if self.network.rpc_url.is_none() {
            self.network.rpc_url = file_config.rpc_url;
        }
        if self.network.chain_id.is_none() {
            self.network.chain_id = file_config.chain_id;
        }
    }

    fn merge_mint_config(&mut self, file_config: MintEnvConfig) {
        if self.mint.wallet_minted_source.is_none() {
            self.mint.wallet_minted_source = file_config.wallet_minted_source;
        }
        if self.mint.default_quantity.is_none() {
            self.mint.default_quantity = file_config.default_quantity;
        }
        if self.mint.confirmation_timeout_secs.is_none() {
            self.mint.confirmation_timeout_secs = file_config.confirmation_timeout_secs;
        }
    }

    fn merge_logging_config(&mut self, file_config: LoggingEnvConfig) {
        if self.logging.level.is_none() {
            self.logging.level = file_config.level;
        }
        if self.logging.format.is_none() {
            self.logging.format = file_config.format;
        }
        if self.logging.enable_colors.is_none() {
            self.logging.enable_colors = file_config.enable_colors;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(ref base_url) = self.api.base_url {
            validate_http_url("API base URL", base_url)?;
        }

        if let Some(ref slug) = self.api.collection_slug {
            if slug.trim().is_empty() {
                return Err(Error::Config(
                    "Collection slug must not be empty".to_string(),
                ));
            }
        }

        if self.api.request_timeout_secs == Some(0) {
            return Err(Error::Config(
                "API request timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(ref rpc_url) = self.network.rpc_url {
            validate_http_url("RPC URL", rpc_url)?;
        }

        if self.network.chain_id == Some(0) {
            return Err(Error::Config("Chain ID must be greater than 0".to_string()));
        }

        if let Some(ref source) = self.mint.wallet_minted_source {
            source
                .parse::<crate::protocols::evm::contracts::WalletMintedSource>()
                .map(|_| ())?;
        }

        if self.mint.default_quantity == Some(0) {
            return Err(Error::Config(
                "Default mint quantity must be at least 1".to_string(),
            ));
        }

        if self.mint.confirmation_timeout_secs == Some(0) {
            return Err(Error::Config(
                "Confirmation timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(ref level) = self.logging.level {
            let valid_levels = ["error", "warn", "info", "debug", "trace"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(Error::Config(format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    level, valid_levels
                )));
            }
        }

        if let Some(ref format) = self.logging.format {
            let valid_formats = ["compact", "pretty"];
            if !valid_formats.contains(&format.as_str()) {
                return Err(Error::Config(format!(
                    "Invalid log format '{}'. Must be one of: {:?}",
                    format, valid_formats
                )));
            }
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config() -> Self {
        let mut config = Self::default();

        config.api.base_url = Some(super::DEFAULT_API_URL.to_string());
        config.api.collection_slug = Some(super::DEFAULT_COLLECTION_SLUG.to_string());
        config.api.request_timeout_secs = Some(30);

        config.network.rpc_url = Some(super::DEFAULT_RPC_URL.to_string());
        config.network.chain_id = Some(super::DEFAULT_CHAIN_ID);

        config.mint.wallet_minted_source = Some("auto".to_string());
        config.mint.default_quantity = Some(1);
        config.mint.confirmation_timeout_secs = Some(120);

        config.wallet.account_index = Some(0);

        config.logging.level = Some("info".to_string());
        config.logging.format = Some("compact".to_string());
        config.logging.enable_colors = Some(true);

        config
    }

    /// Save configuration to file
    pub fn save_to_file(&self, file_path: &Path) -> Result<(), Error> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(file_path, content)?;
        Ok(())
    }
}

/// Parse an env var, ignoring unset or unparsable values
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

fn validate_http_url(label: &str, value: &str) -> Result<(), Error> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", label, value, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::Config(format!(
            "{} must start with http:// or https://",
            label
        )));
    }
    Ok(())
}
