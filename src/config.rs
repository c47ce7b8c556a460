//! Configuration management for the Scatter mint SDK
//!
//! [`EnvironmentConfig`] holds the raw, optional values merged from config
//! files and `SCATTER_*` environment variables. [`StorefrontConfig`] is the
//! resolved form with every default applied, ready to build clients from.

pub mod env;

pub use env::{
    ApiEnvConfig, EnvironmentConfig, LoggingEnvConfig, MintEnvConfig, NetworkEnvConfig,
    WalletEnvConfig,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;
use crate::protocols::evm::contracts::WalletMintedSource;
use crate::protocols::scatter::DEFAULT_SCATTER_API_URL;

pub const DEFAULT_API_URL: &str = DEFAULT_SCATTER_API_URL;
/// Collection served when none is configured
pub const DEFAULT_COLLECTION_SLUG: &str = "tribe-of-girl";
/// Base mainnet
pub const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";
pub const DEFAULT_CHAIN_ID: u64 = 8453;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Resolved storefront configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub api_base_url: String,
    pub collection_slug: String,
    pub request_timeout: Duration,
    pub rpc_url: String,
    pub chain_id: u64,
    pub wallet_minted_source: WalletMintedSource,
    pub default_quantity: u32,
    pub confirmation_timeout: Duration,
    pub account_index: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            collection_slug: DEFAULT_COLLECTION_SLUG.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            wallet_minted_source: WalletMintedSource::Auto,
            default_quantity: 1,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            account_index: 0,
        }
    }
}

impl StorefrontConfig {
    /// Load from files and environment, then apply defaults
    pub fn load() -> Result<Self, Error> {
        let env_config = EnvironmentConfig::load()?;
        Self::from_env_config(&env_config)
    }

    /// Resolve a validated [`EnvironmentConfig`]
    pub fn from_env_config(env_config: &EnvironmentConfig) -> Result<Self, Error> {
        env_config.validate()?;
        let defaults = Self::default();

        let wallet_minted_source = match env_config.mint.wallet_minted_source {
            Some(ref source) => source.parse()?,
            None => defaults.wallet_minted_source,
        };

        Ok(Self {
            api_base_url: env_config
                .api
                .base_url
                .clone()
                .unwrap_or(defaults.api_base_url),
            collection_slug: env_config
                .api
                .collection_slug
                .clone()
                .unwrap_or(defaults.collection_slug),
            request_timeout: env_config
                .api
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            rpc_url: env_config
                .network
                .rpc_url
                .clone()
                .unwrap_or(defaults.rpc_url),
            chain_id: env_config.network.chain_id.unwrap_or(defaults.chain_id),
            wallet_minted_source,
            default_quantity: env_config
                .mint
                .default_quantity
                .unwrap_or(defaults.default_quantity),
            confirmation_timeout: env_config
                .mint
                .confirmation_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.confirmation_timeout),
            account_index: env_config
                .wallet
                .account_index
                .unwrap_or(defaults.account_index),
        })
    }

    /// Get the default user configuration file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("scatter-mint");
        path.push("scatter.toml");
        path
    }
}
