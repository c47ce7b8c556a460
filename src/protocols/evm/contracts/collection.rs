/// Scatter collection contract helpers
///
/// Read-only access to the per-list and per-wallet mint counters of a Scatter
/// collection. Deployed collections disagree on how the per-wallet count is
/// exposed, so the wallet counter function is selected by [`WalletMintedSource`].
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::protocols::evm::client::EvmClient;
use crate::protocols::scatter::Collection;

sol! {
    #[derive(Debug)]
    interface IScatterCollection {
        /// Number of tokens minted through the list identified by `root`
        function listSupply(bytes32 root) external view returns (uint256);

        /// Number of tokens `wallet` minted through the list identified by `root`
        function minted(address wallet, bytes32 root) external view returns (uint256);

        /// Number of tokens held by `owner`
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// Which contract function reports the per-wallet mint count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletMintedSource {
    /// Pick from the collection ABI: `minted(address,bytes32)`, then `balanceOf(address)`
    #[default]
    Auto,
    /// `minted(address wallet, bytes32 root)`, counts per list
    Minted,
    /// `balanceOf(address owner)`, counts across all lists
    BalanceOf,
}

/// A wallet counter source after `Auto` has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedWalletSource {
    Minted,
    BalanceOf,
    /// The contract exposes neither function
    Unavailable,
}

impl WalletMintedSource {
    /// Resolve against a collection's ABI
    pub fn resolve(&self, collection: &Collection) -> ResolvedWalletSource {
        match self {
            WalletMintedSource::Minted => ResolvedWalletSource::Minted,
            WalletMintedSource::BalanceOf => ResolvedWalletSource::BalanceOf,
            WalletMintedSource::Auto => {
                if collection.has_function("minted", 2) {
                    ResolvedWalletSource::Minted
                } else if collection.has_function("balanceOf", 1) {
                    ResolvedWalletSource::BalanceOf
                } else {
                    ResolvedWalletSource::Unavailable
                }
            }
        }
    }
}

impl fmt::Display for WalletMintedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletMintedSource::Auto => "auto",
            WalletMintedSource::Minted => "minted",
            WalletMintedSource::BalanceOf => "balance_of",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for WalletMintedSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(WalletMintedSource::Auto),
            "minted" => Ok(WalletMintedSource::Minted),
            "balance_of" | "balanceof" => Ok(WalletMintedSource::BalanceOf),
            other => Err(Error::Config(format!(
                "Invalid wallet minted source '{}'. Must be one of: auto, minted, balance_of",
                other
            ))),
        }
    }
}

/// Collection contract helper
#[derive(Debug, Clone)]
pub struct CollectionContract {
    client: EvmClient,
    address: Address,
}

impl CollectionContract {
    /// Create a new collection helper for the given contract address
    pub fn new(client: EvmClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Get contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Minted count for a whole list
    pub async fn list_supply(&self, root: B256) -> Result<U256, Error> {
        let call = IScatterCollection::listSupplyCall { root };
        let result = self.client.call_contract(self.address, call).await?;
        Ok(result._0)
    }

    /// Minted count for a wallet on a list
    pub async fn minted(&self, wallet: Address, root: B256) -> Result<U256, Error> {
        let call = IScatterCollection::mintedCall { wallet, root };
        let result = self.client.call_contract(self.address, call).await?;
        Ok(result._0)
    }

    /// Token balance of a wallet
    pub async fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        let call = IScatterCollection::balanceOfCall { owner };
        let result = self.client.call_contract(self.address, call).await?;
        Ok(result._0)
    }

    /// Per-wallet count through the resolved source; `None` when unavailable
    pub async fn wallet_minted(
        &self,
        source: ResolvedWalletSource,
        wallet: Address,
        root: B256,
    ) -> Result<Option<U256>, Error> {
        match source {
            ResolvedWalletSource::Minted => self.minted(wallet, root).await.map(Some),
            ResolvedWalletSource::BalanceOf => self.balance_of(wallet).await.map(Some),
            ResolvedWalletSource::Unavailable => Ok(None),
        }
    }
}
