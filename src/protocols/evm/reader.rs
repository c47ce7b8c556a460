/// On-chain reads used by the storefront
///
/// [`ChainReader`] is the seam between mint logic and the node: list and
/// wallet mint counters for eligibility, and ERC-20 allowances for the mint
/// flow. [`EvmChainReader`] implements it over an [`EvmClient`].
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::error::Error;
use crate::protocols::evm::client::EvmClient;
use crate::protocols::evm::contracts::WalletMintedSource;
use crate::protocols::scatter::Collection;

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Tokens minted through the list identified by `root`
    async fn list_minted(&self, collection: &Collection, root: B256) -> Result<U256, Error>;

    /// Tokens minted by `wallet` on the list, `None` if the contract cannot tell
    async fn wallet_minted(
        &self,
        collection: &Collection,
        wallet: Address,
        root: B256,
    ) -> Result<Option<U256>, Error>;

    /// ERC-20 allowance granted by `owner` to `spender`
    async fn allowance(&self, token: Address, owner: Address, spender: Address)
        -> Result<U256, Error>;
}

/// [`ChainReader`] backed by JSON-RPC
#[derive(Debug, Clone)]
pub struct EvmChainReader {
    client: EvmClient,
    wallet_source: WalletMintedSource,
}

impl EvmChainReader {
    pub fn new(client: EvmClient, wallet_source: WalletMintedSource) -> Self {
        Self {
            client,
            wallet_source,
        }
    }

    pub fn client(&self) -> &EvmClient {
        &self.client
    }

    pub fn wallet_source(&self) -> WalletMintedSource {
        self.wallet_source
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn list_minted(&self, collection: &Collection, root: B256) -> Result<U256, Error> {
        self.client
            .collection(collection.address)
            .list_supply(root)
            .await
    }

    async fn wallet_minted(
        &self,
        collection: &Collection,
        wallet: Address,
        root: B256,
    ) -> Result<Option<U256>, Error> {
        let source = self.wallet_source.resolve(collection);
        debug!(collection = %collection.address, ?source, "Reading wallet mint count");
        self.client
            .collection(collection.address)
            .wallet_minted(source, wallet, root)
            .await
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, Error> {
        self.client.erc20(token).allowance(owner, spender).await
    }
}
