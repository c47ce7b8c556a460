/// Scatter storefront client
///
/// The main entry point of the SDK. A [`StorefrontClient`] is the session
/// object a front-end drives: it loads the collection and the invite lists the
/// connected wallet is eligible for, reads on-chain mint counters, evaluates
/// sold-out state and runs mint attempts.
use std::sync::Arc;

use alloy_primitives::Address;
use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::StorefrontConfig;
use crate::error::{Error, MintError};
use crate::mint::{
    evaluate, ListMintStatus, ListView, MintCounts, MintGuard, MintOptions, MintOutcome,
    MintTransactionBuilder, SoldOutReason,
};
use crate::protocols::evm::{ChainReader, EvmChainReader, EvmClient};
use crate::protocols::scatter::{Collection, InviteList, ScatterApi, ScatterClient};
use crate::wallet::WalletSession;

/// One invite list with its counters and evaluated status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub list: InviteList,
    pub counts: MintCounts,
    pub status: ListMintStatus,
}

impl ListEntry {
    pub fn view(&self) -> ListView {
        ListView::new(&self.list, &self.counts, &self.status)
    }
}

/// Collection, eligible lists and counters read together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorefrontSnapshot {
    pub collection: Collection,
    /// Account the lists were fetched for
    pub account: Option<Address>,
    pub lists: Vec<ListEntry>,
}

impl StorefrontSnapshot {
    pub fn list(&self, list_id: &str) -> Option<&ListEntry> {
        self.lists.iter().find(|entry| entry.list.id == list_id)
    }

    pub fn views(&self) -> Vec<ListView> {
        self.lists.iter().map(ListEntry::view).collect()
    }
}

/// Whether a mint may start for a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MintAvailability {
    Available,
    WalletNotConnected,
    SoldOut(SoldOutReason),
    AttemptInProgress,
    UnknownList,
}

impl MintAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, MintAvailability::Available)
    }
}

/// Storefront session over one collection
#[derive(Clone)]
pub struct StorefrontClient {
    api: Arc<dyn ScatterApi>,
    chain: Arc<dyn ChainReader>,
    wallet: Option<Arc<dyn WalletSession>>,
    builder: Option<MintTransactionBuilder>,
    guard: MintGuard,
    collection_slug: String,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("collection_slug", &self.collection_slug)
            .field("wallet_connected", &self.connected_account().is_some())
            .finish()
    }
}

impl StorefrontClient {
    pub fn new(
        api: Arc<dyn ScatterApi>,
        chain: Arc<dyn ChainReader>,
        wallet: Option<Arc<dyn WalletSession>>,
        collection_slug: impl Into<String>,
    ) -> Self {
        let guard = MintGuard::new();
        let builder = wallet.as_ref().map(|wallet| {
            MintTransactionBuilder::new(api.clone(), chain.clone(), wallet.clone())
                .with_guard(guard.clone())
        });

        Self {
            api,
            chain,
            wallet,
            builder,
            guard,
            collection_slug: collection_slug.into(),
        }
    }

    pub fn builder() -> StorefrontClientBuilder {
        StorefrontClientBuilder::new()
    }

    pub fn collection_slug(&self) -> &str {
        &self.collection_slug
    }

    pub fn wallet(&self) -> Option<&Arc<dyn WalletSession>> {
        self.wallet.as_ref()
    }

    /// In-flight guard shared with the mint builder
    pub fn guard(&self) -> &MintGuard {
        &self.guard
    }

    /// Account of the attached wallet, if one is attached and connected
    pub fn connected_account(&self) -> Option<Address> {
        self.wallet.as_ref().and_then(|wallet| wallet.state().account)
    }

    pub async fn collection(&self) -> Result<Collection, Error> {
        self.api.get_collection(&self.collection_slug).await
    }

    /// Lists `minter` may mint from; public lists only without a minter
    pub async fn invite_lists(&self, minter: Option<Address>) -> Result<Vec<InviteList>, Error> {
        self.api
            .get_eligible_invite_lists(&self.collection_slug, minter)
            .await
    }

    /// Read counters for every list concurrently.
    ///
    /// A failed read leaves that counter pending instead of failing the batch.
    /// Without a wallet, or when the contract has no per-wallet counter, only
    /// the list counter applies.
    pub async fn mint_counts(
        &self,
        collection: &Collection,
        lists: &[InviteList],
        wallet: Option<Address>,
    ) -> Vec<MintCounts> {
        join_all(
            lists
                .iter()
                .map(|list| self.list_counts(collection, list, wallet)),
        )
        .await
    }

    async fn list_counts(
        &self,
        collection: &Collection,
        list: &InviteList,
        wallet: Option<Address>,
    ) -> MintCounts {
        let list_read = self.chain.list_minted(collection, list.root);
        let wallet_read = async {
            match wallet {
                Some(wallet) => self.chain.wallet_minted(collection, wallet, list.root).await,
                None => Ok(None),
            }
        };

        let (list_minted, wallet_minted) = futures::join!(list_read, wallet_read);

        let list_minted = list_minted
            .map_err(|e| warn!(list_id = %list.id, error = %e, "Failed to read list supply"))
            .ok();
        match wallet_minted {
            Ok(Some(minted)) => MintCounts::new(list_minted, Some(minted)),
            Ok(None) => MintCounts::without_wallet(list_minted),
            Err(e) => {
                warn!(list_id = %list.id, error = %e, "Failed to read wallet mint count");
                MintCounts::new(list_minted, None)
            }
        }
    }

    /// Fetch collection and lists concurrently, then read and evaluate counters
    pub async fn snapshot(&self, account: Option<Address>) -> Result<StorefrontSnapshot, Error> {
        let (collection, lists) =
            futures::try_join!(self.collection(), self.invite_lists(account))?;
        let counts = self.mint_counts(&collection, &lists, account).await;

        let lists = lists
            .into_iter()
            .zip(counts)
            .map(|(list, counts)| {
                let status = evaluate(&collection, &list, &counts);
                ListEntry {
                    list,
                    counts,
                    status,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            slug = %self.collection_slug,
            lists = lists.len(),
            account = ?account,
            "Storefront snapshot loaded"
        );

        Ok(StorefrontSnapshot {
            collection,
            account,
            lists,
        })
    }

    /// Snapshot for the currently connected account
    pub async fn refresh(&self) -> Result<StorefrontSnapshot, Error> {
        self.snapshot(self.connected_account()).await
    }

    /// Copy that can read snapshots but keeps no reference to the wallet
    fn detached(&self) -> Self {
        Self {
            api: self.api.clone(),
            chain: self.chain.clone(),
            wallet: None,
            builder: None,
            guard: self.guard.clone(),
            collection_slug: self.collection_slug.clone(),
        }
    }

    /// Precondition check a front-end runs before enabling the mint action
    pub fn can_mint(&self, snapshot: &StorefrontSnapshot, list_id: &str) -> MintAvailability {
        if self.connected_account().is_none() {
            return MintAvailability::WalletNotConnected;
        }
        let Some(entry) = snapshot.list(list_id) else {
            return MintAvailability::UnknownList;
        };
        if let Some(reason) = entry.status.sold_out {
            return MintAvailability::SoldOut(reason);
        }
        if self.guard.is_in_flight(list_id) {
            return MintAvailability::AttemptInProgress;
        }
        MintAvailability::Available
    }

    /// Run a mint attempt with the attached wallet
    pub async fn mint(
        &self,
        collection: &Collection,
        list_id: &str,
        options: MintOptions,
    ) -> Result<MintOutcome, MintError> {
        let builder = self.builder.as_ref().ok_or(MintError::WalletNotConnected)?;
        builder.mint(collection, list_id, options).await
    }

    /// Re-run the snapshot every time the wallet's account changes.
    ///
    /// The callback receives the fresh snapshot, or the error that prevented
    /// it. The task ends when the wallet session is dropped; it holds only the
    /// session receiver, never the wallet itself.
    pub fn watch_account<F>(&self, mut callback: F) -> Result<JoinHandle<()>, Error>
    where
        F: FnMut(Result<StorefrontSnapshot, Error>) + Send + 'static,
    {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletNotConnected)?;
        let mut session = wallet.subscribe();
        let client = self.detached();

        Ok(tokio::spawn(async move {
            let mut last_account = session.borrow_and_update().account;
            while session.changed().await.is_ok() {
                let account = session.borrow_and_update().account;
                if account == last_account {
                    continue;
                }
                last_account = account;

                info!(account = ?account, "Wallet account changed, refreshing eligibility");
                callback(client.snapshot(account).await);
            }
            debug!("Wallet session closed, account watch finished");
        }))
    }
}

/// Builder for [`StorefrontClient`] construction
#[derive(Default)]
pub struct StorefrontClientBuilder {
    config: Option<StorefrontConfig>,
    api: Option<Arc<dyn ScatterApi>>,
    chain: Option<Arc<dyn ChainReader>>,
    wallet: Option<Arc<dyn WalletSession>>,
    collection_slug: Option<String>,
}

impl StorefrontClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: StorefrontConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom API implementation instead of the HTTP client
    pub fn with_api(mut self, api: Arc<dyn ScatterApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Use a custom chain reader instead of JSON-RPC
    pub fn with_chain_reader(mut self, chain: Arc<dyn ChainReader>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletSession>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Override the configured collection slug
    pub fn with_collection_slug(mut self, slug: impl Into<String>) -> Self {
        self.collection_slug = Some(slug.into());
        self
    }

    pub async fn build(self) -> Result<StorefrontClient, Error> {
        let config = self.config.unwrap_or_default();

        let api: Arc<dyn ScatterApi> = match self.api {
            Some(api) => api,
            None => Arc::new(ScatterClient::with_base_url(
                &config.api_base_url,
                config.request_timeout,
            )?),
        };

        let chain: Arc<dyn ChainReader> = match self.chain {
            Some(chain) => chain,
            None => {
                let client = EvmClient::new(&config.rpc_url, config.chain_id).await?;
                Arc::new(EvmChainReader::new(client, config.wallet_minted_source))
            }
        };

        let slug = self.collection_slug.unwrap_or(config.collection_slug);
        if slug.trim().is_empty() {
            return Err(Error::Config(
                "Collection slug must not be empty".to_string(),
            ));
        }

        Ok(StorefrontClient::new(api, chain, self.wallet, slug))
    }
}
