/// Wallet session abstraction
///
/// Mint flows never talk to a signer directly. They go through a
/// [`WalletSession`], which exposes the connected account, lets the caller
/// switch chains, and submits transactions. Connection changes are published
/// on a watch channel so in-flight mints can observe a disconnect.
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Error;
use crate::protocols::evm::EvmTransactionRequest;

pub mod local;
pub use local::LocalWallet;

/// Connection state of a wallet session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Connected account, `None` when disconnected
    pub account: Option<Address>,
    /// Chain the wallet is currently pointed at
    pub chain_id: u64,
}

impl SessionState {
    pub fn connected(account: Address, chain_id: u64) -> Self {
        Self {
            account: Some(account),
            chain_id,
        }
    }

    pub fn disconnected(chain_id: u64) -> Self {
        Self {
            account: None,
            chain_id,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Current connection state
    fn state(&self) -> SessionState;

    /// Receiver that observes every account or chain change
    fn subscribe(&self) -> watch::Receiver<SessionState>;

    /// Point the wallet at `chain_id`
    async fn switch_chain(&self, chain_id: u64) -> Result<(), Error>;

    /// Sign and submit a transaction, returning its hash.
    ///
    /// A user declining the request must surface as [`Error::UserRejected`].
    async fn send_transaction(&self, request: EvmTransactionRequest) -> Result<B256, Error>;

    /// Wait until the transaction is mined successfully
    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<(), Error>;
}
