// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, Signature, B256, U256};
use async_trait::async_trait;
use bip32::{DerivationPath, Seed, XPrv};
use bip39::Mnemonic;
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use tiny_keccak::{Hasher, Keccak};
use tokio::sync::watch;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::protocols::evm::tx::{Eip1559Transaction, SignedEip1559Transaction};
use crate::protocols::evm::{EvmClient, EvmError, EvmTransactionRequest};
use crate::wallet::{SessionState, WalletSession};

/// HD Path for Ethereum chains (BIP-44)
const ETHEREUM_HD_PATH: &str = "m/44'/60'/0'/0/";

/// Gas buffer applied on top of estimates
const GAS_BUFFER_PERCENT: u64 = 20;

const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// secp256k1 key derived from a BIP-39 mnemonic
pub struct LocalSigner {
    signing_key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish()
    }
}

impl LocalSigner {
    /// Derive the key at `m/44'/60'/0'/0/{account_index}`
    pub fn from_mnemonic(mnemonic: &str, account_index: u32) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_str(mnemonic.trim())
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        let seed = Zeroizing::new(mnemonic.to_seed(""));
        let seed = Seed::new(*seed);

        let path = format!("{}{}", ETHEREUM_HD_PATH, account_index);
        let path = DerivationPath::from_str(&path)
            .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?;

        let derived_key = XPrv::derive_from_path(seed.as_bytes(), &path)
            .map_err(|e| Error::Wallet(format!("Key derivation error: {}", e)))?;

        let key_bytes = Zeroizing::new(derived_key.to_bytes());
        let signing_key = SigningKey::from_slice(key_bytes.as_slice())
            .map_err(|e| Error::Wallet(format!("Failed to create signing key: {}", e)))?;
        let address = Self::derive_address(&signing_key)?;

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Address of the derived key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Keccak-256 of the uncompressed public key without its 0x04 prefix, last 20 bytes
    fn derive_address(signing_key: &SigningKey) -> Result<Address, Error> {
        let point = signing_key.verifying_key().to_encoded_point(false);
        let pubkey_bytes = point.as_bytes();

        if pubkey_bytes.len() != 65 || pubkey_bytes[0] != 0x04 {
            return Err(Error::Wallet(
                "Invalid public key format for Ethereum address derivation".to_string(),
            ));
        }

        let mut hasher = Keccak::v256();
        hasher.update(&pubkey_bytes[1..]);
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        Ok(Address::from_slice(&hash[12..]))
    }

    /// Sign an EIP-1559 transaction and return the full signed payload
    pub fn sign_eip1559(&self, tx: &Eip1559Transaction) -> Result<SignedEip1559Transaction, Error> {
        let mut digest = Keccak256::new();
        digest.update(tx.encoded_for_signing());

        let (sig, recid) = self
            .signing_key
            .sign_digest_recoverable(digest)
            .map_err(|e| Error::Wallet(format!("Failed to sign digest: {}", e)))?;

        let signature = Signature::from((sig, recid));
        let raw = tx.encode_signed(&signature);
        let signed = tx.clone().into_signed(signature);
        Ok(SignedEip1559Transaction::new(signed, raw))
    }
}

/// Headless wallet session that signs with a local mnemonic key.
///
/// The session is bound to the chain of its RPC client; switching to any
/// other chain fails. `disconnect` and `connect` toggle the published
/// account so callers can exercise the same paths a browser wallet would.
#[derive(Debug)]
pub struct LocalWallet {
    signer: LocalSigner,
    client: EvmClient,
    state: watch::Sender<SessionState>,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl LocalWallet {
    pub fn new(signer: LocalSigner, client: EvmClient) -> Self {
        let (state, _) = watch::channel(SessionState::connected(
            signer.address(),
            client.chain_id(),
        ));
        Self {
            signer,
            client,
            state,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_mnemonic(
        mnemonic: &str,
        account_index: u32,
        client: EvmClient,
    ) -> Result<Self, Error> {
        Ok(Self::new(
            LocalSigner::from_mnemonic(mnemonic, account_index)?,
            client,
        ))
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Drop the connected account; pending waits observe the change
    pub fn disconnect(&self) {
        info!(address = %self.signer.address(), "Wallet disconnected");
        self.state.send_modify(|state| state.account = None);
    }

    pub fn connect(&self) {
        info!(address = %self.signer.address(), "Wallet connected");
        let account = self.signer.address();
        self.state.send_modify(|state| state.account = Some(account));
    }

    async fn fill_gas_and_fees(
        &self,
        request: EvmTransactionRequest,
    ) -> Result<EvmTransactionRequest, Error> {
        let mut request = request;

        if request.gas_limit.is_none() {
            let estimate = self.client.estimate_gas(&request).await?;
            let gas_limit = estimate * (100 + GAS_BUFFER_PERCENT) / 100;
            debug!(estimate, gas_limit, "Gas estimated");
            request = request.gas_limit(gas_limit);
        }

        if request.max_fee_per_gas.is_none() {
            let (base_fee, priority_fee) = self.client.get_fee_data().await?;
            let max_fee = base_fee * U256::from(2) + priority_fee;
            request = request.eip1559_fees(max_fee, priority_fee);
        }

        Ok(request)
    }

    async fn poll_receipt(&self, tx_hash: B256) -> Result<(), Error> {
        loop {
            match self.client.get_transaction_status(tx_hash).await? {
                Some(true) => {
                    debug!(%tx_hash, "Transaction confirmed");
                    return Ok(());
                }
                Some(false) => {
                    return Err(EvmError::TransactionReverted(tx_hash.to_string()).into())
                }
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl WalletSession for LocalWallet {
    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), Error> {
        if chain_id != self.client.chain_id() {
            return Err(Error::Wallet(format!(
                "Local wallet is bound to chain {} and cannot switch to {}",
                self.client.chain_id(),
                chain_id
            )));
        }
        self.state.send_if_modified(|state| {
            let changed = state.chain_id != chain_id;
            state.chain_id = chain_id;
            changed
        });
        Ok(())
    }

    async fn send_transaction(&self, request: EvmTransactionRequest) -> Result<B256, Error> {
        let from = self.state().account.ok_or(Error::WalletNotConnected)?;
        if request.chain_id != self.client.chain_id() {
            return Err(Error::Wallet(format!(
                "Transaction targets chain {} but wallet is on chain {}",
                request.chain_id,
                self.client.chain_id()
            )));
        }

        let request = self.fill_gas_and_fees(request.from(from)).await?;
        let nonce = self.client.get_transaction_count(from).await?;

        let tx = Eip1559Transaction::from_request(&request, nonce);
        let signed = self.signer.sign_eip1559(&tx)?;
        let tx_hash = self.client.send_raw_transaction(signed.raw()).await?;

        info!(%tx_hash, %from, nonce, "Transaction submitted");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<(), Error> {
        match tokio::time::timeout(self.confirmation_timeout, self.poll_receipt(tx_hash)).await {
            Ok(result) => result,
            Err(_) => Err(EvmError::ConfirmationTimeout(tx_hash.to_string()).into()),
        }
    }
}
