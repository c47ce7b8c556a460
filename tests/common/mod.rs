//! Test fixtures for storefront and mint flow integration tests
//!
//! In-memory implementations of the Scatter API, the chain reader and the
//! wallet session, so the full flow runs without network access.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use scatter_mint_sdk::protocols::evm::EvmTransactionRequest;
use scatter_mint_sdk::protocols::scatter::{Erc20Requirement, MintTransaction};
use scatter_mint_sdk::{
    ChainReader, Collection, Error, InviteList, MintError, MintLimit, MintRequest,
    MintTransactionTemplate, ScatterApi, SessionState, WalletSession,
};

// Mock addresses for testing
pub const MOCK_COLLECTION: Address = address!("1111111111111111111111111111111111111111");
pub const MOCK_MINTER: Address = address!("2222222222222222222222222222222222222222");
pub const MOCK_USDC: Address = address!("3333333333333333333333333333333333333333");
pub const MOCK_WETH: Address = address!("4444444444444444444444444444444444444444");
pub const MOCK_OTHER_ACCOUNT: Address = address!("5555555555555555555555555555555555555555");

pub const CHAIN_ID: u64 = 8453;

pub fn collection(num_items: u64, max_items: u64) -> Collection {
    Collection {
        address: MOCK_COLLECTION,
        chain_id: CHAIN_ID,
        abi: JsonAbi::default(),
        max_items,
        num_items,
    }
}

pub fn invite_list(id: &str, root_byte: u8, list_limit: u32, wallet_limit: u32) -> InviteList {
    InviteList {
        id: id.to_string(),
        name: format!("List {}", id),
        root: B256::repeat_byte(root_byte),
        currency_address: None,
        currency_symbol: "ETH".to_string(),
        token_price: "0".to_string(),
        wallet_limit: MintLimit::from_raw(wallet_limit),
        list_limit: MintLimit::from_raw(list_limit),
    }
}

pub fn public_list(id: &str, root_byte: u8) -> InviteList {
    invite_list(id, root_byte, u32::MAX, u32::MAX)
}

pub fn template(erc20s: &[(Address, u64)], value: u64) -> MintTransactionTemplate {
    MintTransactionTemplate {
        erc20s: erc20s
            .iter()
            .map(|(address, amount)| Erc20Requirement {
                address: *address,
                amount: U256::from(*amount),
            })
            .collect(),
        mint_transaction: MintTransaction {
            value: U256::from(value),
            data: Bytes::from(vec![0xa0, 0x71, 0x2d, 0x68]),
        },
    }
}

/// Scatter API backed by fixed responses
pub struct FakeApi {
    pub collection: Mutex<Collection>,
    /// Lists returned without a minter
    pub public_lists: Vec<InviteList>,
    /// Extra lists returned per minter
    pub minter_lists: HashMap<Address, Vec<InviteList>>,
    pub template: Mutex<Result<MintTransactionTemplate, MintError>>,
    pub mint_requests: Mutex<Vec<MintRequest>>,
    pub eligibility_queries: Mutex<Vec<Option<Address>>>,
    /// Notified when a template request arrives
    pub template_requested: Notify,
    /// When set, template requests wait for a notification
    pub template_gate: Option<Arc<Notify>>,
}

impl FakeApi {
    pub fn new(collection: Collection, public_lists: Vec<InviteList>) -> Self {
        Self {
            collection: Mutex::new(collection),
            public_lists,
            minter_lists: HashMap::new(),
            template: Mutex::new(Ok(template(&[], 0))),
            mint_requests: Mutex::new(Vec::new()),
            eligibility_queries: Mutex::new(Vec::new()),
            template_requested: Notify::new(),
            template_gate: None,
        }
    }

    pub fn with_minter_lists(mut self, minter: Address, lists: Vec<InviteList>) -> Self {
        self.minter_lists.insert(minter, lists);
        self
    }

    pub fn with_template(self, template: Result<MintTransactionTemplate, MintError>) -> Self {
        *self.template.lock().unwrap() = template;
        self
    }

    pub fn with_template_gate(mut self, gate: Arc<Notify>) -> Self {
        self.template_gate = Some(gate);
        self
    }

    pub fn mint_request_count(&self) -> usize {
        self.mint_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ScatterApi for FakeApi {
    async fn get_collection(&self, _slug: &str) -> Result<Collection, Error> {
        Ok(self.collection.lock().unwrap().clone())
    }

    async fn get_eligible_invite_lists(
        &self,
        _slug: &str,
        minter: Option<Address>,
    ) -> Result<Vec<InviteList>, Error> {
        self.eligibility_queries.lock().unwrap().push(minter);
        let mut lists = self.public_lists.clone();
        if let Some(extra) = minter.and_then(|m| self.minter_lists.get(&m)) {
            lists.extend(extra.iter().cloned());
        }
        Ok(lists)
    }

    async fn request_mint_transaction(
        &self,
        request: &MintRequest,
    ) -> Result<MintTransactionTemplate, MintError> {
        self.mint_requests.lock().unwrap().push(request.clone());
        self.template_requested.notify_one();
        if let Some(ref gate) = self.template_gate {
            gate.notified().await;
        }
        self.template.lock().unwrap().clone()
    }
}

/// Chain reader with in-memory counters and allowances
#[derive(Default)]
pub struct FakeChain {
    pub list_minted: HashMap<B256, U256>,
    pub wallet_minted: HashMap<(Address, B256), U256>,
    pub allowances: HashMap<Address, U256>,
    pub failing_tokens: Vec<Address>,
    pub fail_counts: bool,
    /// The contract exposes no per-wallet counter
    pub untracked_wallets: bool,
    pub allowance_reads: Mutex<Vec<Address>>,
    pub count_reads: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_minted(mut self, root: B256, minted: u64) -> Self {
        self.list_minted.insert(root, U256::from(minted));
        self
    }

    pub fn with_wallet_minted(mut self, wallet: Address, root: B256, minted: u64) -> Self {
        self.wallet_minted.insert((wallet, root), U256::from(minted));
        self
    }

    pub fn with_allowance(mut self, token: Address, amount: U256) -> Self {
        self.allowances.insert(token, amount);
        self
    }

    pub fn with_failing_token(mut self, token: Address) -> Self {
        self.failing_tokens.push(token);
        self
    }

    pub fn with_failing_counts(mut self) -> Self {
        self.fail_counts = true;
        self
    }

    pub fn with_untracked_wallets(mut self) -> Self {
        self.untracked_wallets = true;
        self
    }

    pub fn allowance_reads(&self) -> Vec<Address> {
        self.allowance_reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn list_minted(&self, _collection: &Collection, root: B256) -> Result<U256, Error> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_counts {
            return Err(Error::Rpc("node unavailable".to_string()));
        }
        Ok(self.list_minted.get(&root).copied().unwrap_or_default())
    }

    async fn wallet_minted(
        &self,
        _collection: &Collection,
        wallet: Address,
        root: B256,
    ) -> Result<Option<U256>, Error> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_counts {
            return Err(Error::Rpc("node unavailable".to_string()));
        }
        if self.untracked_wallets {
            return Ok(None);
        }
        Ok(Some(
            self.wallet_minted
                .get(&(wallet, root))
                .copied()
                .unwrap_or_default(),
        ))
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, Error> {
        self.allowance_reads.lock().unwrap().push(token);
        if self.failing_tokens.contains(&token) {
            return Err(Error::Rpc("execution reverted".to_string()));
        }
        Ok(self.allowances.get(&token).copied().unwrap_or_default())
    }
}

/// How the fake wallet answers a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletResponse {
    #[default]
    Accept,
    Reject,
    Fail,
}

/// Wallet session that records every request
pub struct FakeWallet {
    state: watch::Sender<SessionState>,
    pub approval_response: WalletResponse,
    pub mint_response: WalletResponse,
    pub switch_fails: bool,
    /// Confirmations never arrive
    pub hang_confirmations: bool,
    pub sent: Mutex<Vec<EvmTransactionRequest>>,
    pub confirmations: Mutex<Vec<B256>>,
    pub switches: Mutex<Vec<u64>>,
    /// Notified after each submitted transaction
    pub sent_notify: Notify,
}

impl FakeWallet {
    pub fn connected(account: Address, chain_id: u64) -> Self {
        let (state, _) = watch::channel(SessionState::connected(account, chain_id));
        Self {
            state,
            approval_response: WalletResponse::Accept,
            mint_response: WalletResponse::Accept,
            switch_fails: false,
            hang_confirmations: false,
            sent: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
            switches: Mutex::new(Vec::new()),
            sent_notify: Notify::new(),
        }
    }

    pub fn disconnected(chain_id: u64) -> Self {
        let wallet = Self::connected(Address::ZERO, chain_id);
        wallet.state.send_modify(|state| state.account = None);
        wallet
    }

    pub fn with_approval_response(mut self, response: WalletResponse) -> Self {
        self.approval_response = response;
        self
    }

    pub fn with_mint_response(mut self, response: WalletResponse) -> Self {
        self.mint_response = response;
        self
    }

    pub fn with_failing_switch(mut self) -> Self {
        self.switch_fails = true;
        self
    }

    pub fn with_hanging_confirmations(mut self) -> Self {
        self.hang_confirmations = true;
        self
    }

    pub fn set_account(&self, account: Option<Address>) {
        self.state.send_modify(|state| state.account = account);
    }

    pub fn disconnect(&self) {
        self.set_account(None);
    }

    pub fn sent(&self) -> Vec<EvmTransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn switches(&self) -> Vec<u64> {
        self.switches.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSession for FakeWallet {
    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), Error> {
        self.switches.lock().unwrap().push(chain_id);
        if self.switch_fails {
            return Err(Error::UserRejected("chain switch declined".to_string()));
        }
        self.state.send_modify(|state| state.chain_id = chain_id);
        Ok(())
    }

    async fn send_transaction(&self, request: EvmTransactionRequest) -> Result<B256, Error> {
        let is_mint = request.to == Some(MOCK_COLLECTION);
        let response = if is_mint {
            self.mint_response
        } else {
            self.approval_response
        };

        match response {
            WalletResponse::Reject => {
                return Err(Error::UserRejected("User denied transaction signature".to_string()))
            }
            WalletResponse::Fail => return Err(Error::Rpc("insufficient funds".to_string())),
            WalletResponse::Accept => {}
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(request);
        let tx_hash = B256::with_last_byte(sent.len() as u8);
        drop(sent);

        self.sent_notify.notify_one();
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<(), Error> {
        if self.hang_confirmations {
            futures::future::pending::<()>().await;
        }
        self.confirmations.lock().unwrap().push(tx_hash);
        Ok(())
    }
}
