/// Mint transaction flow
///
/// Drives one mint attempt from template request to submitted transaction:
///
/// 1. Ask the Scatter API for a transaction template
/// 2. Read each required ERC-20 allowance, in the order the API listed them
/// 3. Approve `U256::MAX` where the allowance is short and wait for it to mine
/// 4. Submit the native mint transaction
///
/// Steps run strictly in order and nothing is retried. Every wallet await is
/// raced against the session's account channel, so a disconnect fails the
/// step instead of leaving it hanging.
use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::guard::MintGuard;
use crate::error::{Error, MintError};
use crate::protocols::evm::contracts::encode_approve;
use crate::protocols::evm::{ChainReader, EvmTransactionRequest};
use crate::protocols::scatter::{Collection, MintRequest, MintTransactionTemplate, ScatterApi};
use crate::wallet::WalletSession;

/// Progress of a mint attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintStage {
    RequestingTemplate,
    CheckingAllowances,
    ApprovingAllowance { token: Address },
    SubmittingMint,
    Completed { tx_hash: B256 },
    Failed(MintError),
}

/// Caller-tunable parts of an attempt
#[derive(Debug, Clone)]
pub struct MintOptions {
    /// Tokens to mint from the list, at least 1
    pub quantity: u32,
    /// Receives every stage transition when set
    pub progress: Option<mpsc::UnboundedSender<MintStage>>,
}

impl Default for MintOptions {
    fn default() -> Self {
        Self {
            quantity: 1,
            progress: None,
        }
    }
}

impl MintOptions {
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<MintStage>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn emit(&self, stage: MintStage) {
        if let Some(ref progress) = self.progress {
            // A dropped receiver only means nobody is watching
            let _ = progress.send(stage);
        }
    }
}

/// An approval sent during an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalRecord {
    pub token: Address,
    pub tx_hash: B256,
}

/// Result of a successful attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintOutcome {
    pub tx_hash: B256,
    pub approvals: Vec<ApprovalRecord>,
    pub template: MintTransactionTemplate,
}

#[derive(Clone)]
pub struct MintTransactionBuilder {
    api: Arc<dyn ScatterApi>,
    chain: Arc<dyn ChainReader>,
    wallet: Arc<dyn WalletSession>,
    guard: MintGuard,
}

impl std::fmt::Debug for MintTransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintTransactionBuilder")
            .field("guard", &self.guard)
            .finish()
    }
}

impl MintTransactionBuilder {
    pub fn new(
        api: Arc<dyn ScatterApi>,
        chain: Arc<dyn ChainReader>,
        wallet: Arc<dyn WalletSession>,
    ) -> Self {
        Self {
            api,
            chain,
            wallet,
            guard: MintGuard::new(),
        }
    }

    /// Share an existing guard, e.g. across builders serving one front-end
    pub fn with_guard(mut self, guard: MintGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &MintGuard {
        &self.guard
    }

    /// Run one mint attempt for `list_id`
    pub async fn mint(
        &self,
        collection: &Collection,
        list_id: &str,
        options: MintOptions,
    ) -> Result<MintOutcome, MintError> {
        let result = self.run(collection, list_id, &options).await;
        match result {
            Ok(ref outcome) => options.emit(MintStage::Completed {
                tx_hash: outcome.tx_hash,
            }),
            Err(ref err) => {
                warn!(list_id, error = %err, "Mint attempt failed");
                options.emit(MintStage::Failed(err.clone()));
            }
        }
        result
    }

    async fn run(
        &self,
        collection: &Collection,
        list_id: &str,
        options: &MintOptions,
    ) -> Result<MintOutcome, MintError> {
        if options.quantity == 0 {
            return Err(MintError::InvalidOptions(
                "quantity must be at least 1".to_string(),
            ));
        }

        let state = self.wallet.state();
        let minter = state.account.ok_or(MintError::WalletNotConnected)?;
        let _permit = self.guard.try_acquire(list_id)?;

        info!(
            list_id,
            %minter,
            collection = %collection.address,
            quantity = options.quantity,
            "Starting mint attempt"
        );

        if state.chain_id != collection.chain_id {
            debug!(from = state.chain_id, to = collection.chain_id, "Switching wallet chain");
            self.with_disconnect(minter, self.wallet.switch_chain(collection.chain_id))
                .await
                .map_err(|e| MintError::ChainSwitchFailed {
                    chain_id: collection.chain_id,
                    reason: e.to_string(),
                })?;
        }

        options.emit(MintStage::RequestingTemplate);
        let request = MintRequest::single(collection, minter, list_id, options.quantity);
        let template = self.api.request_mint_transaction(&request).await?;

        options.emit(MintStage::CheckingAllowances);
        let mut approvals = Vec::new();
        for requirement in &template.erc20s {
            let token = requirement.address;
            let allowance = self
                .chain
                .allowance(token, minter, collection.address)
                .await
                .map_err(|e| MintError::AllowanceReadFailed {
                    token,
                    reason: e.to_string(),
                })?;

            if allowance >= requirement.amount {
                debug!(%token, %allowance, required = %requirement.amount, "Allowance sufficient");
                continue;
            }

            options.emit(MintStage::ApprovingAllowance { token });
            let tx_hash = self.approve(collection, minter, token).await?;
            approvals.push(ApprovalRecord { token, tx_hash });
        }

        options.emit(MintStage::SubmittingMint);
        let mint_request = EvmTransactionRequest::new(collection.chain_id)
            .from(minter)
            .to(collection.address)
            .value(template.mint_transaction.value)
            .data(template.mint_transaction.data.clone());

        let tx_hash = self
            .with_disconnect(minter, self.wallet.send_transaction(mint_request))
            .await
            .map_err(|e| match e {
                Error::UserRejected(reason) => MintError::MintRejected(reason),
                other => MintError::MintFailed(other.to_string()),
            })?;

        info!(%tx_hash, list_id, approvals = approvals.len(), "Mint transaction submitted");

        Ok(MintOutcome {
            tx_hash,
            approvals,
            template,
        })
    }

    /// Approve the collection for the maximum amount and wait for the receipt
    async fn approve(
        &self,
        collection: &Collection,
        minter: Address,
        token: Address,
    ) -> Result<B256, MintError> {
        let request = EvmTransactionRequest::new(collection.chain_id)
            .from(minter)
            .to(token)
            .data(encode_approve(collection.address, U256::MAX));

        let tx_hash = self
            .with_disconnect(minter, self.wallet.send_transaction(request))
            .await
            .map_err(|e| match e {
                Error::UserRejected(reason) => MintError::ApprovalRejected { token, reason },
                other => MintError::ApprovalFailed {
                    token,
                    reason: other.to_string(),
                },
            })?;

        info!(%token, %tx_hash, "Approval submitted, waiting for confirmation");

        self.with_disconnect(minter, self.wallet.wait_for_confirmation(tx_hash))
            .await
            .map_err(|e| MintError::ApprovalFailed {
                token,
                reason: e.to_string(),
            })?;

        Ok(tx_hash)
    }

    /// Resolve `fut` unless the session drops or changes the minter first
    async fn with_disconnect<T, F>(&self, minter: Address, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let mut session = self.wallet.subscribe();
        if session.borrow_and_update().account != Some(minter) {
            return Err(Error::WalletDisconnected);
        }

        tokio::pin!(fut);
        loop {
            tokio::select! {
                result = &mut fut => return result,
                changed = session.changed() => {
                    if changed.is_err() || session.borrow_and_update().account != Some(minter) {
                        warn!(%minter, "Wallet session changed while awaiting the wallet");
                        return Err(Error::WalletDisconnected);
                    }
                }
            }
        }
    }
}
