/// EVM Client for the Scatter mint SDK
///
/// Read-only contract calls, gas and fee estimation, raw transaction
/// submission and receipt lookup against an EVM JSON-RPC endpoint.
use crate::error::Error;
use crate::protocols::evm::types::{EvmCallRequest, EvmError, EvmTransactionRequest};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport_http::{Client, Http};
use tracing::debug;

/// EVM Client for blockchain interactions
#[derive(Clone)]
pub struct EvmClient {
    /// Alloy provider for RPC communication
    provider: alloy_provider::RootProvider<Http<Client>>,
    /// Chain ID the endpoint serves
    chain_id: u64,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl EvmClient {
    /// Create a new EVM client with the given RPC endpoint and chain ID
    pub async fn new(rpc_url: &str, chain_id: u64) -> Result<Self, Error> {
        let url = url::Url::parse(rpc_url)
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self { provider, chain_id })
    }

    /// Get the chain ID
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Execute a read-only contract call
    pub async fn call(&self, request: EvmCallRequest) -> Result<Vec<u8>, Error> {
        let tx_request = TransactionRequest {
            to: Some(alloy_primitives::TxKind::Call(request.to)),
            input: Bytes::from(request.data).into(),
            ..Default::default()
        };

        let result = self
            .provider
            .call(&tx_request)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(result.to_vec())
    }

    /// Call a contract method (read-only) and decode its return value
    pub async fn call_contract<T: SolCall>(
        &self,
        contract_address: Address,
        call: T,
    ) -> Result<T::Return, Error> {
        let request = EvmCallRequest::new(contract_address, call.abi_encode());
        let result = self.call(request).await?;
        let decoded = T::abi_decode_returns(&result, false).map_err(|e| {
            EvmError::AbiError(format!("Failed to decode contract call result: {}", e))
        })?;
        Ok(decoded)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, request: &EvmTransactionRequest) -> Result<u64, Error> {
        let tx_request = TransactionRequest {
            from: request.from,
            to: request.to.map(alloy_primitives::TxKind::Call),
            value: Some(request.value),
            input: request.data.clone().into(),
            ..Default::default()
        };

        let gas = self
            .provider
            .estimate_gas(&tx_request)
            .await
            .map_err(|e| EvmError::GasEstimationError(e.to_string()))?;

        let gas: u64 = gas
            .try_into()
            .map_err(|e| EvmError::GasEstimationError(format!("Gas out of range: {}", e)))?;
        Ok(gas)
    }

    /// Get the current gas price (legacy)
    pub async fn get_gas_price(&self) -> Result<U256, Error> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(U256::from(gas_price))
    }

    /// Get EIP-1559 fee data as (base fee, priority fee)
    pub async fn get_fee_data(&self) -> Result<(U256, U256), Error> {
        let fee_history = self
            .provider
            .get_fee_history(1, BlockNumberOrTag::Latest, &[50.0])
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        if let (Some(base_fee), Some(reward)) = (
            fee_history.base_fee_per_gas.last(),
            fee_history
                .reward
                .as_ref()
                .and_then(|r| r.last())
                .and_then(|r| r.first()),
        ) {
            Ok((U256::from(*base_fee), U256::from(*reward)))
        } else {
            // Fallback to gas price
            let gas_price = self.get_gas_price().await?;
            Ok((gas_price, gas_price / U256::from(10)))
        }
    }

    /// Next nonce for an account
    pub async fn get_transaction_count(&self, address: Address) -> Result<u64, Error> {
        let nonce = self
            .provider
            .get_transaction_count(address)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(nonce)
    }

    /// Submit a signed transaction and return its hash
    pub async fn send_raw_transaction(&self, signed_tx: &[u8]) -> Result<B256, Error> {
        let pending = self
            .provider
            .send_raw_transaction(signed_tx)
            .await
            .map_err(|e| EvmError::TransactionError(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "Raw transaction submitted");
        Ok(tx_hash)
    }

    /// Execution status of a mined transaction, `None` while still pending
    pub async fn get_transaction_status(&self, tx_hash: B256) -> Result<Option<bool>, Error> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(receipt.map(|r| r.status()))
    }

    /// Create an ERC-20 helper for the given contract address
    pub fn erc20(&self, address: Address) -> crate::protocols::evm::contracts::Erc20 {
        crate::protocols::evm::contracts::Erc20::new(self.clone(), address)
    }

    /// Create a collection contract helper for the given contract address
    pub fn collection(
        &self,
        address: Address,
    ) -> crate::protocols::evm::contracts::CollectionContract {
        crate::protocols::evm::contracts::CollectionContract::new(self.clone(), address)
    }
}
