use crate::error::Error;
/// EVM-specific types for the Scatter mint SDK
///
/// Request types for read-only calls and state-changing transactions, and the
/// EVM error kinds surfaced by the client.
use alloy_primitives::{Address, Bytes, U256};

/// EVM request for read-only calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmCallRequest {
    /// Target contract address
    pub to: Address,
    /// Call data (encoded function call)
    pub data: Vec<u8>,
    /// Block number or tag (latest, pending, etc.)
    pub block: Option<String>,
}

impl EvmCallRequest {
    /// Create a new call request
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data,
            block: None,
        }
    }

    /// Set the block parameter
    pub fn at_block(mut self, block: String) -> Self {
        self.block = Some(block);
        self
    }
}

/// EVM transaction request for state-changing operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransactionRequest {
    /// Sender; wallets fill this in when absent
    pub from: Option<Address>,
    /// Target address (contract or EOA)
    pub to: Option<Address>,
    /// Transaction value in wei
    pub value: U256,
    /// Gas limit
    pub gas_limit: Option<u64>,
    /// Maximum fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<U256>,
    /// Maximum priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<U256>,
    /// Transaction data
    pub data: Bytes,
    /// Chain ID for EIP-155 replay protection
    pub chain_id: u64,
}

impl EvmTransactionRequest {
    /// Create a new transaction request
    pub fn new(chain_id: u64) -> Self {
        Self {
            from: None,
            to: None,
            value: U256::ZERO,
            gas_limit: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            data: Bytes::new(),
            chain_id,
        }
    }

    /// Set the sender
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the target address
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Set the transaction value
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Set EIP-1559 fees
    pub fn eip1559_fees(mut self, max_fee: U256, priority_fee: U256) -> Self {
        self.max_fee_per_gas = Some(max_fee);
        self.max_priority_fee_per_gas = Some(priority_fee);
        self
    }

    /// Set transaction data
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }
}

/// EVM-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("ABI encoding/decoding error: {0}")]
    AbiError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimationError(String),

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Timed out waiting for transaction {0}")]
    ConfirmationTimeout(String),
}

impl From<EvmError> for Error {
    fn from(err: EvmError) -> Self {
        match err {
            EvmError::RpcError(msg) => Error::Rpc(msg),
            other => Error::Evm(other.to_string()),
        }
    }
}
