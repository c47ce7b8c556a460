use alloy_primitives::Address;
use thiserror::Error;

/// Errors produced by the Scatter mint SDK
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scatter API error: {0}")]
    Api(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("EVM error: {0}")]
    Evm(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet session disconnected")]
    WalletDisconnected,

    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mint(#[from] MintError),

    #[error("{0}")]
    Other(String),
}

/// Terminal failures of a single mint attempt.
///
/// None of these are retried automatically. A fresh attempt starts again from
/// the template request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    #[error("Mint template request failed{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    TemplateRequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Mint template is malformed: {0}")]
    TemplateMalformed(String),

    #[error("Failed to read allowance for token {token}: {reason}")]
    AllowanceReadFailed { token: Address, reason: String },

    #[error("Approval for token {token} was rejected: {reason}")]
    ApprovalRejected { token: Address, reason: String },

    #[error("Approval for token {token} failed: {reason}")]
    ApprovalFailed { token: Address, reason: String },

    #[error("Mint transaction was rejected: {0}")]
    MintRejected(String),

    #[error("Mint transaction failed: {0}")]
    MintFailed(String),

    #[error("Failed to switch wallet to chain {chain_id}: {reason}")]
    ChainSwitchFailed { chain_id: u64, reason: String },

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("A mint attempt for list '{list_id}' is already in progress")]
    AttemptInProgress { list_id: String },

    #[error("Invalid mint options: {0}")]
    InvalidOptions(String),
}

impl MintError {
    /// Whether the user declined a wallet prompt, as opposed to a technical failure
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            MintError::ApprovalRejected { .. } | MintError::MintRejected(_)
        )
    }

    /// Whether the attempt never reached the wallet
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MintError::WalletNotConnected
                | MintError::AttemptInProgress { .. }
                | MintError::InvalidOptions(_)
        )
    }
}
