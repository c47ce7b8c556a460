pub mod client;
pub mod config;
pub mod error;
pub mod mint;
pub mod protocols;
pub mod wallet;

// Main client exports
pub use client::{
    ListEntry, MintAvailability, StorefrontClient, StorefrontClientBuilder, StorefrontSnapshot,
};
pub use config::{EnvironmentConfig, StorefrontConfig};
pub use error::{Error, MintError};

// Minting exports
pub use mint::{
    evaluate, is_sold_out, ListMintStatus, ListView, MintCounts, MintGuard, MintOptions,
    MintOutcome, MintStage, MintTransactionBuilder, SoldOutReason,
};

// Protocol exports
pub use protocols::evm::contracts::WalletMintedSource;
pub use protocols::evm::{ChainReader, EvmChainReader, EvmClient};
pub use protocols::scatter::{
    Collection, InviteList, MintLimit, MintRequest, MintTransactionTemplate, ScatterApi,
    ScatterClient,
};

// Wallet exports
pub use wallet::{LocalWallet, SessionState, WalletSession};
