/// EVM support for the Scatter mint SDK
///
/// Contract reads, transaction signing payloads and JSON-RPC access for the
/// chain a collection lives on.
///
/// # Features
///
/// - Read-only contract calls via `eth_call`
/// - Raw transaction submission and receipt polling
/// - ERC-20 allowance helpers and Scatter collection counters
/// - EIP-1559 transaction builder
///
/// # Example
///
/// ```rust,no_run
/// use scatter_mint_sdk::protocols::evm::client::EvmClient;
/// use alloy_primitives::address;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let evm = EvmClient::new("https://mainnet.base.org", 8453).await?;
///
/// let usdc = evm.erc20(address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"));
/// let allowance = usdc
///     .allowance(
///         address!("1111111111111111111111111111111111111111"),
///         address!("2222222222222222222222222222222222222222"),
///     )
///     .await?;
/// println!("Allowance: {}", allowance);
/// # Ok(())
/// # }
/// ```
pub mod client;
pub mod contracts;
pub mod reader;
pub mod tx;
pub mod types;

pub use client::EvmClient;
pub use reader::{ChainReader, EvmChainReader};
pub use types::{EvmCallRequest, EvmError, EvmTransactionRequest};
