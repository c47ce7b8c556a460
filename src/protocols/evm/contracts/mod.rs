/// EVM Contract interfaces and helpers
///
/// Type-safe interfaces for the contracts a mint touches, built with the
/// Alloy sol! macro.
///
/// # Available Contracts
///
/// - **ERC-20**: allowance reads and approval calldata for payment tokens
/// - **Collection**: Scatter collection mint counters
pub mod collection;
pub mod erc20;

// Re-export commonly used types
pub use collection::{
    CollectionContract, IScatterCollection, ResolvedWalletSource, WalletMintedSource,
};
pub use erc20::{encode_approve, Erc20, IERC20};
