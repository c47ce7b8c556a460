/// ERC-20 token contract helpers
///
/// Allowance queries and approval calldata for the tokens a mint template
/// asks the minter to pay with.
use crate::error::Error;
use crate::protocols::evm::client::EvmClient;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ERC-20 token helper
#[derive(Debug, Clone)]
pub struct Erc20 {
    client: EvmClient,
    address: Address,
}

impl Erc20 {
    /// Create a new ERC-20 helper for the given contract address
    pub fn new(client: EvmClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Get the contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Amount `spender` may pull from `owner`
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Error> {
        let call = IERC20::allowanceCall { owner, spender };
        let result = self.client.call_contract(self.address, call).await?;
        Ok(result._0)
    }
}

/// Encode approve call data
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}
