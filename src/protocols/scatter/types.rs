/// Scatter API data model
///
/// Wire types for the collection, invite list and mint endpoints. Field names
/// follow the API: collection and invite list payloads are snake_case, the
/// mint request and template are camelCase.
use std::fmt;
use std::str::FromStr;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Contract-side maximum for list and wallet limits, treated as "no limit"
pub const UNLIMITED_SENTINEL: u64 = u32::MAX as u64;

/// NFT collection metadata returned by `GET /collection/{slug}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection contract address
    pub address: Address,
    /// Chain the collection is deployed on
    pub chain_id: u64,
    /// Contract ABI, delivered by the API as a JSON-encoded string
    #[serde(
        deserialize_with = "deserialize_abi_string",
        serialize_with = "serialize_abi_string"
    )]
    pub abi: JsonAbi,
    /// Maximum supply
    pub max_items: u64,
    /// Minted so far
    pub num_items: u64,
}

impl Collection {
    /// No list can mint once the collection supply is exhausted
    pub fn is_minted_out(&self) -> bool {
        self.num_items >= self.max_items
    }

    /// Mint progress in percent, clamped to 0..=100
    pub fn progress_percent(&self) -> f64 {
        if self.max_items == 0 {
            return 100.0;
        }
        let pct = self.num_items as f64 / self.max_items as f64 * 100.0;
        pct.min(100.0)
    }

    /// Whether the ABI declares a function with the given name and arity
    pub fn has_function(&self, name: &str, inputs: usize) -> bool {
        self.abi
            .function(name)
            .map(|overloads| overloads.iter().any(|f| f.inputs.len() == inputs))
            .unwrap_or(false)
    }
}

fn deserialize_abi_string<'de, D>(deserializer: D) -> Result<JsonAbi, D::Error>
where
    D: Deserializer<'de>,
{
    // Some deployments already return the ABI as an array
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(raw) => {
            serde_json::from_str(&raw).map_err(serde::de::Error::custom)
        }
        other => serde_json::from_value(other).map_err(serde::de::Error::custom),
    }
}

fn serialize_abi_string<S>(abi: &JsonAbi, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let raw = serde_json::to_string(abi).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&raw)
}

/// A per-list or per-wallet mint cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MintLimit {
    Limited(u32),
    Unlimited,
}

impl MintLimit {
    /// Build a limit from its raw uint32 contract value
    pub fn from_raw(raw: u32) -> Self {
        if u64::from(raw) == UNLIMITED_SENTINEL {
            MintLimit::Unlimited
        } else {
            MintLimit::Limited(raw)
        }
    }

    /// Raw contract value, with the sentinel for `Unlimited`
    pub fn as_raw(&self) -> u64 {
        match self {
            MintLimit::Limited(limit) => *limit as u64,
            MintLimit::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, MintLimit::Unlimited)
    }

    /// Whether `count` has reached this limit. Never true for `Unlimited`.
    pub fn is_reached(&self, count: U256) -> bool {
        match self {
            MintLimit::Limited(limit) => count >= U256::from(*limit),
            MintLimit::Unlimited => false,
        }
    }
}

impl fmt::Display for MintLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintLimit::Limited(limit) => write!(f, "{}", limit),
            MintLimit::Unlimited => write!(f, "∞"),
        }
    }
}

impl Serialize for MintLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for MintLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        let raw = u32::try_from(raw).map_err(|_| {
            serde::de::Error::custom(format!("mint limit {} exceeds uint32", raw))
        })?;
        Ok(MintLimit::from_raw(raw))
    }
}

/// An allowlist tier returned by `GET /collection/{slug}/eligible-invite-lists`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteList {
    pub id: String,
    pub name: String,
    /// Merkle root identifying the list on-chain
    pub root: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_address: Option<Address>,
    pub currency_symbol: String,
    /// Price per token as a decimal string, "0" for free lists
    pub token_price: String,
    pub wallet_limit: MintLimit,
    pub list_limit: MintLimit,
}

impl InviteList {
    pub fn is_free(&self) -> bool {
        self.token_price == "0"
    }
}

/// One list entry of a mint request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintListSelection {
    pub id: String,
    pub quantity: u32,
}

/// Body of `POST /mint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub collection_address: Address,
    pub chain_id: u64,
    pub minter_address: Address,
    pub lists: Vec<MintListSelection>,
}

impl MintRequest {
    /// Request for a single list
    pub fn single(collection: &Collection, minter: Address, list_id: &str, quantity: u32) -> Self {
        Self {
            collection_address: collection.address,
            chain_id: collection.chain_id,
            minter_address: minter,
            lists: vec![MintListSelection {
                id: list_id.to_string(),
                quantity,
            }],
        }
    }
}

/// An ERC-20 payment the minter must allow before minting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Requirement {
    pub address: Address,
    #[serde(deserialize_with = "deserialize_u256_lenient")]
    pub amount: U256,
}

/// The native transaction that performs the mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintTransaction {
    #[serde(deserialize_with = "deserialize_u256_lenient")]
    pub value: U256,
    pub data: Bytes,
}

/// Response of `POST /mint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintTransactionTemplate {
    /// Prerequisite approvals, in the order the API returned them
    pub erc20s: Vec<Erc20Requirement>,
    pub mint_transaction: MintTransaction,
}

impl MintTransactionTemplate {
    /// Whether the mint is paid in the native token only
    pub fn is_native_only(&self) -> bool {
        self.erc20s.is_empty()
    }
}

/// Accepts a JSON number, a decimal string or a `0x` hex string
fn deserialize_u256_lenient<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => parse_u256(&s).map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(U256::from(v))
            } else {
                // Integers above u64 are only exact when sent as strings
                parse_u256(&n.to_string()).map_err(serde::de::Error::custom)
            }
        }
        other => Err(serde::de::Error::custom(format!(
            "expected integer amount, got {}",
            other
        ))),
    }
}

/// Parse a decimal or `0x`-prefixed hex integer
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex amount '{}': {}", s, e))
    } else {
        U256::from_str(s).map_err(|e| format!("invalid amount '{}': {}", s, e))
    }
}
