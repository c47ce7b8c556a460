/// Sold-out evaluation for invite lists
///
/// Combines the collection supply with per-list and per-wallet counters read
/// from the chain. Counters that have not been read yet are pending and never
/// make a list sold out; neither does the unlimited sentinel.
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::protocols::scatter::{Collection, InviteList};

/// On-chain mint counters for one list, `None` while pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MintCounts {
    pub list_minted: Option<U256>,
    pub wallet_minted: Option<U256>,
    /// A wallet counter applies to this read. Without a connected account, or
    /// on a contract that exposes no per-wallet counter, it stays `false` and a
    /// missing `wallet_minted` is not pending.
    #[serde(default)]
    pub wallet_tracked: bool,
}

impl MintCounts {
    pub fn new(list_minted: Option<U256>, wallet_minted: Option<U256>) -> Self {
        Self {
            list_minted,
            wallet_minted,
            wallet_tracked: true,
        }
    }

    /// Only the list counter applies
    pub fn without_wallet(list_minted: Option<U256>) -> Self {
        Self {
            list_minted,
            wallet_minted: None,
            wallet_tracked: false,
        }
    }

    /// Both counters known
    pub fn resolved(list_minted: u64, wallet_minted: u64) -> Self {
        Self::new(Some(U256::from(list_minted)), Some(U256::from(wallet_minted)))
    }

    pub fn is_pending(&self) -> bool {
        self.list_minted.is_none() || (self.wallet_tracked && self.wallet_minted.is_none())
    }
}

/// Why a list cannot be minted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoldOutReason {
    CollectionMintedOut,
    ListLimitReached,
    WalletLimitReached,
}

/// Evaluated state of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMintStatus {
    pub sold_out: Option<SoldOutReason>,
    /// At least one counter is still pending
    pub counts_pending: bool,
}

impl ListMintStatus {
    pub fn is_sold_out(&self) -> bool {
        self.sold_out.is_some()
    }
}

/// Evaluate a list against the collection and its counters.
///
/// The collection-wide supply is checked first, then the list limit, then the
/// wallet limit.
pub fn evaluate(collection: &Collection, list: &InviteList, counts: &MintCounts) -> ListMintStatus {
    let sold_out = if collection.is_minted_out() {
        Some(SoldOutReason::CollectionMintedOut)
    } else if counts
        .list_minted
        .is_some_and(|minted| list.list_limit.is_reached(minted))
    {
        Some(SoldOutReason::ListLimitReached)
    } else if counts
        .wallet_minted
        .is_some_and(|minted| list.wallet_limit.is_reached(minted))
    {
        Some(SoldOutReason::WalletLimitReached)
    } else {
        None
    };

    ListMintStatus {
        sold_out,
        counts_pending: counts.is_pending(),
    }
}

pub fn is_sold_out(collection: &Collection, list: &InviteList, counts: &MintCounts) -> bool {
    evaluate(collection, list, counts).is_sold_out()
}
