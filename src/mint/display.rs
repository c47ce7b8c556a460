/// Presentation helpers for storefront front-ends
use alloy_primitives::U256;
use serde::Serialize;

use super::eligibility::{ListMintStatus, MintCounts};
use crate::protocols::scatter::{Collection, InviteList, MintLimit};

/// `"FREE"` for a zero price, otherwise `"{price} {symbol}"` verbatim
pub fn price_label(list: &InviteList) -> String {
    if list.is_free() {
        "FREE".to_string()
    } else {
        format!("{} {}", list.token_price, list.currency_symbol)
    }
}

/// `"{minted}/{limit} per wallet"`, or `None` when the wallet limit is unlimited
pub fn wallet_limit_label(list: &InviteList, counts: &MintCounts) -> Option<String> {
    limit_label(list.wallet_limit, counts.wallet_minted, "per wallet")
}

/// `"{minted}/{limit} minted"`, or `None` when the list limit is unlimited
pub fn list_limit_label(list: &InviteList, counts: &MintCounts) -> Option<String> {
    limit_label(list.list_limit, counts.list_minted, "minted")
}

fn limit_label(limit: MintLimit, count: Option<U256>, suffix: &str) -> Option<String> {
    match limit {
        MintLimit::Unlimited => None,
        MintLimit::Limited(limit) => Some(format!(
            "{}/{} {}",
            count.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
            limit,
            suffix
        )),
    }
}

/// `"{num}/{max} ({pct}%)"`
pub fn progress_label(collection: &Collection) -> String {
    format!(
        "{}/{} ({:.0}%)",
        collection.num_items,
        collection.max_items,
        collection.progress_percent()
    )
}

/// Everything a front-end needs to render one list row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub wallet_limit: Option<String>,
    pub list_limit: Option<String>,
    pub sold_out: bool,
    pub pending: bool,
}

impl ListView {
    pub fn new(list: &InviteList, counts: &MintCounts, status: &ListMintStatus) -> Self {
        Self {
            id: list.id.clone(),
            name: list.name.clone(),
            price: price_label(list),
            wallet_limit: wallet_limit_label(list, counts),
            list_limit: list_limit_label(list, counts),
            sold_out: status.is_sold_out(),
            pending: status.counts_pending,
        }
    }
}
