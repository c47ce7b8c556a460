/// Minting core: sold-out evaluation, the mint transaction flow, the per-list
/// in-flight guard and display helpers for front-ends.
pub mod builder;
pub mod display;
pub mod eligibility;
pub mod guard;

pub use builder::{ApprovalRecord, MintOptions, MintOutcome, MintStage, MintTransactionBuilder};
pub use display::{list_limit_label, price_label, progress_label, wallet_limit_label, ListView};
pub use eligibility::{evaluate, is_sold_out, ListMintStatus, MintCounts, SoldOutReason};
pub use guard::{MintGuard, MintPermit};
