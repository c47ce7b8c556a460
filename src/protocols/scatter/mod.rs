/// Scatter API Module
/// Collection metadata, invite list eligibility and mint templates from the Scatter SaaS API
pub mod client;
pub mod types;

pub use client::{ScatterApi, ScatterClient, DEFAULT_SCATTER_API_URL};

pub use types::{
    Collection, Erc20Requirement, InviteList, MintLimit, MintListSelection, MintRequest,
    MintTransaction, MintTransactionTemplate, UNLIMITED_SENTINEL,
};
