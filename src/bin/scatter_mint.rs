//! Scatter mint command line storefront.

use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use scatter_mint_sdk::mint::progress_label;
use scatter_mint_sdk::{
    EnvironmentConfig, EvmClient, LocalWallet, MintAvailability, MintOptions, MintStage,
    StorefrontClient, StorefrontConfig,
};

const MNEMONIC_ENV: &str = "SCATTER_WALLET_MNEMONIC";

#[derive(Parser, Debug)]
#[command(name = "scatter-mint", version, about = "Browse and mint Scatter invite lists")]
struct Cli {
    /// Collection slug, overrides configuration
    #[arg(long, global = true)]
    slug: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show collection address, chain and mint progress
    Collection,
    /// Show the invite lists an address is eligible for
    Lists {
        /// Minter address; public lists only when omitted
        #[arg(long)]
        address: Option<Address>,
    },
    /// Mint from a list with the wallet in SCATTER_WALLET_MNEMONIC
    Mint {
        /// Invite list id
        #[arg(long)]
        list: String,
        /// Tokens to mint
        #[arg(long)]
        quantity: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let env_config = EnvironmentConfig::load().context("Failed to load configuration")?;
    init_tracing(&env_config);

    let mut config = StorefrontConfig::from_env_config(&env_config)?;
    if let Some(slug) = cli.slug {
        config.collection_slug = slug;
    }
    if !env_config.loaded_files.is_empty() {
        info!(files = ?env_config.loaded_files, "Configuration files loaded");
    }

    match cli.command {
        Command::Collection => show_collection(config).await,
        Command::Lists { address } => show_lists(config, address).await,
        Command::Mint { list, quantity } => mint(config, &list, quantity).await,
    }
}

fn init_tracing(env_config: &EnvironmentConfig) {
    let default_level = env_config.logging.level.as_deref().unwrap_or("warn");
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scatter_mint_sdk={}", default_level)),
    );
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(env_config.logging.enable_colors.unwrap_or(true))
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    if env_config.logging.format.as_deref() == Some("pretty") {
        registry.with(fmt_layer.pretty()).init();
    } else {
        registry.with(fmt_layer.compact()).init();
    }
}

async fn show_collection(config: StorefrontConfig) -> Result<()> {
    let client = StorefrontClient::builder().with_config(config).build().await?;
    let collection = client.collection().await?;

    println!("Collection: {}", client.collection_slug());
    println!("Address:    {}", collection.address);
    println!("Chain:      {}", collection.chain_id);
    println!("Minted:     {}", progress_label(&collection));
    Ok(())
}

async fn show_lists(config: StorefrontConfig, address: Option<Address>) -> Result<()> {
    let client = StorefrontClient::builder().with_config(config).build().await?;
    let snapshot = client.snapshot(address).await?;

    println!("{} ({})", client.collection_slug(), progress_label(&snapshot.collection));
    if snapshot.lists.is_empty() {
        println!("No eligible invite lists");
        return Ok(());
    }

    for view in snapshot.views() {
        let mut line = format!("- {} [{}] {}", view.name, view.id, view.price);
        for label in [view.wallet_limit, view.list_limit].into_iter().flatten() {
            line.push_str(&format!(" | {}", label));
        }
        if view.sold_out {
            line.push_str(" | SOLD OUT");
        } else if view.pending {
            line.push_str(" | PENDING");
        }
        println!("{}", line);
    }
    Ok(())
}

async fn mint(config: StorefrontConfig, list_id: &str, quantity: Option<u32>) -> Result<()> {
    let mnemonic = Zeroizing::new(
        std::env::var(MNEMONIC_ENV).with_context(|| format!("{} is not set", MNEMONIC_ENV))?,
    );

    let evm = EvmClient::new(&config.rpc_url, config.chain_id).await?;
    let wallet = LocalWallet::from_mnemonic(&mnemonic, config.account_index, evm)?
        .with_confirmation_timeout(config.confirmation_timeout);
    let minter = wallet.address();
    println!("Wallet: {}", minter);

    let quantity = quantity.unwrap_or(config.default_quantity);
    let client = StorefrontClient::builder()
        .with_config(config)
        .with_wallet(Arc::new(wallet))
        .build()
        .await?;

    let snapshot = client.snapshot(Some(minter)).await?;
    match client.can_mint(&snapshot, list_id) {
        MintAvailability::Available => {}
        MintAvailability::UnknownList => {
            bail!("List '{}' is not available to {}", list_id, minter)
        }
        other => bail!("Cannot mint from list '{}': {:?}", list_id, other),
    }

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(stage) = progress_rx.recv().await {
            match stage {
                MintStage::RequestingTemplate => println!("Requesting mint transaction..."),
                MintStage::CheckingAllowances => println!("Checking allowances..."),
                MintStage::ApprovingAllowance { token } => println!("Approving {}...", token),
                MintStage::SubmittingMint => println!("Submitting mint..."),
                MintStage::Completed { tx_hash } => println!("Mint submitted: {}", tx_hash),
                MintStage::Failed(err) => println!("Mint failed: {}", err),
            }
        }
    });

    let options = MintOptions::default()
        .with_quantity(quantity)
        .with_progress(progress_tx);
    let result = client.mint(&snapshot.collection, list_id, options).await;
    printer.await.ok();

    match result {
        Ok(outcome) => {
            for approval in &outcome.approvals {
                info!(token = %approval.token, tx_hash = %approval.tx_hash, "Approval confirmed");
            }
            Ok(())
        }
        Err(err) if err.is_user_rejection() => bail!("Cancelled in wallet: {}", err),
        Err(err) => Err(err.into()),
    }
}
