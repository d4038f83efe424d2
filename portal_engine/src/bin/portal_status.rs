use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use portal_engine::chain_config::{DEFAULT_RPC_URL, HELIOS_NETWORK_ID};
use portal_engine::rpc_client::from_hex_u64;
use portal_engine::{RpcClient, SettingsStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
pub struct Args {
    /// Override the RPC endpoint (applied through debug mode).
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "PAGE", default_value_t = 1)]
    pub page: u64,

    #[arg(long, env = "PAGE_SIZE", default_value_t = 10)]
    pub page_size: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Arc::new(SettingsStore::in_memory());
    if let Some(url) = &args.rpc_url {
        settings.set_rpc_url(url.clone())?;
        settings.set_debug_mode(true)?;
    }
    info!("querying {}", settings.resolve_rpc_url());

    let rpc = RpcClient::new(settings);

    match rpc.latest_block_number().await? {
        Some(number) => println!("⛓️  Chain {HELIOS_NETWORK_ID} at block #{number}"),
        None => println!("⛓️  Chain {HELIOS_NETWORK_ID}, block height unavailable"),
    }

    match rpc.gas_price().await? {
        Some(price) => println!("⛽ Gas price: {} gwei", price as f64 / 1e9),
        None => println!("⛽ Gas price unavailable"),
    }

    let validators = rpc
        .validators_by_page_and_size(args.page, args.page_size)
        .await?;
    println!("👥 Validators (page {}):", args.page);
    for validator in &validators {
        let status = if validator.jailed { "jailed" } else { "active" };
        println!("   {} [{}] {}", validator.address, status, validator.moniker);
    }

    let total = rpc.proposal_total_count().await?;
    let proposals = rpc
        .proposals_by_page_and_size(args.page, args.page_size)
        .await?;
    println!("🗳️  Proposals ({total} total):");
    for proposal in &proposals {
        println!("   #{} {} [{}]", proposal.id, proposal.title, proposal.status);
    }

    if let Some(block) = rpc.block_by_number("latest").await? {
        let timestamp = from_hex_u64(&block.timestamp)?;
        println!("🕒 Latest block timestamp: {timestamp}");
    }

    if args.rpc_url.is_none() {
        info!("tip: pass --rpc-url to point somewhere other than {DEFAULT_RPC_URL}");
    }
    Ok(())
}
