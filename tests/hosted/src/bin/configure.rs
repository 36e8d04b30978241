//! Provision a simulated exchange on a live cluster and write the resulting
//! market addresses to a config file for downstream tooling.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;

use hosted_sim::config::Config;
use hosted_sim::runtime::ExchangeTestContext;
use hosted_sim::setup_helper::configure_exchange;
use obsim_simulation::RpcConnection;

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Opts {
    /// RPC endpoint of the target cluster
    #[clap(long, env = "RPC_URL", default_value = "http://127.0.0.1:8899")]
    url: String,

    /// Path to the fee-paying admin keypair
    #[clap(long, env = "PAYER_KEYPAIR")]
    payer: PathBuf,

    /// Address of the deployed exchange program
    #[clap(long, value_parser, default_value = "opnb2LAfJYbRMAHHvqjCwQxanZn7ReEHp1k81EohpZb")]
    program: Pubkey,

    /// Number of markets to create
    #[clap(long, default_value_t = 2)]
    markets: usize,

    /// Number of trading users to register and fund
    #[clap(long, default_value_t = 2)]
    users: usize,

    /// Resting orders per book side, per user and market
    #[clap(long, default_value_t = 4)]
    orders_per_side: usize,

    /// IDL file describing the deployed program's account layouts, when it
    /// differs from the bundled one
    #[clap(long)]
    idl: Option<PathBuf>,

    /// Where to write the market config
    #[clap(long, default_value = "config.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let payer = read_keypair_file(&opts.payer)
        .map_err(|e| anyhow!("failed to read keypair {}: {e}", opts.payer.display()))?;
    let idl = match &opts.idl {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let rpc = RpcConnection::new_optimistic(payer, &opts.url);
    let ctx = ExchangeTestContext::on_cluster(Arc::new(rpc), opts.program, idl.as_deref())?;

    let environment =
        configure_exchange(&ctx, opts.markets, opts.users, opts.orders_per_side).await?;

    let config = Config::from_markets(&ctx.program, &environment.markets);
    config.save(&opts.output)?;
    info!(
        "wrote {} markets to {}",
        config.markets.len(),
        opts.output.display()
    );

    Ok(())
}
