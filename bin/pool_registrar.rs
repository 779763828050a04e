//! # Pool Registrar
//!
//! Builds one adapter per configured exchange, enumerates pools from each
//! factory, registers them and marks the adapter initialized. Optionally replays
//! swap logs over a block range through the dispatcher afterwards.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin pool_registrar -- --config Config.toml --from-block 18000000
//! ```

use amm_exchange_adapters::{
    adapters::build_adapter,
    binding::ContractBinding,
    dispatcher::EventDispatcher,
    multicall::Multicall,
    registration::bootstrap_exchange,
    settings::Settings,
    transport::{CallTransport, EthCallTransport},
    utils::create_block_chunks,
};
use anyhow::{Context, Result};
use clap::Parser;
use ethers::prelude::{Address, Filter, Http, Middleware, Provider, ValueOrArray, H256};
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(about = "Register AMM pools from factory lookups", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "Config.toml")]
    config: String,

    /// Only build the named exchange
    #[arg(short, long)]
    exchange: Option<String>,

    /// Replay swap logs starting at this block
    #[arg(short, long)]
    from_block: Option<u64>,
    /// defaults to the current chain tip
    #[arg(short, long)]
    to_block: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    env_logger::init();

    let cli = Cli::parse();

    // 1. Load settings
    let settings = Settings::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config))?;
    info!("Settings loaded from {}", cli.config);

    // 2. Connect
    let provider = Arc::new(Provider::<Http>::try_from(settings.rpc.http_url.as_str())?);
    let transport: Arc<dyn CallTransport> = Arc::new(EthCallTransport::new(provider.clone()));
    let multicall = Multicall::new(
        transport.clone(),
        settings.multicall_address()?,
        settings.multicall.batch_size,
    );

    // 3. Build adapters
    let repository = settings.abi_repository()?;
    let pairs = settings.token_pairs()?;
    let mut dispatcher = EventDispatcher::new();

    for exchange in &settings.exchanges {
        if cli.exchange.as_deref().map_or(false, |only| only != exchange.name) {
            continue;
        }
        let adapter = build_adapter(exchange, &repository)?;

        // 4. Enumerate and register
        match (exchange.factory_address()?, adapter.get_factory_abi()) {
            (Some(factory_address), Some(factory_abi)) => {
                let factory = ContractBinding::new(factory_address, factory_abi, transport.clone());
                let report = match bootstrap_exchange(
                    adapter.as_ref(),
                    &factory,
                    &multicall,
                    &pairs,
                    &settings.scan.fee_tiers,
                    transport.clone(),
                    settings.registration.max_concurrency,
                )
                .await
                {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("{}: factory scan failed, left uninitialized: {}", exchange.name, e);
                        continue;
                    }
                };
                for (address, e) in &report.failed {
                    warn!("{}: {:?} not registered: {}", exchange.name, address, e);
                }
            }
            (Some(_), None) => {
                warn!(
                    "{} has a factory address but its adapter cannot enumerate factories",
                    exchange.name
                );
                adapter.set_initialized(true);
            }
            (None, _) => {
                info!("{}: no factory configured, nothing to enumerate", exchange.name);
                adapter.set_initialized(true);
            }
        }

        println!(
            "{:<16} {:>6} pools  (pool ABI {})",
            adapter.exchange_name(),
            adapter.pools().len(),
            adapter.get_abi().name()
        );
        dispatcher.add(adapter);
    }

    // 5. Replay swaps
    if let Some(from_block) = cli.from_block {
        let to_block = match cli.to_block {
            Some(block) => block,
            None => provider.get_block_number().await?.as_u64(),
        };
        replay_swaps(&dispatcher, provider, transport, from_block, to_block, settings.scan.log_chunk_size)
            .await?;
    }

    Ok(())
}

async fn replay_swaps(
    dispatcher: &EventDispatcher,
    provider: Arc<Provider<Http>>,
    transport: Arc<dyn CallTransport>,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<()> {
    let subscriptions = dispatcher.subscriptions(transport)?;
    if subscriptions.is_empty() {
        info!("No registered pools, skipping replay");
        return Ok(());
    }

    let addresses: Vec<Address> = subscriptions.iter().map(|s| s.event().address()).collect();
    let topics: Vec<Option<H256>> = subscriptions
        .iter()
        .map(|s| s.event().signature())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(Some)
        .collect();

    let mut applied = 0usize;
    for (from, to) in create_block_chunks(from_block, to_block, chunk_size) {
        let filter = Filter::new()
            .from_block(from)
            .to_block(to)
            .address(ValueOrArray::Array(addresses.clone()))
            .topic0(ValueOrArray::Array(topics.clone()));
        let logs = provider.get_logs(&filter).await?;
        for log in &logs {
            match dispatcher.route(log) {
                Ok(Some(_)) => applied += 1,
                Ok(None) => {}
                Err(e) => warn!("Skipping log in tx {:?}: {}", log.transaction_hash, e),
            }
        }
    }

    println!(
        "Replayed blocks {}..={}: {} swaps applied across {} pools",
        from_block,
        to_block,
        applied,
        addresses.len()
    );
    Ok(())
}
