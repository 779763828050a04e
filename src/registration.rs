//! # Pool Registration
//!
//! Turns a candidate address into a registered [`Pool`]: open a binding with the
//! adapter's pool ABI, read fee and both tokens, build the pool, `add_pool`.
//! The three reads run concurrently; if any of them fails nothing is registered
//! for that address.

use ethers::types::{Address, Log};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::binding::ContractBinding;
use crate::errors::{AdapterError, Result};
use crate::exchange::ExchangeAdapter;
use crate::factory_scan::{candidate_addresses, scan_factory};
use crate::multicall::Multicall;
use crate::pools::Pool;
use crate::transport::CallTransport;

/// Outcome of a bulk registration run.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<Address>,
    pub failed: Vec<(Address, AdapterError)>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Binds `address` with the adapter's current pool ABI.
pub fn open_pool(
    adapter: &dyn ExchangeAdapter,
    address: Address,
    transport: Arc<dyn CallTransport>,
) -> ContractBinding {
    ContractBinding::new(address, adapter.get_abi(), transport)
}

/// Reads fee, token0 and token1 through `binding` and registers the result.
///
/// The registry is only touched once all three reads have succeeded and the
/// token pair is two distinct non-zero addresses.
pub async fn register_pool(
    adapter: &dyn ExchangeAdapter,
    address: Address,
    binding: &ContractBinding,
    event: Option<&Log>,
) -> Result<Pool> {
    let (fee, token0, token1) = futures::try_join!(
        adapter.get_fee(address, binding),
        adapter.get_tkn0(address, binding, event),
        adapter.get_tkn1(address, binding, event),
    )?;

    let pool = Pool::new(address, adapter.exchange_name(), token0, token1, fee);
    if !pool.is_valid() {
        return Err(AdapterError::decode(
            "token0/token1",
            format!("pool {:?} reported tokens {:?}/{:?}", address, token0, token1),
        ));
    }
    debug!(
        "{} registered pool {:?} ({:?}/{:?}, fee {})",
        adapter.exchange_name(),
        address,
        token0,
        token1,
        fee.0
    );
    adapter.add_pool(pool.clone());
    Ok(pool)
}

/// Registers every address in `candidates`, at most `max_concurrency` at a time.
///
/// A failure is recorded against its own address and does not stop the others.
pub async fn register_pools(
    adapter: &dyn ExchangeAdapter,
    candidates: &[Address],
    transport: Arc<dyn CallTransport>,
    max_concurrency: usize,
) -> RegistrationReport {
    let semaphore = Semaphore::new(max_concurrency.max(1));

    let tasks = candidates.iter().map(|&address| {
        let binding = open_pool(adapter, address, Arc::clone(&transport));
        let semaphore = &semaphore;
        async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = semaphore.acquire().await.ok();
            (address, register_pool(adapter, address, &binding, None).await)
        }
    });

    let mut report = RegistrationReport::default();
    for (address, result) in join_all(tasks).await {
        match result {
            Ok(_) => report.registered.push(address),
            Err(e) => {
                warn!(
                    "{} failed to register pool {:?}: {}",
                    adapter.exchange_name(),
                    address,
                    e
                );
                report.failed.push((address, e));
            }
        }
    }

    info!(
        "{}: registered {} pools, {} failed",
        adapter.exchange_name(),
        report.registered.len(),
        report.failed.len()
    );
    report
}

/// Enumerates `factory`, registers what it finds and marks the adapter initialized.
///
/// A failed factory scan returns the error and leaves the adapter uninitialized;
/// individual pool failures only show up in the report.
pub async fn bootstrap_exchange(
    adapter: &dyn ExchangeAdapter,
    factory: &ContractBinding,
    multicall: &Multicall,
    pairs: &[(Address, Address)],
    fee_tiers: &[u32],
    transport: Arc<dyn CallTransport>,
    max_concurrency: usize,
) -> Result<RegistrationReport> {
    let candidates = scan_factory(adapter, factory, multicall, pairs, fee_tiers).await?;
    let report = register_pools(
        adapter,
        &candidate_addresses(&candidates),
        transport,
        max_concurrency,
    )
    .await;
    adapter.set_initialized(true);
    Ok(report)
}
