// Exchange Adapters Module
// One adapter per exchange; forks of the same pool design share a variant.

pub mod pancakeswap_v3;
pub mod uniswap_v3;

pub use pancakeswap_v3::PancakeSwapV3Adapter;
pub use uniswap_v3::{UniswapV3Adapter, PANCAKESWAP_V3_FORKS};

use ethers::types::Address;
use log::info;
use std::sync::Arc;

use crate::contracts::AbiRepository;
use crate::errors::{AdapterError, Result};
use crate::exchange::ExchangeAdapter;
use crate::settings::ExchangeSettings;

pub const UNISWAP_V3_NAME: &str = "uniswap_v3";
pub const PANCAKESWAP_V3_NAME: &str = "pancakeswap_v3";
pub const AGNI_V3_NAME: &str = "agni_v3";
pub const FUSIONX_V3_NAME: &str = "fusionx_v3";
pub const ECHODEX_V3_NAME: &str = "echodex_v3";
pub const SECTA_V3_NAME: &str = "secta_v3";

/// Builds the adapter variant named by `settings.base`.
pub fn build_adapter(
    settings: &ExchangeSettings,
    repository: &AbiRepository,
) -> Result<Arc<dyn ExchangeAdapter>> {
    let router_address = settings.router_address()?;

    let adapter: Arc<dyn ExchangeAdapter> = match settings.base.as_str() {
        UNISWAP_V3_NAME => {
            let mut adapter =
                UniswapV3Adapter::from_repository(&settings.name, router_address, repository)?;
            if let Some(pool_abi) = &settings.pool_abi {
                adapter = adapter.with_fork(&settings.name, repository.get(pool_abi)?);
            }
            Arc::new(adapter)
        }
        PANCAKESWAP_V3_NAME => Arc::new(PancakeSwapV3Adapter::from_repository(
            &settings.name,
            router_address,
            repository,
        )?),
        other => return Err(AdapterError::UnknownExchange(other.to_string())),
    };

    info!(
        "Built {} adapter `{}` (pool ABI `{}`)",
        adapter.base_exchange_name(),
        adapter.exchange_name(),
        adapter.get_abi().name()
    );
    Ok(adapter)
}

pub(crate) fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|_| AdapterError::InvalidAddress(raw.to_string()))
}
