use async_trait::async_trait;
use ethers::prelude::*;
use log::debug;
use std::sync::Arc;

use crate::binding::{decode_address, decode_uint24, ContractBinding, ReadAccessor};
use crate::contracts::{AbiRepository, ContractAbi, PANCAKESWAP_V3_POOL, PANCAKESWAP_V3_POOL_ABI};
use crate::errors::Result;
use crate::exchange::{ExchangeAdapter, ExchangeCore};
use crate::pools::normalize_fee;

use super::PANCAKESWAP_V3_NAME;

/// Standalone PancakeSwap V3 adapter.
///
/// Always the PancakeSwap pool ABI, no factory enumeration, and reads through the
/// generic call-then-decode convention rather than the cached caller.
pub struct PancakeSwapV3Adapter {
    core: ExchangeCore,
    pool_abi: Arc<ContractAbi>,
}

impl PancakeSwapV3Adapter {
    pub fn new(exchange_name: impl Into<String>, router_address: Option<Address>) -> Self {
        Self {
            core: ExchangeCore::new(exchange_name, PANCAKESWAP_V3_NAME, router_address),
            pool_abi: Arc::clone(&PANCAKESWAP_V3_POOL_ABI),
        }
    }

    pub fn from_repository(
        exchange_name: impl Into<String>,
        router_address: Option<Address>,
        repository: &AbiRepository,
    ) -> Result<Self> {
        Ok(Self {
            core: ExchangeCore::new(exchange_name, PANCAKESWAP_V3_NAME, router_address),
            pool_abi: repository.get(PANCAKESWAP_V3_POOL)?,
        })
    }
}

#[async_trait]
impl ExchangeAdapter for PancakeSwapV3Adapter {
    fn core(&self) -> &ExchangeCore {
        &self.core
    }

    fn get_abi(&self) -> Arc<ContractAbi> {
        Arc::clone(&self.pool_abi)
    }

    async fn get_fee(&self, address: Address, contract: &ContractBinding) -> Result<(u32, f64)> {
        let fee = decode_uint24("fee", contract.functions().read("fee").await?)?;
        debug!("{} pool {:?} fee {}", self.exchange_name(), address, fee);
        Ok((fee, normalize_fee(fee)))
    }

    async fn get_tkn0(
        &self,
        _address: Address,
        contract: &ContractBinding,
        _event: Option<&Log>,
    ) -> Result<Address> {
        decode_address("token0", contract.functions().read("token0").await?)
    }

    async fn get_tkn1(
        &self,
        _address: Address,
        contract: &ContractBinding,
        _event: Option<&Log>,
    ) -> Result<Address> {
        decode_address("token1", contract.functions().read("token1").await?)
    }
}
