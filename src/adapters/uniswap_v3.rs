use async_trait::async_trait;
use ethers::prelude::*;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::binding::{decode_address, decode_uint24, BoundFunction, ContractBinding, ReadAccessor};
use crate::contracts::{
    AbiRepository, ContractAbi, PANCAKESWAP_V3_POOL, PANCAKESWAP_V3_POOL_ABI, UNISWAP_V3_FACTORY,
    UNISWAP_V3_FACTORY_ABI, UNISWAP_V3_POOL, UNISWAP_V3_POOL_ABI,
};
use crate::errors::Result;
use crate::exchange::{ExchangeAdapter, ExchangeCore};
use crate::pools::normalize_fee;

use super::{
    AGNI_V3_NAME, ECHODEX_V3_NAME, FUSIONX_V3_NAME, PANCAKESWAP_V3_NAME, SECTA_V3_NAME,
    UNISWAP_V3_NAME,
};

/// Exchanges deployed from the PancakeSwap V3 pool contract.
pub const PANCAKESWAP_V3_FORKS: [&str; 5] = [
    PANCAKESWAP_V3_NAME,
    AGNI_V3_NAME,
    FUSIONX_V3_NAME,
    ECHODEX_V3_NAME,
    SECTA_V3_NAME,
];

/// Adapter for Uniswap V3 and every fork sharing its factory and accessors.
///
/// The pool ABI is selected by exchange name through a table filled at
/// construction; names missing from the table get the Uniswap V3 pool ABI.
/// Reads go through the binding's cached caller.
pub struct UniswapV3Adapter {
    core: ExchangeCore,
    base_abi: Arc<ContractAbi>,
    fork_abis: HashMap<String, Arc<ContractAbi>>,
    factory_abi: Arc<ContractAbi>,
}

impl UniswapV3Adapter {
    /// Adapter with the built-in descriptors.
    pub fn new(exchange_name: impl Into<String>, router_address: Option<Address>) -> Self {
        let fork_abis = PANCAKESWAP_V3_FORKS
            .iter()
            .map(|name| (name.to_string(), Arc::clone(&PANCAKESWAP_V3_POOL_ABI)))
            .collect();
        Self {
            core: ExchangeCore::new(exchange_name, UNISWAP_V3_NAME, router_address),
            base_abi: Arc::clone(&UNISWAP_V3_POOL_ABI),
            fork_abis,
            factory_abi: Arc::clone(&UNISWAP_V3_FACTORY_ABI),
        }
    }

    /// Adapter whose descriptors come from `repository`.
    pub fn from_repository(
        exchange_name: impl Into<String>,
        router_address: Option<Address>,
        repository: &AbiRepository,
    ) -> Result<Self> {
        let fork_abi = repository.get(PANCAKESWAP_V3_POOL)?;
        let fork_abis = PANCAKESWAP_V3_FORKS
            .iter()
            .map(|name| (name.to_string(), Arc::clone(&fork_abi)))
            .collect();
        Ok(Self {
            core: ExchangeCore::new(exchange_name, UNISWAP_V3_NAME, router_address),
            base_abi: repository.get(UNISWAP_V3_POOL)?,
            fork_abis,
            factory_abi: repository.get(UNISWAP_V3_FACTORY)?,
        })
    }

    /// Maps another exchange name to its own pool ABI.
    pub fn with_fork(mut self, exchange_name: impl Into<String>, pool_abi: Arc<ContractAbi>) -> Self {
        self.fork_abis.insert(exchange_name.into(), pool_abi);
        self
    }

    pub fn is_known_fork(&self) -> bool {
        self.fork_abis.contains_key(self.exchange_name())
    }
}

#[async_trait]
impl ExchangeAdapter for UniswapV3Adapter {
    fn core(&self) -> &ExchangeCore {
        &self.core
    }

    fn get_abi(&self) -> Arc<ContractAbi> {
        self.fork_abis
            .get(self.exchange_name())
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.base_abi))
    }

    fn get_factory_abi(&self) -> Option<Arc<ContractAbi>> {
        Some(Arc::clone(&self.factory_abi))
    }

    async fn get_fee(&self, address: Address, contract: &ContractBinding) -> Result<(u32, f64)> {
        let fee = decode_uint24("fee", contract.caller().read("fee").await?)?;
        debug!("{} pool {:?} fee {}", self.exchange_name(), address, fee);
        Ok((fee, normalize_fee(fee)))
    }

    async fn get_tkn0(
        &self,
        _address: Address,
        contract: &ContractBinding,
        _event: Option<&Log>,
    ) -> Result<Address> {
        decode_address("token0", contract.caller().read("token0").await?)
    }

    async fn get_tkn1(
        &self,
        _address: Address,
        contract: &ContractBinding,
        _event: Option<&Log>,
    ) -> Result<Address> {
        decode_address("token1", contract.caller().read("token1").await?)
    }

    /// `getPool(tokenA, tokenB, fee)` on the factory, bound for a multicall.
    fn get_pool_function(&self, factory_contract: &ContractBinding) -> Result<BoundFunction> {
        factory_contract.bind("getPool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_fork_table_is_populated_at_construction() {
        for name in PANCAKESWAP_V3_FORKS {
            let adapter = UniswapV3Adapter::new(name, None);
            assert!(adapter.is_known_fork(), "{}", name);
            assert_eq!(adapter.get_abi().name(), PANCAKESWAP_V3_POOL);
        }
        let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
        assert!(!adapter.is_known_fork());
        assert_eq!(adapter.get_abi().name(), UNISWAP_V3_POOL);
    }

    #[test]
    fn test_with_fork_turns_a_name_into_a_data_entry() {
        let custom = Arc::new(
            ContractAbi::human_readable("ramses_v3_pool", &["function fee() external view returns (uint24)"])
                .unwrap(),
        );
        let adapter = UniswapV3Adapter::new("ramses_v3", None).with_fork("ramses_v3", custom);
        assert_eq!(adapter.get_abi().name(), "ramses_v3_pool");
    }

    #[test]
    fn test_pool_function_is_bound_without_io() {
        let transport = Arc::new(MockTransport::new());
        let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
        let factory = ContractBinding::new(
            Address::repeat_byte(0xfa),
            adapter.get_factory_abi().unwrap(),
            transport.clone(),
        );
        let get_pool = adapter.get_pool_function(&factory).unwrap();
        assert_eq!(get_pool.name(), "getPool");
        assert_eq!(get_pool.address(), Address::repeat_byte(0xfa));
        assert_eq!(transport.calls(), 0);
    }
}
