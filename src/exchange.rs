//! # Exchange Adapter Trait
//!
//! One adapter instance per exchange (protocol or fork). The pool synchronization
//! pipeline drives adapters exclusively through [`ExchangeAdapter`]:
//!
//! 1. ask for the pool ABI ([`ExchangeAdapter::get_abi`]) and open a
//!    [`ContractBinding`] with it,
//! 2. ask which events to watch ([`ExchangeAdapter::get_events`],
//!    [`ExchangeAdapter::get_subscriptions`]),
//! 3. read fee and tokens ([`ExchangeAdapter::get_fee`],
//!    [`ExchangeAdapter::get_tkn0`], [`ExchangeAdapter::get_tkn1`]),
//! 4. hand the finished [`Pool`] back with [`ExchangeAdapter::add_pool`].
//!
//! ## Adding a New Protocol Variant
//!
//! Embed an [`ExchangeCore`], return it from `core()`, and implement the ABI and
//! the three accessors. Forks that only differ by pool ABI do not need a new
//! variant: register them on [`crate::adapters::UniswapV3Adapter`] instead.

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, Log, I256, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::binding::{BoundFunction, ContractBinding};
use crate::contracts::ContractAbi;
use crate::errors::{AdapterError, Result};
use crate::pool_registry::PoolRegistry;
use crate::pools::{Pool, SwapUpdate};
use crate::subscription::{EventDescriptor, Subscription};

/// Event every adapter in this family watches.
pub const SWAP_EVENT: &str = "Swap";

/// Identity, bootstrap gate and pool registry shared by every variant.
#[derive(Debug)]
pub struct ExchangeCore {
    exchange_name: String,
    base_exchange_name: &'static str,
    router_address: Option<Address>,
    exchange_initialized: AtomicBool,
    pools: PoolRegistry,
}

impl ExchangeCore {
    pub fn new(
        exchange_name: impl Into<String>,
        base_exchange_name: &'static str,
        router_address: Option<Address>,
    ) -> Self {
        Self {
            exchange_name: exchange_name.into(),
            base_exchange_name,
            router_address,
            exchange_initialized: AtomicBool::new(false),
            pools: PoolRegistry::new(),
        }
    }
}

/// The uniform contract consumed by the pool synchronization pipeline.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    fn core(&self) -> &ExchangeCore;

    fn exchange_name(&self) -> &str {
        &self.core().exchange_name
    }

    fn base_exchange_name(&self) -> &str {
        self.core().base_exchange_name
    }

    fn router_address(&self) -> Option<Address> {
        self.core().router_address
    }

    /// False until the pipeline has finished bootstrap discovery.
    fn is_initialized(&self) -> bool {
        self.core().exchange_initialized.load(Ordering::Acquire)
    }

    fn set_initialized(&self, initialized: bool) {
        self.core()
            .exchange_initialized
            .store(initialized, Ordering::Release);
    }

    fn pools(&self) -> &PoolRegistry {
        &self.core().pools
    }

    /// Pool-level interface descriptor. Pure; never fails.
    fn get_abi(&self) -> Arc<ContractAbi>;

    fn get_factory_abi(&self) -> Option<Arc<ContractAbi>> {
        None
    }

    /// The swap event while initialized, nothing before.
    ///
    /// Keeps pools seen during backfill from being counted again through live
    /// events before backfill completes.
    fn get_events(&self, contract: &ContractBinding) -> Result<Vec<EventDescriptor>> {
        if !self.is_initialized() {
            return Ok(Vec::new());
        }
        Ok(vec![contract.event(SWAP_EVENT)?])
    }

    /// One swap subscription for `contract`.
    ///
    /// Not gated on initialization, unlike `get_events`. Whether it should be is
    /// still open; see `subscriptions_are_not_gated_by_initialization` in tests.
    fn get_subscriptions(&self, contract: &ContractBinding) -> Result<Vec<Subscription>> {
        Ok(vec![Subscription::new(contract.event(SWAP_EVENT)?)])
    }

    /// Raw fee and fee fraction (`raw / 1_000_000`). One RPC call.
    async fn get_fee(&self, address: Address, contract: &ContractBinding) -> Result<(u32, f64)>;

    /// `event` is accepted for variants that derive tokens from the log; the
    /// current ones read it from the pool.
    async fn get_tkn0(
        &self,
        address: Address,
        contract: &ContractBinding,
        event: Option<&Log>,
    ) -> Result<Address>;

    async fn get_tkn1(
        &self,
        address: Address,
        contract: &ContractBinding,
        event: Option<&Log>,
    ) -> Result<Address>;

    /// Inserts or overwrites by `pool.address()`. Whether the pool was decoded
    /// with this adapter's ABI is the caller's responsibility.
    fn add_pool(&self, pool: Pool) {
        self.pools().insert(pool);
    }

    /// Factory pool lookup bound but not invoked, for batched calls.
    fn get_pool_function(&self, _factory_contract: &ContractBinding) -> Result<BoundFunction> {
        Err(AdapterError::Unsupported {
            exchange: self.exchange_name().to_string(),
            operation: "get_pool_function",
        })
    }

    /// Decodes a swap log with this adapter's pool ABI.
    fn decode_swap(&self, log: &Log) -> Result<SwapUpdate> {
        let abi = self.get_abi();
        let event = abi
            .abi()
            .event(SWAP_EVENT)
            .map_err(|_| AdapterError::UnknownEvent {
                abi: abi.name().to_string(),
                event: SWAP_EVENT.to_string(),
            })?;
        let decoded = EventDescriptor::new(log.address, event.clone()).decode(log)?;
        let param = |name: &str| -> Result<Token> {
            decoded
                .params
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.value.clone())
                .ok_or_else(|| AdapterError::decode(SWAP_EVENT, format!("missing `{}`", name)))
        };

        let protocol_fees = match (param("protocolFeesToken0"), param("protocolFeesToken1")) {
            (Ok(fee0), Ok(fee1)) => Some((uint128(fee0)?, uint128(fee1)?)),
            _ => None,
        };

        Ok(SwapUpdate {
            pool: log.address,
            amount0: int256(param("amount0")?)?,
            amount1: int256(param("amount1")?)?,
            sqrt_price_x96: uint256(param("sqrtPriceX96")?)?,
            liquidity: uint128(param("liquidity")?)?,
            tick: int24(param("tick")?)?,
            protocol_fees,
            block_number: log.block_number.map(|b| b.as_u64()),
        })
    }

    /// Refreshes the owned pool that emitted `log`.
    ///
    /// `Ok(false)` if the emitter is not registered here or the update is stale.
    fn apply_swap(&self, log: &Log) -> Result<bool> {
        if !self.pools().contains(&log.address) {
            return Ok(false);
        }
        let update = self.decode_swap(log)?;
        Ok(self
            .pools()
            .update(&log.address, |pool| pool.apply_swap(&update))
            .unwrap_or(false))
    }
}

fn uint256(token: Token) -> Result<U256> {
    token
        .into_uint()
        .ok_or_else(|| AdapterError::decode(SWAP_EVENT, "expected unsigned integer"))
}

fn uint128(token: Token) -> Result<u128> {
    let value = uint256(token)?;
    u128::try_from(value).map_err(|_| AdapterError::decode(SWAP_EVENT, "uint128 overflow"))
}

fn int256(token: Token) -> Result<I256> {
    token
        .into_int()
        .map(I256::from_raw)
        .ok_or_else(|| AdapterError::decode(SWAP_EVENT, "expected signed integer"))
}

fn int24(token: Token) -> Result<i32> {
    let value = int256(token)?;
    let as_i128: i128 = value
        .try_into()
        .map_err(|_| AdapterError::decode(SWAP_EVENT, "tick overflow"))?;
    i32::try_from(as_i128).map_err(|_| AdapterError::decode(SWAP_EVENT, "tick overflow"))
}
