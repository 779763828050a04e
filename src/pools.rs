// src/pools.rs

use ethers::types::{Address, I256, U256};
use serde::{Deserialize, Serialize};

/// On-chain fee tiers in this AMM family are hundredths of a basis point.
pub const FEE_SCALE: f64 = 1_000_000.0;

/// Raw fee units to a fraction: 3000 -> 0.003.
pub fn normalize_fee(fee_raw: u32) -> f64 {
    fee_raw as f64 / FEE_SCALE
}

/// Protocol-agnostic pool record.
///
/// Created once per address by the adapter that decoded it and refreshed in
/// place from swap events afterwards. `address`, the token pair and the fee are
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub address: Address,
    pub exchange_name: String,
    pub token0: Address,
    pub token1: Address,
    /// Fee exactly as the pool reports it (uint24).
    pub fee_raw: u32,
    /// `fee_raw / 1_000_000`.
    pub fee: f64,
    pub liquidity: Option<u128>,
    pub sqrt_price_x96: Option<U256>,
    pub tick: Option<i32>,
    pub last_updated_block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    state: PoolState,
}

impl Pool {
    pub fn new(
        address: Address,
        exchange_name: impl Into<String>,
        token0: Address,
        token1: Address,
        (fee_raw, fee): (u32, f64),
    ) -> Self {
        Self {
            state: PoolState {
                address,
                exchange_name: exchange_name.into(),
                token0,
                token1,
                fee_raw,
                fee,
                liquidity: None,
                sqrt_price_x96: None,
                tick: None,
                last_updated_block: None,
            },
        }
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn exchange_name(&self) -> &str {
        &self.state.exchange_name
    }

    pub fn tokens(&self) -> (Address, Address) {
        (self.state.token0, self.state.token1)
    }

    pub fn fee_raw(&self) -> u32 {
        self.state.fee_raw
    }

    pub fn fee(&self) -> f64 {
        self.state.fee
    }

    pub fn is_valid(&self) -> bool {
        self.state.address != Address::zero()
            && self.state.token0 != Address::zero()
            && self.state.token1 != Address::zero()
            && self.state.token0 != self.state.token1
    }

    /// Refreshes price and liquidity from a decoded swap.
    ///
    /// Returns false, leaving the pool untouched, when the update belongs to
    /// another pool or is older than the last one applied.
    pub fn apply_swap(&mut self, update: &SwapUpdate) -> bool {
        if update.pool != self.state.address {
            return false;
        }
        if let (Some(last), Some(block)) = (self.state.last_updated_block, update.block_number) {
            if block < last {
                return false;
            }
        }

        self.state.sqrt_price_x96 = Some(update.sqrt_price_x96);
        self.state.liquidity = Some(update.liquidity);
        self.state.tick = Some(update.tick);
        if update.block_number.is_some() {
            self.state.last_updated_block = update.block_number;
        }
        true
    }
}

/// Fields decoded from a `Swap` log.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapUpdate {
    pub pool: Address,
    pub amount0: I256,
    pub amount1: I256,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    /// Present on PancakeSwap-style pools only.
    pub protocol_fees: Option<(u128, u128)>,
    pub block_number: Option<u64>,
}
