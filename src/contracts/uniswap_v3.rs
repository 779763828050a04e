use once_cell::sync::Lazy;
use std::sync::Arc;

use super::{ContractAbi, UNISWAP_V3_FACTORY, UNISWAP_V3_POOL};

// ═══════════════════════════════════════════════════════════════════════════
// UNISWAP V3 POOL / FACTORY
// ═══════════════════════════════════════════════════════════════════════════
//
// Types follow the Solidity contracts exactly: uint24 fee, int24 tick,
// uint160 sqrtPriceX96, uint128 liquidity. A wider type decodes to garbage.

pub static UNISWAP_V3_POOL_ABI: Lazy<Arc<ContractAbi>> = Lazy::new(|| {
    Arc::new(
        ContractAbi::human_readable(
            UNISWAP_V3_POOL,
            &[
                "function token0() external view returns (address)",
                "function token1() external view returns (address)",
                "function fee() external view returns (uint24)",
                "function tickSpacing() external view returns (int24)",
                "function liquidity() external view returns (uint128)",
                "function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked)",
                "event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)",
            ],
        )
        .expect("uniswap_v3_pool signatures are well formed"),
    )
});

pub static UNISWAP_V3_FACTORY_ABI: Lazy<Arc<ContractAbi>> = Lazy::new(|| {
    Arc::new(
        ContractAbi::human_readable(
            UNISWAP_V3_FACTORY,
            &[
                "function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool)",
                "function feeAmountTickSpacing(uint24 fee) external view returns (int24)",
                "event PoolCreated(address indexed token0, address indexed token1, uint24 indexed fee, int24 tickSpacing, address pool)",
            ],
        )
        .expect("uniswap_v3_factory signatures are well formed"),
    )
});
