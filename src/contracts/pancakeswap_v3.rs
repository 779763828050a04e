use once_cell::sync::Lazy;
use std::sync::Arc;

use super::{ContractAbi, PANCAKESWAP_V3_POOL};

// PancakeSwap V3 and its forks (Agni, FusionX, EchoDEX, Secta) diverge from the
// Uniswap pool in two places: slot0 returns a uint32 feeProtocol and the Swap
// event appends the protocol fees taken in each token. Both change the event
// topic and the return layout, so the pool needs its own descriptor.

pub static PANCAKESWAP_V3_POOL_ABI: Lazy<Arc<ContractAbi>> = Lazy::new(|| {
    Arc::new(
        ContractAbi::human_readable(
            PANCAKESWAP_V3_POOL,
            &[
                "function token0() external view returns (address)",
                "function token1() external view returns (address)",
                "function fee() external view returns (uint24)",
                "function tickSpacing() external view returns (int24)",
                "function liquidity() external view returns (uint128)",
                "function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint32 feeProtocol, bool unlocked)",
                "event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick, uint128 protocolFeesToken0, uint128 protocolFeesToken1)",
            ],
        )
        .expect("pancakeswap_v3_pool signatures are well formed"),
    )
});
