//! Shared fixtures for integration tests.

#![allow(dead_code)]

use amm_exchange_adapters::contracts::ContractAbi;
use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, Log, H256, I256, U256, U64};

pub use amm_exchange_adapters::transport::mock::{selector, MockTransport};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub struct SwapFields {
    pub amount0: i64,
    pub amount1: i64,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    pub protocol_fees: Option<(u128, u128)>,
}

impl Default for SwapFields {
    fn default() -> Self {
        Self {
            amount0: 1_000_000,
            amount1: -500_000,
            sqrt_price_x96: U256::from(2).pow(U256::from(96)),
            liquidity: 10_000_000_000,
            tick: -887,
            protocol_fees: None,
        }
    }
}

/// A `Swap` log as `abi`'s pool would emit it.
pub fn swap_log(abi: &ContractAbi, pool: Address, block: u64, fields: &SwapFields) -> Log {
    let event = abi.abi().event("Swap").unwrap();
    let int = |v: i64| Token::Int(I256::from(v).into_raw());

    let mut data = vec![
        int(fields.amount0),
        int(fields.amount1),
        Token::Uint(fields.sqrt_price_x96),
        Token::Uint(U256::from(fields.liquidity)),
        int(fields.tick as i64),
    ];
    if let Some((fee0, fee1)) = fields.protocol_fees {
        data.push(Token::Uint(U256::from(fee0)));
        data.push(Token::Uint(U256::from(fee1)));
    }

    Log {
        address: pool,
        topics: vec![
            event.signature(),
            H256::from(addr(0x51)),
            H256::from(addr(0x52)),
        ],
        data: Bytes::from(encode(&data)),
        block_number: Some(U64::from(block)),
        ..Default::default()
    }
}
