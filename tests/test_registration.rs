//! Integration tests for pool registration and factory enumeration
//!
//! Tests cover:
//! - No partial registration when one of the three reads fails
//! - Per-address failure isolation in bulk registration
//! - Pools with a zero or repeated token are rejected
//! - Factory scan over Multicall3 feeding registration
//! - A failed factory scan leaves only that exchange uninitialized

mod common;

use amm_exchange_adapters::adapters::{UniswapV3Adapter, UNISWAP_V3_NAME};
use amm_exchange_adapters::binding::ContractBinding;
use amm_exchange_adapters::contracts::{PANCAKESWAP_V3_POOL_ABI, UNISWAP_V3_FACTORY_ABI, UNISWAP_V3_POOL_ABI};
use amm_exchange_adapters::errors::AdapterError;
use amm_exchange_adapters::exchange::ExchangeAdapter;
use amm_exchange_adapters::factory_scan::{candidate_addresses, scan_factory};
use amm_exchange_adapters::multicall::Multicall;
use amm_exchange_adapters::registration::{bootstrap_exchange, open_pool, register_pool, register_pools};
use common::{addr, selector, MockTransport};
use ethers::abi::{encode, Token};
use ethers::types::Address;
use std::sync::Arc;

#[tokio::test]
async fn test_register_pool_builds_from_three_reads() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    transport.serve_pool(addr(0x10), &UNISWAP_V3_POOL_ABI, addr(1), addr(2), 3000);

    let binding = open_pool(&adapter, addr(0x10), transport.clone());
    let pool = register_pool(&adapter, addr(0x10), &binding, None).await.unwrap();

    assert_eq!(pool.tokens(), (addr(1), addr(2)));
    assert_eq!(pool.fee_raw(), 3000);
    assert_eq!(pool.exchange_name(), UNISWAP_V3_NAME);
    assert_eq!(adapter.pools().get(&addr(0x10)), Some(pool));
    assert_eq!(transport.calls(), 3);
}

/// A token0 failure must leave nothing behind for that address
#[tokio::test]
async fn test_token0_failure_prevents_partial_registration() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    transport.serve_pool(addr(0x10), &UNISWAP_V3_POOL_ABI, addr(1), addr(2), 3000);
    transport.fail(addr(0x10), selector(&UNISWAP_V3_POOL_ABI, "token0"), "timeout");

    let binding = open_pool(&adapter, addr(0x10), transport.clone());
    let err = register_pool(&adapter, addr(0x10), &binding, None)
        .await
        .unwrap_err();

    assert!(err.is_rpc());
    assert!(!adapter.pools().contains(&addr(0x10)));
    assert!(adapter.pools().is_empty());
}

/// A pool answering with unusable tokens must not be registered
#[tokio::test]
async fn test_invalid_token_pair_is_not_registered() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    transport.serve_pool(addr(0x10), &UNISWAP_V3_POOL_ABI, Address::zero(), Address::zero(), 3000);
    transport.serve_pool(addr(0x11), &UNISWAP_V3_POOL_ABI, addr(1), addr(1), 3000);

    for pool in [addr(0x10), addr(0x11)] {
        let binding = open_pool(&adapter, pool, transport.clone());
        let err = register_pool(&adapter, pool, &binding, None).await.unwrap_err();
        assert!(matches!(err, AdapterError::Decode { .. }), "{:?}: {}", pool, err);
    }
    assert!(adapter.pools().is_empty());
}

#[tokio::test]
async fn test_failures_are_isolated_per_address() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new("agni_v3", None);
    let candidates: Vec<Address> = (0x20..0x28).map(addr).collect();
    for (i, pool) in candidates.iter().enumerate() {
        transport.serve_pool(*pool, &PANCAKESWAP_V3_POOL_ABI, addr(1), addr(2 + i as u8), 500);
    }
    transport.fail(candidates[3], selector(&PANCAKESWAP_V3_POOL_ABI, "token1"), "reverted");
    transport.fail(candidates[6], selector(&PANCAKESWAP_V3_POOL_ABI, "fee"), "reverted");

    let report = register_pools(&adapter, &candidates, transport.clone(), 3).await;

    assert_eq!(report.registered.len(), 6);
    assert_eq!(report.failed.len(), 2);
    assert!(!report.is_complete());
    assert_eq!(adapter.pools().len(), 6);
    assert!(!adapter.pools().contains(&candidates[3]));
    assert!(!adapter.pools().contains(&candidates[6]));
    for address in &report.registered {
        assert_eq!(adapter.pools().get(address).unwrap().fee_raw(), 500);
    }
}

#[tokio::test]
async fn test_factory_scan_feeds_registration() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    let multicall_address = addr(0xca);
    let factory = ContractBinding::new(
        addr(0xfa),
        Arc::clone(&UNISWAP_V3_FACTORY_ABI),
        transport.clone(),
    );

    // (t1, t2) x [500, 3000]: a pool at 500, nothing at 3000
    let results = Token::Array(vec![
        Token::Tuple(vec![Token::Bool(true), Token::Bytes(encode(&[Token::Address(addr(0x31))]))]),
        Token::Tuple(vec![Token::Bool(true), Token::Bytes(encode(&[Token::Address(Address::zero())]))]),
    ]);
    let aggregate3 = ethers::utils::id("aggregate3((address,bool,bytes)[])");
    transport.respond(multicall_address, aggregate3, encode(&[results]));
    transport.serve_pool(addr(0x31), &UNISWAP_V3_POOL_ABI, addr(1), addr(2), 500);

    let multicall = Multicall::new(transport.clone(), multicall_address, 100);
    let candidates = scan_factory(&adapter, &factory, &multicall, &[(addr(1), addr(2))], &[500, 3000])
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].address, addr(0x31));
    assert_eq!(candidates[0].fee_tier, 500);

    let report = register_pools(&adapter, &candidate_addresses(&candidates), transport.clone(), 4).await;
    assert!(report.is_complete());
    assert_eq!(adapter.pools().get(&addr(0x31)).unwrap().fee_raw(), 500);
}

#[tokio::test]
async fn test_failed_factory_scan_only_stops_its_own_exchange() {
    let transport = Arc::new(MockTransport::new());
    let multicall_address = addr(0xca);
    let multicall = Multicall::new(transport.clone(), multicall_address, 100);
    let pairs = [(addr(1), addr(2))];

    // nothing answers aggregate3 yet, so the scan hits an RPC error
    let broken = UniswapV3Adapter::new("agni_v3", None);
    let broken_factory = ContractBinding::new(addr(0xfb), Arc::clone(&UNISWAP_V3_FACTORY_ABI), transport.clone());
    let err = bootstrap_exchange(&broken, &broken_factory, &multicall, &pairs, &[500], transport.clone(), 4)
        .await
        .unwrap_err();
    assert!(err.is_rpc());
    assert!(!broken.is_initialized());

    let results = Token::Array(vec![Token::Tuple(vec![
        Token::Bool(true),
        Token::Bytes(encode(&[Token::Address(addr(0x31))])),
    ])]);
    let aggregate3 = ethers::utils::id("aggregate3((address,bool,bytes)[])");
    transport.respond(multicall_address, aggregate3, encode(&[results]));
    transport.serve_pool(addr(0x31), &UNISWAP_V3_POOL_ABI, addr(1), addr(2), 500);

    let healthy = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    let factory = ContractBinding::new(addr(0xfa), Arc::clone(&UNISWAP_V3_FACTORY_ABI), transport.clone());
    let report = bootstrap_exchange(&healthy, &factory, &multicall, &pairs, &[500], transport.clone(), 4)
        .await
        .unwrap();
    assert!(report.is_complete());
    assert!(healthy.is_initialized());
    assert!(healthy.pools().contains(&addr(0x31)));
    assert!(!broken.is_initialized());
}
