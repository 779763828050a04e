//! Integration tests for the exchange adapter contract
//!
//! Tests cover:
//! - Pool ABI selection by exchange name
//! - Bootstrap gating of event types
//! - Fee normalization and token reads for both read conventions
//! - Registry overwrite semantics and factory function binding

mod common;

use amm_exchange_adapters::adapters::{
    PancakeSwapV3Adapter, UniswapV3Adapter, PANCAKESWAP_V3_FORKS, PANCAKESWAP_V3_NAME,
    UNISWAP_V3_NAME,
};
use amm_exchange_adapters::binding::ContractBinding;
use amm_exchange_adapters::contracts::{
    PANCAKESWAP_V3_POOL, PANCAKESWAP_V3_POOL_ABI, UNISWAP_V3_POOL, UNISWAP_V3_POOL_ABI,
};
use amm_exchange_adapters::errors::AdapterError;
use amm_exchange_adapters::exchange::ExchangeAdapter;
use amm_exchange_adapters::pools::Pool;
use common::{addr, selector, MockTransport};
use ethers::types::Address;
use std::str::FromStr;
use std::sync::Arc;

fn pool_address() -> Address {
    Address::from_str("0x8ad599c3A0ff1De082011EFDDc58f1908eb6e6D8").unwrap()
}

fn binding_for(adapter: &dyn ExchangeAdapter, transport: Arc<MockTransport>) -> ContractBinding {
    ContractBinding::new(pool_address(), adapter.get_abi(), transport)
}

/// Known fork names get the PancakeSwap pool ABI, everything else the base one
#[test]
fn test_fork_dispatch_table() {
    for name in PANCAKESWAP_V3_FORKS {
        let adapter = UniswapV3Adapter::new(name, None);
        assert_eq!(adapter.get_abi().name(), PANCAKESWAP_V3_POOL, "fork {}", name);
    }
    for name in [UNISWAP_V3_NAME, "sushiswap_v3", "", "PANCAKESWAP_V3"] {
        let adapter = UniswapV3Adapter::new(name, None);
        assert_eq!(adapter.get_abi().name(), UNISWAP_V3_POOL, "name {:?}", name);
    }
}

/// get_abi is pure: repeated calls hand out the same descriptor
#[test]
fn test_get_abi_is_stable() {
    let adapter = UniswapV3Adapter::new("agni_v3", None);
    assert!(Arc::ptr_eq(&adapter.get_abi(), &adapter.get_abi()));
}

#[test]
fn test_events_are_gated_until_initialized() {
    let transport = Arc::new(MockTransport::new());
    let adapters: Vec<Box<dyn ExchangeAdapter>> = vec![
        Box::new(UniswapV3Adapter::new(UNISWAP_V3_NAME, None)),
        Box::new(PancakeSwapV3Adapter::new(PANCAKESWAP_V3_NAME, None)),
    ];

    for adapter in adapters {
        let binding = binding_for(adapter.as_ref(), transport.clone());
        assert!(!adapter.is_initialized());
        assert!(adapter.get_events(&binding).unwrap().is_empty());

        adapter.set_initialized(true);
        let events = adapter.get_events(&binding).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "Swap");
        assert_eq!(events[0].address(), pool_address());
    }
    assert_eq!(transport.calls(), 0);
}

/// Subscriptions are handed out before bootstrap completes, unlike events.
#[test]
fn subscriptions_are_not_gated_by_initialization() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    let binding = binding_for(&adapter, transport);

    assert!(!adapter.is_initialized());
    assert!(adapter.get_events(&binding).unwrap().is_empty());

    let subscriptions = adapter.get_subscriptions(&binding).unwrap();
    assert_eq!(subscriptions.len(), 1, "subscriptions ignore the bootstrap gate");
    assert_eq!(subscriptions[0].event().name(), "Swap");
    assert_eq!(
        subscriptions[0].event().signature(),
        UNISWAP_V3_POOL_ABI.abi().event("Swap").unwrap().signature()
    );
}

#[tokio::test]
async fn test_fee_is_normalized_for_both_variants() {
    let transport = Arc::new(MockTransport::new());
    let uniswap = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    let pancake = PancakeSwapV3Adapter::new(PANCAKESWAP_V3_NAME, None);

    transport.serve_pool(pool_address(), &UNISWAP_V3_POOL_ABI, addr(1), addr(2), 3000);
    let (raw, fee) = uniswap
        .get_fee(pool_address(), &binding_for(&uniswap, transport.clone()))
        .await
        .unwrap();
    assert_eq!(raw, 3000);
    assert!((fee - 0.003).abs() < 1e-12);

    transport.serve_pool(pool_address(), &PANCAKESWAP_V3_POOL_ABI, addr(1), addr(2), 500);
    let (raw, fee) = pancake
        .get_fee(pool_address(), &binding_for(&pancake, transport.clone()))
        .await
        .unwrap();
    assert_eq!(raw, 500);
    assert!((fee - 0.0005).abs() < 1e-12);
}

#[tokio::test]
async fn test_token_reads_issue_one_call_each() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    transport.serve_pool(pool_address(), &UNISWAP_V3_POOL_ABI, addr(0xa0), addr(0xb0), 100);
    let binding = binding_for(&adapter, transport.clone());

    assert_eq!(adapter.get_tkn0(pool_address(), &binding, None).await.unwrap(), addr(0xa0));
    assert_eq!(adapter.get_tkn1(pool_address(), &binding, None).await.unwrap(), addr(0xb0));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_rpc_failure_propagates_without_retry() {
    let transport = Arc::new(MockTransport::new());
    let adapter = PancakeSwapV3Adapter::new(PANCAKESWAP_V3_NAME, None);
    transport.fail(
        pool_address(),
        selector(&PANCAKESWAP_V3_POOL_ABI, "fee"),
        "connection reset",
    );

    let err = adapter
        .get_fee(pool_address(), &binding_for(&adapter, transport.clone()))
        .await
        .unwrap_err();
    assert!(err.is_rpc());
    assert_eq!(transport.calls(), 1, "no local retry");
}

#[tokio::test]
async fn test_non_numeric_fee_is_a_decode_error() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    transport.respond(
        pool_address(),
        selector(&UNISWAP_V3_POOL_ABI, "fee"),
        vec![0x01, 0x02],
    );
    let err = adapter
        .get_fee(pool_address(), &binding_for(&adapter, transport))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Decode { .. }));
}

#[test]
fn test_add_pool_overwrites_by_address() {
    let adapter = UniswapV3Adapter::new(UNISWAP_V3_NAME, None);
    adapter.add_pool(Pool::new(pool_address(), UNISWAP_V3_NAME, addr(1), addr(2), (500, 0.0005)));
    adapter.add_pool(Pool::new(pool_address(), UNISWAP_V3_NAME, addr(1), addr(2), (3000, 0.003)));
    adapter.add_pool(Pool::new(addr(0xcc), UNISWAP_V3_NAME, addr(1), addr(3), (100, 0.0001)));

    assert_eq!(adapter.pools().len(), 2);
    assert_eq!(adapter.pools().get(&pool_address()).unwrap().fee_raw(), 3000);
}

#[test]
fn test_get_pool_function_performs_no_io() {
    let transport = Arc::new(MockTransport::new());
    let adapter = UniswapV3Adapter::new("fusionx_v3", None);
    let factory = ContractBinding::new(addr(0xfa), adapter.get_factory_abi().unwrap(), transport.clone());

    let get_pool = adapter.get_pool_function(&factory).unwrap();
    assert_eq!(get_pool.name(), "getPool");
    assert_eq!(get_pool.address(), addr(0xfa));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_divergent_variant_has_no_factory_lookup() {
    let transport = Arc::new(MockTransport::new());
    let adapter = PancakeSwapV3Adapter::new(PANCAKESWAP_V3_NAME, None);
    let factory = ContractBinding::new(
        addr(0xfa),
        UniswapV3Adapter::new(UNISWAP_V3_NAME, None).get_factory_abi().unwrap(),
        transport,
    );
    assert!(adapter.get_factory_abi().is_none());
    assert!(matches!(
        adapter.get_pool_function(&factory),
        Err(AdapterError::Unsupported { .. })
    ));
}
