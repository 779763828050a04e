// src/transport.rs
//
// Read-only call capability consumed by contract bindings. Connection pooling,
// retries and timeouts belong to whatever sits behind this trait.

use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest};
use log::debug;
use std::sync::Arc;

use crate::errors::{AdapterError, Result};

/// Executes a single `eth_call`, resolving or failing atomically.
#[async_trait]
pub trait CallTransport: Send + Sync {
    async fn eth_call(&self, to: Address, calldata: Bytes) -> Result<Bytes>;
}

/// `CallTransport` over any ethers middleware.
#[derive(Clone)]
pub struct EthCallTransport<M: Middleware> {
    provider: Arc<M>,
}

impl<M: Middleware + 'static> EthCallTransport<M> {
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<M: Middleware + 'static> CallTransport for EthCallTransport<M> {
    async fn eth_call(&self, to: Address, calldata: Bytes) -> Result<Bytes> {
        let tx_request = TransactionRequest::new().to(to).data(calldata);
        let typed_tx: TypedTransaction = tx_request.into();
        debug!("eth_call -> {:?}", to);
        self.provider
            .call(&typed_tx, None)
            .await
            .map_err(|e| AdapterError::Rpc {
                target: to,
                reason: e.to_string(),
            })
    }
}

/// In-memory transport for tests, also exported under the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use crate::contracts::ContractAbi;
    use dashmap::DashMap;
    use ethers::abi::{encode, Token};
    use ethers::types::U256;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory transport keyed by (target, selector). Counts every call.
    #[derive(Default)]
    pub struct MockTransport {
        responses: DashMap<(Address, [u8; 4]), std::result::Result<Bytes, String>>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
            self.responses.insert((to, selector), Ok(Bytes::from(data)));
        }

        pub fn fail(&self, to: Address, selector: [u8; 4], reason: &str) {
            self.responses.insert((to, selector), Err(reason.to_string()));
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Answers `fee`, `token0` and `token1` for `pool` as declared in `abi`.
        pub fn serve_pool(
            &self,
            pool: Address,
            abi: &ContractAbi,
            token0: Address,
            token1: Address,
            fee: u32,
        ) {
            self.respond(pool, selector(abi, "fee"), encode(&[Token::Uint(U256::from(fee))]));
            self.respond(pool, selector(abi, "token0"), encode(&[Token::Address(token0)]));
            self.respond(pool, selector(abi, "token1"), encode(&[Token::Address(token1)]));
        }
    }

    /// Selector of `function` in `abi`. Panics if the ABI lacks it.
    pub fn selector(abi: &ContractAbi, function: &str) -> [u8; 4] {
        match abi.abi().function(function) {
            Ok(f) => f.short_signature(),
            Err(_) => panic!("`{}` has no function `{}`", abi.name(), function),
        }
    }

    #[async_trait]
    impl CallTransport for MockTransport {
        async fn eth_call(&self, to: Address, calldata: Bytes) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut selector = [0u8; 4];
            selector.copy_from_slice(&calldata[..4]);
            match self.responses.get(&(to, selector)).map(|r| r.value().clone()) {
                Some(Ok(data)) => Ok(data),
                Some(Err(reason)) => Err(AdapterError::Rpc { target: to, reason }),
                None => Err(AdapterError::Rpc {
                    target: to,
                    reason: "execution reverted".to_string(),
                }),
            }
        }
    }
}
