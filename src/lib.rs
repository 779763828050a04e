//! # AMM Exchange Adapters
//!
//! Exchange adapters for concentrated-liquidity AMMs of the Uniswap V3 family and
//! its forks. Each adapter hides one protocol's contract interface behind a
//! uniform [`ExchangeAdapter`] contract so a pool synchronization pipeline can
//! discover, register and track pools without knowing which fork it is talking to.
//!
//! ## Overview
//!
//! - **Interface descriptors**: static pool and factory ABIs, looked up by name
//! - **Adapters**: ABI selection per exchange, fee and token reads, swap-event
//!   descriptors and subscriptions, a per-adapter pool registry
//! - **Registration**: the fee/token0/token1 protocol that never registers a
//!   half-read pool
//! - **Discovery**: batched factory lookups over Multicall3
//!
//! ## Architecture
//!
//! ### Contract Layer
//! [`contracts`] holds the descriptors, [`transport`] the read-only call seam and
//! [`binding`] the contract bindings adapters read through.
//!
//! ### Adapter Layer
//! [`exchange`] defines the trait and shared state; [`adapters`] holds the protocol
//! variants and builds them from configuration.
//!
//! ### Pipeline Layer
//! [`registration`], [`factory_scan`] and [`dispatcher`] drive adapters the way the
//! synchronization pipeline does.

// Core Types
/// Errors shared by every layer
pub mod errors;
/// Protocol-agnostic pool entity
pub mod pools;
/// Concurrent per-adapter pool registry
pub mod pool_registry;

// Contract Layer
/// Named interface descriptors (pool and factory ABIs)
pub mod contracts;
/// Read-only `eth_call` capability
pub mod transport;
/// Contract bindings and read conventions
pub mod binding;
/// Event descriptors and subscriptions
pub mod subscription;
/// Multicall3 batch execution
pub mod multicall;

// Adapter Layer
/// The exchange adapter contract
pub mod exchange;
/// Protocol variants (Uniswap V3 family, PancakeSwap V3)
pub mod adapters;

// Pipeline Layer
/// Pool registration protocol
pub mod registration;
/// Factory enumeration
pub mod factory_scan;
/// Live event routing
pub mod dispatcher;

// Infrastructure
/// Configuration management
pub mod settings;
/// Utility functions
pub mod utils;

pub use adapters::{build_adapter, PancakeSwapV3Adapter, UniswapV3Adapter};
pub use binding::{BoundFunction, ContractBinding, ReadAccessor};
pub use contracts::{AbiRepository, ContractAbi};
pub use errors::{AdapterError, Result};
pub use exchange::{ExchangeAdapter, ExchangeCore};
pub use pools::{Pool, PoolState, SwapUpdate};
pub use transport::{CallTransport, EthCallTransport};
