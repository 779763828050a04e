// Contracts Module - Public ABIs Only
//
// Interface descriptors are static data. Adapters hand them out by reference and the
// pipeline opens contract bindings with them; nothing here talks to the chain.

pub mod pancakeswap_v3;
pub mod repository;
pub mod uniswap_v3;

pub use pancakeswap_v3::PANCAKESWAP_V3_POOL_ABI;
pub use repository::{AbiRepository, ContractAbi};
pub use uniswap_v3::{UNISWAP_V3_FACTORY_ABI, UNISWAP_V3_POOL_ABI};

/// Repository names of the built-in descriptors.
pub const UNISWAP_V3_POOL: &str = "uniswap_v3_pool";
pub const UNISWAP_V3_FACTORY: &str = "uniswap_v3_factory";
pub const PANCAKESWAP_V3_POOL: &str = "pancakeswap_v3_pool";
