use config::{Config, ConfigError, File, FileFormat};
use ethers::types::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use crate::adapters::parse_address;
use crate::contracts::AbiRepository;
use crate::errors::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct Rpc {
    pub http_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Registration {
    /// Pools registered concurrently per adapter.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    16
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Multicall {
    #[serde(default = "default_multicall_address")]
    pub address: String,
    #[serde(default = "default_multicall_batch_size")]
    pub batch_size: usize,
}

fn default_multicall_address() -> String {
    // Multicall3, same address on every EVM chain it is deployed to
    "0xcA11bde05977b3631167028862bE2a173976CA11".to_string()
}
fn default_multicall_batch_size() -> usize {
    100
}

impl Default for Multicall {
    fn default() -> Self {
        Self {
            address: default_multicall_address(),
            batch_size: default_multicall_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeSettings {
    /// Unique exchange identifier, e.g. `uniswap_v3`, `agni_v3`.
    pub name: String,
    /// Adapter variant: `uniswap_v3` or `pancakeswap_v3`.
    pub base: String,
    #[serde(default)]
    pub router_address: Option<String>,
    #[serde(default)]
    pub factory_address: Option<String>,
    /// Repository name of a pool ABI overriding the fork table for this exchange.
    #[serde(default)]
    pub pool_abi: Option<String>,
}

impl ExchangeSettings {
    pub fn router_address(&self) -> Result<Option<Address>> {
        self.router_address.as_deref().map(parse_address).transpose()
    }

    pub fn factory_address(&self) -> Result<Option<Address>> {
        self.factory_address.as_deref().map(parse_address).transpose()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Scan {
    /// Tokens whose pairwise pools are looked up on each factory.
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default = "default_fee_tiers")]
    pub fee_tiers: Vec<u32>,
    #[serde(default = "default_log_chunk_size")]
    pub log_chunk_size: u64,
}

fn default_fee_tiers() -> Vec<u32> {
    vec![100, 500, 2500, 3000, 10000]
}
fn default_log_chunk_size() -> u64 {
    2_000
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            fee_tiers: default_fee_tiers(),
            log_chunk_size: default_log_chunk_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rpc: Rpc,
    #[serde(default)]
    pub registration: Registration,
    #[serde(default)]
    pub multicall: Multicall,
    #[serde(default)]
    pub exchanges: Vec<ExchangeSettings>,
    #[serde(default)]
    pub scan: Scan,
    /// Extra ABI files: repository name -> JSON path.
    #[serde(default)]
    pub abis: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_path("Config.toml")
    }

    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        Self::finish(s)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(s)
    }

    fn finish(s: Config) -> Result<Self, ConfigError> {
        let mut settings: Self = s.try_deserialize()?;

        // Environment variable override for the RPC endpoint
        if let Ok(raw_http) = env::var("ADAPTERS_RPC_HTTP_URL") {
            let trimmed = raw_http.trim();
            if !trimmed.is_empty() {
                settings.rpc.http_url = trimmed.to_string();
            }
        }

        Ok(settings)
    }

    /// Built-in descriptors plus every file listed under `[abis]`.
    pub fn abi_repository(&self) -> Result<AbiRepository> {
        let mut repository = AbiRepository::builtin();
        for (name, path) in &self.abis {
            repository.load_json_file(name, path)?;
        }
        Ok(repository)
    }

    pub fn multicall_address(&self) -> Result<Address> {
        parse_address(&self.multicall.address)
    }

    /// Every unordered pair of distinct scan tokens.
    pub fn token_pairs(&self) -> Result<Vec<(Address, Address)>> {
        let tokens = self
            .scan
            .tokens
            .iter()
            .map(|t| parse_address(t))
            .collect::<Result<Vec<_>>>()?;
        let mut pairs = Vec::new();
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                if a != b {
                    pairs.push((*a, *b));
                }
            }
        }
        Ok(pairs)
    }
}
