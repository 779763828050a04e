use ethers::abi::Abi;
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{AdapterError, Result};

use super::{PANCAKESWAP_V3_POOL_ABI, UNISWAP_V3_FACTORY_ABI, UNISWAP_V3_POOL_ABI};

/// A named, immutable interface descriptor.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    name: String,
    abi: Abi,
}

impl ContractAbi {
    pub fn new(name: impl Into<String>, abi: Abi) -> Self {
        Self {
            name: name.into(),
            abi,
        }
    }

    /// Builds a descriptor from human-readable Solidity signatures.
    pub fn human_readable(name: &str, signatures: &[&str]) -> Result<Self> {
        let abi = ethers::abi::parse_abi(signatures).map_err(|e| AdapterError::InvalidAbi {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(name, abi))
    }

    /// Builds a descriptor from standard JSON ABI text.
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let abi: Abi = serde_json::from_str(json)?;
        Ok(Self::new(name, abi))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }
}

impl PartialEq for ContractAbi {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.abi == other.abi
    }
}

/// Lookup of interface descriptors by protocol name.
///
/// Starts with the built-in Uniswap V3 / PancakeSwap V3 descriptors; deployments
/// with their own ABI files register them on top.
#[derive(Debug, Clone)]
pub struct AbiRepository {
    abis: HashMap<String, Arc<ContractAbi>>,
}

impl AbiRepository {
    pub fn empty() -> Self {
        Self {
            abis: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut repository = Self::empty();
        for abi in [
            &*UNISWAP_V3_POOL_ABI,
            &*UNISWAP_V3_FACTORY_ABI,
            &*PANCAKESWAP_V3_POOL_ABI,
        ] {
            repository
                .abis
                .insert(abi.name().to_string(), Arc::clone(abi));
        }
        repository
    }

    /// Registers a descriptor under its own name, replacing any previous entry.
    pub fn register(&mut self, abi: ContractAbi) -> Arc<ContractAbi> {
        let abi = Arc::new(abi);
        self.abis.insert(abi.name().to_string(), Arc::clone(&abi));
        abi
    }

    pub fn load_json_file(&mut self, name: &str, path: impl AsRef<Path>) -> Result<Arc<ContractAbi>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let abi = ContractAbi::from_json(name, &json)?;
        debug!("Loaded ABI `{}` from {}", name, path.display());
        Ok(self.register(abi))
    }

    pub fn get(&self, name: &str) -> Result<Arc<ContractAbi>> {
        self.abis
            .get(name)
            .cloned()
            .ok_or_else(|| AdapterError::UnknownAbi(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.abis.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AbiRepository {
    fn default() -> Self {
        Self::builtin()
    }
}
