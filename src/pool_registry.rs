use dashmap::DashMap;
use ethers::types::Address;
use log::debug;

use crate::pools::Pool;

/// Per-adapter pool registry.
///
/// Concurrent inserts for different addresses never interfere. Two inserts for the
/// same address race with last-write-wins; the stored value is always one whole
/// `Pool`, never a merge. Entries leave only through [`PoolRegistry::remove`].
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: DashMap<Address, Pool>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry keyed by `pool.address()`. Returns the replaced pool.
    pub fn insert(&self, pool: Pool) -> Option<Pool> {
        let address = pool.address();
        let previous = self.pools.insert(address, pool);
        if previous.is_some() {
            debug!("Replaced pool {:?}", address);
        }
        previous
    }

    pub fn get(&self, address: &Address) -> Option<Pool> {
        self.pools.get(address).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.pools.contains_key(address)
    }

    /// Mutates an entry in place. Returns `None` if the address is not registered.
    pub fn update<R>(&self, address: &Address, f: impl FnOnce(&mut Pool) -> R) -> Option<R> {
        self.pools.get_mut(address).map(|mut entry| f(entry.value_mut()))
    }

    pub fn remove(&self, address: &Address) -> Option<Pool> {
        self.pools.remove(address).map(|(_, pool)| pool)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.pools.iter().map(|entry| *entry.key()).collect()
    }
}
