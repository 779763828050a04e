use ethers::types::Log;
use indexmap::IndexMap;
use log::{debug, warn};
use std::sync::Arc;

use crate::errors::Result;
use crate::exchange::ExchangeAdapter;
use crate::registration::open_pool;
use crate::subscription::{EventDescriptor, Subscription};
use crate::transport::CallTransport;

/// Routes live logs to the adapter that owns the emitting pool.
#[derive(Default)]
pub struct EventDispatcher {
    adapters: IndexMap<String, Arc<dyn ExchangeAdapter>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the adapter registered under its exchange name.
    pub fn add(&mut self, adapter: Arc<dyn ExchangeAdapter>) {
        let name = adapter.exchange_name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_some() {
            warn!("Replaced adapter for {}", name);
        }
    }

    pub fn get(&self, exchange_name: &str) -> Option<&Arc<dyn ExchangeAdapter>> {
        self.adapters.get(exchange_name)
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ExchangeAdapter>> {
        self.adapters.values()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Applies `log` to the pool that emitted it.
    ///
    /// Returns the owning exchange name, or `None` when no adapter owns the
    /// emitter or the update was stale.
    pub fn route(&self, log: &Log) -> Result<Option<&str>> {
        for (name, adapter) in &self.adapters {
            if !adapter.pools().contains(&log.address) {
                continue;
            }
            return Ok(adapter.apply_swap(log)?.then_some(name.as_str()));
        }
        debug!("No adapter owns {:?}", log.address);
        Ok(None)
    }

    /// One subscription per registered pool across every adapter.
    pub fn subscriptions(&self, transport: Arc<dyn CallTransport>) -> Result<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        for adapter in self.adapters.values() {
            for address in adapter.pools().addresses() {
                let binding = open_pool(adapter.as_ref(), address, Arc::clone(&transport));
                subscriptions.extend(adapter.get_subscriptions(&binding)?);
            }
        }
        Ok(subscriptions)
    }

    /// Event descriptors per registered pool; empty for adapters still bootstrapping.
    pub fn events(&self, transport: Arc<dyn CallTransport>) -> Result<Vec<EventDescriptor>> {
        let mut events = Vec::new();
        for adapter in self.adapters.values() {
            for address in adapter.pools().addresses() {
                let binding = open_pool(adapter.as_ref(), address, Arc::clone(&transport));
                events.extend(adapter.get_events(&binding)?);
            }
        }
        Ok(events)
    }
}
