use ethers::abi::{Event, Log as DecodedLog, RawLog};
use ethers::types::{Address, Filter, Log, H256};

use crate::errors::{AdapterError, Result};

/// A named event signature scoped to one emitting contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    address: Address,
    event: Event,
}

impl EventDescriptor {
    pub fn new(address: Address, event: Event) -> Self {
        Self { address, event }
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// topic0 of the event.
    pub fn signature(&self) -> H256 {
        self.event.signature()
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Parses a raw log emitted by this contract.
    pub fn decode(&self, log: &Log) -> Result<DecodedLog> {
        let raw = RawLog {
            topics: log.topics.clone(),
            data: log.data.to_vec(),
        };
        self.event
            .parse_log(raw)
            .map_err(|e| AdapterError::decode(&self.event.name, e.to_string()))
    }
}

/// Binds one event descriptor to live listening.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    event: EventDescriptor,
}

impl Subscription {
    pub fn new(event: EventDescriptor) -> Self {
        Self { event }
    }

    pub fn event(&self) -> &EventDescriptor {
        &self.event
    }

    /// Log filter for `eth_getLogs` / `eth_subscribe`.
    pub fn filter(&self) -> Filter {
        Filter::new()
            .address(self.event.address())
            .topic0(self.event.signature())
    }
}
