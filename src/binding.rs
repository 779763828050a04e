//! # Contract Bindings
//!
//! A [`ContractBinding`] is a pool or factory address opened with one interface
//! descriptor over one [`CallTransport`]. Adapters read through it using one of two
//! conventions, both exposed through the [`ReadAccessor`] capability:
//!
//! - [`FunctionCall`] (`binding.functions()`): resolves the ABI function by name on
//!   every call, encodes, calls, decodes.
//! - [`ContractCaller`] (`binding.caller()`): resolves every zero-argument view
//!   function once, keeps the encoded calldata, and reuses it for each read.
//!
//! Which one an adapter uses is a protocol detail; the results are identical.

use async_trait::async_trait;
use ethers::abi::{Function, StateMutability, Token};
use ethers::types::{Address, Bytes, U256};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::contracts::ContractAbi;
use crate::errors::{AdapterError, Result};
use crate::multicall::Call;
use crate::subscription::EventDescriptor;
use crate::transport::CallTransport;

/// Read-only access to a contract's zero-argument view functions.
#[async_trait]
pub trait ReadAccessor: Send + Sync {
    /// Calls `function` and returns its decoded outputs.
    async fn read(&self, function: &str) -> Result<Vec<Token>>;
}

/// A contract address opened with a specific interface descriptor.
pub struct ContractBinding {
    address: Address,
    abi: Arc<ContractAbi>,
    transport: Arc<dyn CallTransport>,
    caller: OnceCell<Arc<ContractCaller>>,
}

impl ContractBinding {
    pub fn new(address: Address, abi: Arc<ContractAbi>, transport: Arc<dyn CallTransport>) -> Self {
        Self {
            address,
            abi,
            transport,
            caller: OnceCell::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Arc<ContractAbi> {
        &self.abi
    }

    pub fn function(&self, name: &str) -> Result<&Function> {
        self.abi
            .abi()
            .function(name)
            .map_err(|_| AdapterError::UnknownFunction {
                abi: self.abi.name().to_string(),
                function: name.to_string(),
            })
    }

    /// Event descriptor for `name`, scoped to this contract's address.
    pub fn event(&self, name: &str) -> Result<EventDescriptor> {
        let event = self
            .abi
            .abi()
            .event(name)
            .map_err(|_| AdapterError::UnknownEvent {
                abi: self.abi.name().to_string(),
                event: name.to_string(),
            })?;
        Ok(EventDescriptor::new(self.address, event.clone()))
    }

    /// Generic call-then-decode accessor.
    pub fn functions(&self) -> FunctionCall<'_> {
        FunctionCall { binding: self }
    }

    /// Cached caller, built on first use and shared afterwards.
    pub fn caller(&self) -> Arc<ContractCaller> {
        Arc::clone(self.caller.get_or_init(|| {
            Arc::new(ContractCaller::new(
                self.address,
                &self.abi,
                Arc::clone(&self.transport),
            ))
        }))
    }

    /// Binds `name` to this address without invoking it.
    pub fn bind(&self, name: &str) -> Result<BoundFunction> {
        Ok(BoundFunction {
            address: self.address,
            function: self.function(name)?.clone(),
        })
    }
}

impl std::fmt::Debug for ContractBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractBinding")
            .field("address", &self.address)
            .field("abi", &self.abi.name())
            .finish()
    }
}

/// Generic read convention: look up, encode, call, decode.
pub struct FunctionCall<'a> {
    binding: &'a ContractBinding,
}

#[async_trait]
impl<'a> ReadAccessor for FunctionCall<'a> {
    async fn read(&self, function: &str) -> Result<Vec<Token>> {
        let function = self.binding.function(function)?;
        invoke(
            self.binding.transport.as_ref(),
            self.binding.address,
            function,
            &[],
        )
        .await
    }
}

/// Cached read convention over every zero-argument view/pure function.
pub struct ContractCaller {
    address: Address,
    abi_name: String,
    transport: Arc<dyn CallTransport>,
    entries: HashMap<String, (Function, Bytes)>,
}

impl ContractCaller {
    fn new(address: Address, abi: &ContractAbi, transport: Arc<dyn CallTransport>) -> Self {
        let entries = abi
            .abi()
            .functions()
            .filter(|f| f.inputs.is_empty())
            .filter(|f| {
                matches!(
                    f.state_mutability,
                    StateMutability::View | StateMutability::Pure
                )
            })
            .map(|f| {
                let calldata = Bytes::from(f.short_signature().to_vec());
                (f.name.clone(), (f.clone(), calldata))
            })
            .collect();

        Self {
            address,
            abi_name: abi.name().to_string(),
            transport,
            entries,
        }
    }

    pub fn has(&self, function: &str) -> bool {
        self.entries.contains_key(function)
    }
}

#[async_trait]
impl ReadAccessor for ContractCaller {
    async fn read(&self, function: &str) -> Result<Vec<Token>> {
        let (resolved, calldata) =
            self.entries
                .get(function)
                .ok_or_else(|| AdapterError::UnknownFunction {
                    abi: self.abi_name.clone(),
                    function: function.to_string(),
                })?;
        let output = self.transport.eth_call(self.address, calldata.clone()).await?;
        decode_output(resolved, &output)
    }
}

/// A function bound to an address but not yet invoked.
///
/// Meant for batching: the pipeline encodes many argument sets into [`Call`]s,
/// runs them through a multicall, and decodes each result here.
#[derive(Clone)]
pub struct BoundFunction {
    address: Address,
    function: Function,
}

impl BoundFunction {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn encode(&self, args: &[Token]) -> Result<Call> {
        let call_data = self.function.encode_input(args)?;
        Ok(Call {
            target: self.address,
            call_data: Bytes::from(call_data),
        })
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        decode_output(&self.function, data)
    }

    /// Decodes a single-address return value, e.g. a batched `getPool` result.
    pub fn decode_address(&self, data: &[u8]) -> Result<Address> {
        decode_address(&self.function.name, self.decode_output(data)?)
    }
}

impl std::fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundFunction")
            .field("address", &self.address)
            .field("function", &self.function.signature())
            .finish()
    }
}

async fn invoke(
    transport: &dyn CallTransport,
    address: Address,
    function: &Function,
    args: &[Token],
) -> Result<Vec<Token>> {
    let calldata = function.encode_input(args)?;
    let output = transport.eth_call(address, Bytes::from(calldata)).await?;
    decode_output(function, &output)
}

fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<Token>> {
    function
        .decode_output(data)
        .map_err(|e| AdapterError::decode(&function.name, e.to_string()))
}

fn first(function: &str, tokens: Vec<Token>) -> Result<Token> {
    tokens
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::decode(function, "empty output"))
}

pub fn decode_address(function: &str, tokens: Vec<Token>) -> Result<Address> {
    first(function, tokens)?
        .into_address()
        .ok_or_else(|| AdapterError::decode(function, "expected address"))
}

pub fn decode_uint(function: &str, tokens: Vec<Token>) -> Result<U256> {
    first(function, tokens)?
        .into_uint()
        .ok_or_else(|| AdapterError::decode(function, "expected unsigned integer"))
}

/// Decodes a `uint24`, the width every fee tier in this family is stored in.
pub fn decode_uint24(function: &str, tokens: Vec<Token>) -> Result<u32> {
    let value = decode_uint(function, tokens)?;
    if value > U256::from(0xFF_FFFFu32) {
        return Err(AdapterError::decode(
            function,
            format!("{} does not fit in uint24", value),
        ));
    }
    Ok(value.as_u32())
}
