use ethers::abi::{Function, Param, ParamType, StateMutability, Token};
use ethers::types::{Address, Bytes};
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::errors::{AdapterError, Result};
use crate::transport::CallTransport;

/// Upper bound on calls per `aggregate3`; larger batches get rejected by most providers.
pub const MAX_BATCH_SIZE: usize = 200;

/// A single contract call to be batched in a multicall.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    /// Target contract address
    pub target: Address,
    /// Encoded function call data
    pub call_data: Bytes,
}

#[allow(deprecated)]
static AGGREGATE3: Lazy<Function> = Lazy::new(|| Function {
    name: "aggregate3".to_string(),
    inputs: vec![Param {
        name: "calls".to_string(),
        kind: ParamType::Array(Box::new(ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::Bool,
            ParamType::Bytes,
        ]))),
        internal_type: None,
    }],
    outputs: vec![Param {
        name: "returnData".to_string(),
        kind: ParamType::Array(Box::new(ParamType::Tuple(vec![
            ParamType::Bool,
            ParamType::Bytes,
        ]))),
        internal_type: None,
    }],
    constant: None,
    state_mutability: StateMutability::Payable,
});

/// Multicall3 batch executor.
///
/// Identical calls are coalesced before sending and results come back in the
/// order the calls were given. Every sub-call is sent with `allowFailure`; a
/// failed sub-call yields empty bytes, which then fails to decode on its own
/// without taking the rest of the batch down.
///
/// ```rust,ignore
/// let multicall = Multicall::new(transport, multicall_address, 100);
/// let calls = vec![get_pool.encode(&args)?, /* ... */];
/// let results = multicall.run(calls).await?;
/// ```
#[derive(Clone)]
pub struct Multicall {
    transport: Arc<dyn CallTransport>,
    multicall_address: Address,
    batch_size: usize,
}

impl Multicall {
    pub fn new(
        transport: Arc<dyn CallTransport>,
        multicall_address: Address,
        batch_size: usize,
    ) -> Self {
        if batch_size > MAX_BATCH_SIZE {
            warn!(
                "Batch size {} exceeds recommended maximum ({}), capping",
                batch_size, MAX_BATCH_SIZE
            );
        }
        Self {
            transport,
            multicall_address,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs `calls` and returns one result per call, in input order.
    pub async fn run(&self, calls: Vec<Call>) -> Result<Vec<Bytes>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        // Coalesce identical calls to reduce load
        let mut unique_calls = IndexMap::new();
        let mut original_indices = vec![0; calls.len()];
        for (i, call) in calls.iter().enumerate() {
            let (index, _) = unique_calls.insert_full((call.target, call.call_data.clone()), ());
            original_indices[i] = index;
        }

        let unique_call_vec: Vec<_> = unique_calls
            .into_keys()
            .map(|(target, call_data)| Call { target, call_data })
            .collect();
        debug!(
            "Multicall coalesced {} calls into {}",
            calls.len(),
            unique_call_vec.len()
        );

        let mut all_results_unique: Vec<Bytes> = Vec::with_capacity(unique_call_vec.len());
        for call_chunk in unique_call_vec.chunks(self.batch_size) {
            let return_data = self.execute_aggregate3(call_chunk).await?;
            if return_data.len() != call_chunk.len() {
                return Err(AdapterError::decode(
                    "aggregate3",
                    format!("{} results for {} calls", return_data.len(), call_chunk.len()),
                ));
            }
            all_results_unique.extend(return_data);
        }

        // Reconstruct the full result set in the original order
        Ok(original_indices
            .into_iter()
            .map(|index| all_results_unique[index].clone())
            .collect())
    }

    async fn execute_aggregate3(&self, calls: &[Call]) -> Result<Vec<Bytes>> {
        // Call3 struct: (address target, bool allowFailure, bytes callData)
        let call_tokens = calls
            .iter()
            .map(|call| {
                Token::Tuple(vec![
                    Token::Address(call.target),
                    Token::Bool(true),
                    Token::Bytes(call.call_data.to_vec()),
                ])
            })
            .collect();

        let calldata = AGGREGATE3.encode_input(&[Token::Array(call_tokens)])?;
        let response = self
            .transport
            .eth_call(self.multicall_address, Bytes::from(calldata))
            .await?;

        let results_array = AGGREGATE3
            .decode_output(&response)
            .map_err(|e| AdapterError::decode("aggregate3", e.to_string()))?
            .into_iter()
            .next()
            .and_then(|t| t.into_array())
            .ok_or_else(|| AdapterError::decode("aggregate3", "invalid response format"))?;

        // Result struct: (bool success, bytes returnData)
        results_array
            .into_iter()
            .map(|result_token| match result_token {
                Token::Tuple(tuple) => match tuple.as_slice() {
                    [Token::Bool(true), Token::Bytes(data)] => Ok(Bytes::from(data.clone())),
                    [Token::Bool(false), _] => Ok(Bytes::new()),
                    _ => Err(AdapterError::decode("aggregate3", "malformed result tuple")),
                },
                _ => Err(AdapterError::decode("aggregate3", "malformed result tuple")),
            })
            .collect()
    }
}
