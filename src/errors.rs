use ethers::types::Address;
use thiserror::Error;

/// Errors surfaced by exchange adapters and the helpers around them.
///
/// RPC and decoding failures are propagated unchanged to the caller; nothing in
/// this crate retries or suppresses them.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("RPC call to {target:?} failed: {reason}")]
    Rpc { target: Address, reason: String },
    #[error("Failed to decode `{function}` output: {reason}")]
    Decode { function: String, reason: String },
    #[error("ABI error: {0}")]
    Abi(#[from] ethers::abi::Error),
    #[error("Invalid ABI `{name}`: {reason}")]
    InvalidAbi { name: String, reason: String },
    #[error("ABI `{0}` is not registered")]
    UnknownAbi(String),
    #[error("Function `{function}` not found in ABI `{abi}`")]
    UnknownFunction { abi: String, function: String },
    #[error("Event `{event}` not found in ABI `{abi}`")]
    UnknownEvent { abi: String, event: String },
    #[error("Unknown exchange base `{0}`")]
    UnknownExchange(String),
    #[error("{exchange} does not support {operation}")]
    Unsupported {
        exchange: String,
        operation: &'static str,
    },
    #[error("Invalid address `{0}`")]
    InvalidAddress(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn decode(function: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::Decode {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// True for failures raised by the transport rather than by local decoding.
    pub fn is_rpc(&self) -> bool {
        matches!(self, AdapterError::Rpc { .. })
    }
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;
