//! Ledger RPC payloads, chain slot model and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::bridge::BridgeError;

/// Daemon and wallet method names.
pub mod methods {
    pub const GET_BLOCK: &str = "DERO.GetBlock";
    pub const GET_SC: &str = "DERO.GetSC";
    pub const GET_RANDOM_ADDRESS: &str = "DERO.GetRandomAddress";
    pub const GET_GAS_ESTIMATE: &str = "DERO.GetGasEstimate";
    pub const NAME_TO_ADDRESS: &str = "DERO.NameToAddress";
    pub const QUERY_KEY: &str = "QueryKey";
    pub const TRANSFER: &str = "transfer";
}

/// The all-zero hash, used as the native asset id.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Contract storage keys read for every slot, in response order.
pub const SLOT_KEYS: [&str; 3] = ["height", "prev", "msg"];

/// Base fee per supported ring size, added on top of the storage gas.
pub const RING_FEES: [(u64, u64); 7] = [
    (2, 40),
    (4, 60),
    (8, 60),
    (16, 80),
    (32, 100),
    (64, 120),
    (128, 180),
];

/// Fee for `ringsize`, if it is supported.
pub fn ring_fee(ringsize: u64) -> Option<u64> {
    RING_FEES
        .iter()
        .find(|(size, _)| *size == ringsize)
        .map(|(_, fee)| *fee)
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// A reply did not have the expected shape.
    #[error("Malformed reply for {method}: {reason}")]
    MalformedReply { method: &'static str, reason: String },

    /// Slot values could not be parsed (including the backward pointer).
    #[error("Malformed slot at height {height}: {reason}")]
    MalformedSlot { height: u64, reason: String },

    #[error("Unsupported ring size {0}")]
    InvalidRingsize(u64),

    /// Text that is not a well-formed ledger address.
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The ledger offered no address for the carrier transfer.
    #[error("No destination address available for transfer")]
    NoDestination,

    #[error("Name '{0}' is not registered")]
    UnknownName(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// One record of the on-ledger message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSlot {
    pub height: u64,
    /// Backward pointer. Equal to `height` on the terminal slot.
    pub prev_height: u64,
    /// Raw `msg` value as stored (hex of the slot text).
    pub msg: String,
}

impl ChainSlot {
    /// Parse the `[height, prev, msg]` values returned for [`SLOT_KEYS`].
    /// `requested` is only used for error context.
    pub fn from_values(requested: u64, values: &[String]) -> LedgerResult<Self> {
        let malformed = |reason: String| LedgerError::MalformedSlot {
            height: requested,
            reason,
        };

        let [height, prev, msg] = values else {
            return Err(malformed(format!("expected 3 values, got {}", values.len())));
        };
        let height = height
            .parse::<u64>()
            .map_err(|e| malformed(format!("height '{}': {}", height, e)))?;
        let prev_height = prev
            .parse::<u64>()
            .map_err(|e| malformed(format!("prev '{}': {}", prev, e)))?;
        if msg.is_empty() {
            return Err(malformed("empty msg".to_string()));
        }

        Ok(Self {
            height,
            prev_height,
            msg: msg.clone(),
        })
    }

    /// The self-referencing slot that starts the log.
    pub fn is_terminal(&self) -> bool {
        self.height == self.prev_height
    }
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetScParams {
    pub scid: String,
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub variables: bool,
    /// Zero means "latest" and is left out of the request.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub topoheight: u64,
    #[serde(default)]
    pub keysstring: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetScResult {
    #[serde(default)]
    pub valuesstring: Vec<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockParams {
    pub height: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub topoheight: i64,
    #[serde(default)]
    pub hash: String,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetBlockResult {
    #[serde(default)]
    pub block_header: BlockHeader,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameToAddressParams {
    pub name: String,
    pub topoheight: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameToAddressResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRandomAddressParams {
    pub scid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRandomAddressResult {
    #[serde(default)]
    pub address: Vec<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryKeyParams {
    pub key_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryKeyResult {
    pub key: String,
}

/// Type tag of a contract call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "U")]
    Uint64,
    #[serde(rename = "H")]
    Hash,
}

/// A named, typed contract call argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub datatype: DataType,
    pub value: Value,
}

impl Argument {
    pub fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            datatype: DataType::String,
            value: Value::from(value),
        }
    }

    pub fn uint64(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            datatype: DataType::Uint64,
            value: Value::from(value),
        }
    }

    pub fn hash(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            datatype: DataType::Hash,
            value: Value::from(value),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transfer {
    pub scid: String,
    pub destination: String,
    pub amount: u64,
    pub burn: u64,
    #[serde(default)]
    pub payload_rpc: Vec<Argument>,
}

/// Parameters shared by the gas estimate and the transfer itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferParams {
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub sc: String,
    #[serde(default)]
    pub sc_value: u64,
    #[serde(default)]
    pub scid: String,
    #[serde(default)]
    pub sc_rpc: Vec<Argument>,
    pub ringsize: u64,
    pub fees: u64,
    #[serde(default)]
    pub signer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GasEstimateResult {
    #[serde(default)]
    pub gascompute: u64,
    #[serde(default)]
    pub gasstorage: u64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferResult {
    #[serde(default)]
    pub txid: String,
}
