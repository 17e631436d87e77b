//! Bridge envelopes and error definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// JSON-RPC protocol version sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id carried by every request. The bridge never varies it, so
/// replies cannot be matched to requests by id.
pub const REQUEST_ID: &str = "0";

/// Errors that can occur while talking to the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Connection or IO failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The bridge refused the application at handshake.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The reply carried no result; the user declined the call.
    #[error("No permission or empty result for {0}")]
    NoPermissionOrEmptyResult(String),

    /// No reply within the configured bound.
    #[error("Bridge request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection is closed. Terminal; do not retry on this instance.
    #[error("Bridge closed")]
    Closed,

    /// A frame could not be encoded or decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Protocol(e.to_string())
    }
}

/// Identity frame sent once at connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

impl AppInfo {
    /// The id is the hex SHA-256 of the application name.
    pub fn new(name: &str, description: &str, url: &str) -> Self {
        Self {
            id: hex::encode(Sha256::digest(name.as_bytes())),
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
        }
    }
}

/// The single frame the bridge answers the handshake with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub accepted: bool,
    #[serde(default)]
    pub message: String,
}

/// Outbound request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: String,
}

impl RpcRequest {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: REQUEST_ID.to_string(),
        }
    }
}

/// Inbound reply envelope. Only `result` carries meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl RpcResponse {
    /// Extract the result, treating an absent or null one as a refusal.
    pub fn into_result(self, method: &str) -> BridgeResult<Value> {
        match self.result {
            Some(result) if !result.is_null() => Ok(result),
            _ => {
                if let Some(error) = &self.error {
                    tracing::debug!(method = %method, error = %error, "Bridge reply carried an error");
                }
                Err(BridgeError::NoPermissionOrEmptyResult(method.to_string()))
            }
        }
    }
}
