//! Request/response seam between the typed ledger accessor and the bridge.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::bridge::types::BridgeResult;

/// Something that can run one JSON-RPC call and hand back its `result`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> BridgeResult<Value>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn call(&self, method: &str, params: Value) -> BridgeResult<Value> {
        (**self).call(method, params).await
    }
}
