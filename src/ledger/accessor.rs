//! Typed access to the daemon and wallet methods reachable over the bridge.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::bridge::{BridgeError, RpcTransport};
use crate::ledger::types::*;

/// Ledger view bound to one message-log contract.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    transport: T,
    scid: String,
}

fn params<P: Serialize>(method: &'static str, value: &P) -> LedgerResult<Value> {
    serde_json::to_value(value).map_err(|e| LedgerError::MalformedReply {
        method,
        reason: e.to_string(),
    })
}

impl<T: RpcTransport> Ledger<T> {
    pub fn new(transport: T, scid: impl Into<String>) -> Self {
        Self {
            transport,
            scid: scid.into(),
        }
    }

    pub fn scid(&self) -> &str {
        &self.scid
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<P, R>(&self, method: &'static str, request: &P) -> LedgerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let result = self.transport.call(method, params(method, request)?).await?;
        serde_json::from_value(result).map_err(|e| LedgerError::MalformedReply {
            method,
            reason: e.to_string(),
        })
    }

    /// Read the slot stored at `height`. Zero reads the current head.
    pub async fn slot(&self, height: u64) -> LedgerResult<ChainSlot> {
        let request = GetScParams {
            scid: self.scid.clone(),
            code: false,
            variables: false,
            topoheight: height,
            keysstring: SLOT_KEYS.iter().map(|k| k.to_string()).collect(),
        };
        let result: GetScResult = self.call(methods::GET_SC, &request).await?;
        ChainSlot::from_values(height, &result.valuesstring)
    }

    /// Timestamp of the block at `height`.
    pub async fn block_timestamp(&self, height: u64) -> LedgerResult<DateTime<Utc>> {
        let result: GetBlockResult = self
            .call(methods::GET_BLOCK, &GetBlockParams { height })
            .await?;
        let millis = i64::try_from(result.block_header.timestamp).map_err(|e| {
            LedgerError::MalformedReply {
                method: methods::GET_BLOCK,
                reason: e.to_string(),
            }
        })?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| LedgerError::MalformedReply {
                method: methods::GET_BLOCK,
                reason: format!("timestamp {} out of range", millis),
            })
    }

    /// One random ring member, used as the carrier transfer destination.
    pub async fn random_address(&self) -> LedgerResult<String> {
        let request = GetRandomAddressParams {
            scid: ZERO_HASH.to_string(),
        };
        let result: GetRandomAddressResult = self.call(methods::GET_RANDOM_ADDRESS, &request).await?;
        result
            .address
            .into_iter()
            .find(|a| !a.is_empty())
            .ok_or(LedgerError::NoDestination)
    }

    /// Resolve a registered name to its address at the latest height.
    pub async fn name_to_address(&self, name: &str) -> LedgerResult<String> {
        let request = NameToAddressParams {
            name: name.to_string(),
            topoheight: -1,
        };
        let result: NameToAddressResult = match self.call(methods::NAME_TO_ADDRESS, &request).await {
            Ok(r) => r,
            Err(LedgerError::Bridge(BridgeError::NoPermissionOrEmptyResult(_))) => {
                return Err(LedgerError::UnknownName(name.to_string()))
            }
            Err(e) => return Err(e),
        };
        if result.address.is_empty() {
            return Err(LedgerError::UnknownName(name.to_string()));
        }
        Ok(result.address)
    }

    pub async fn estimate_gas(&self, request: &TransferParams) -> LedgerResult<GasEstimateResult> {
        self.call(methods::GET_GAS_ESTIMATE, request).await
    }

    /// Submit a transfer through the wallet. Returns the transaction id.
    pub async fn transfer(&self, request: &TransferParams) -> LedgerResult<String> {
        let result: TransferResult = self.call(methods::TRANSFER, request).await?;
        if result.txid.is_empty() {
            return Err(LedgerError::MalformedReply {
                method: methods::TRANSFER,
                reason: "empty txid".to_string(),
            });
        }
        Ok(result.txid)
    }

    /// Ask the wallet for key material of `key_type`.
    pub async fn query_key(&self, key_type: &str) -> LedgerResult<String> {
        let request = QueryKeyParams {
            key_type: key_type.to_string(),
        };
        let result: QueryKeyResult = self.call(methods::QUERY_KEY, &request).await?;
        Ok(result.key)
    }
}
