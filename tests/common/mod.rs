//! Shared utilities for integration tests: a local mock bridge and an
//! in-memory ledger that answers through it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use slotmail::config::BridgeConfig;

/// What the mock does with one request.
pub enum Reply {
    /// `{"result": value}`
    Result(Value),
    /// An envelope without a result (the user declined).
    NoResult,
    /// Send nothing.
    Silent,
    /// Wait, then reply with a result.
    Delayed(Duration, Value),
    /// A binary frame first, then the result.
    BinaryThen(Value),
    /// Close the connection.
    Close,
}

/// Everything the mock saw.
#[derive(Default)]
pub struct Seen {
    pub handshakes: Vec<Value>,
    pub requests: Vec<Value>,
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

/// Start a mock bridge on an ephemeral port. Each connection is
/// authorized (or refused with `deny`) and then served by `handler`.
pub async fn start_mock_bridge<F>(deny: Option<&'static str>, handler: F) -> (SocketAddr, Arc<Mutex<Seen>>)
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Seen::default()));
    let handler: Arc<Handler> = Arc::new(handler);

    let seen_by_server = seen.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let handler = handler.clone();
            let seen = seen_by_server.clone();
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(socket).await else {
                    return;
                };
                let (mut sink, mut source) = ws.split();

                let Some(Ok(Message::Text(hello))) = source.next().await else {
                    return;
                };
                seen.lock()
                    .unwrap()
                    .handshakes
                    .push(serde_json::from_str(hello.as_str()).unwrap_or(Value::Null));

                let auth = match deny {
                    None => json!({"accepted": true, "message": "ok"}),
                    Some(reason) => json!({"accepted": false, "message": reason}),
                };
                if sink.send(Message::text(auth.to_string())).await.is_err() || deny.is_some() {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }

                while let Some(Ok(frame)) = source.next().await {
                    let Message::Text(text) = frame else {
                        continue;
                    };
                    let request: Value = serde_json::from_str(text.as_str()).unwrap_or(Value::Null);
                    seen.lock().unwrap().requests.push(request.clone());

                    let method = request["method"].as_str().unwrap_or_default().to_string();
                    let envelope = |result: Value| {
                        json!({"jsonrpc": "2.0", "id": "0", "result": result}).to_string()
                    };

                    let outcome = match handler(&method, &request["params"]) {
                        Reply::Result(v) => sink.send(Message::text(envelope(v))).await,
                        Reply::NoResult => {
                            sink.send(Message::text(json!({"jsonrpc": "2.0", "id": "0"}).to_string()))
                                .await
                        }
                        Reply::Silent => Ok(()),
                        Reply::Delayed(wait, v) => {
                            tokio::time::sleep(wait).await;
                            sink.send(Message::text(envelope(v))).await
                        }
                        Reply::BinaryThen(v) => {
                            let _ = sink.send(Message::binary(vec![0xde, 0xad])).await;
                            sink.send(Message::text(envelope(v))).await
                        }
                        Reply::Close => {
                            let _ = sink.send(Message::Close(None)).await;
                            return;
                        }
                    };
                    if outcome.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (addr, seen)
}

/// Bridge settings pointing at a mock, unthrottled.
pub fn bridge_config(addr: SocketAddr, timeout_secs: u64) -> BridgeConfig {
    BridgeConfig {
        address: addr.to_string(),
        request_timeout_secs: timeout_secs,
        rate_limit: 0,
        ..Default::default()
    }
}

/// Height of the self-referencing slot written at contract install.
pub const GENESIS_HEIGHT: u64 = 93;

pub const SCID: &str = "7d3f0c1b9e2a4d5c6b7a8f9e0d1c2b3a4f5e6d7c8b9a0f1e2d3c4b5a69788796";

/// In-memory message log contract plus the wallet and name service
/// around it. Starts with only the genesis slot.
pub struct MockLedger {
    /// `(height, prev, stored text)`, oldest first.
    slots: Vec<(u64, u64, String)>,
    next_height: u64,
    wallet_secret: String,
    names: Vec<(String, String)>,
}

impl MockLedger {
    pub fn new(wallet_secret: &str) -> Self {
        Self {
            slots: vec![(GENESIS_HEIGHT, GENESIS_HEIGHT, "genesis".to_string())],
            next_height: 100,
            wallet_secret: wallet_secret.to_string(),
            names: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, address: &str) {
        self.names.push((name.to_string(), address.to_string()));
    }

    /// Append a slot the way the contract's `Store` entrypoint would.
    pub fn store(&mut self, text: &str) -> u64 {
        let height = self.next_height;
        let prev = self.slots.last().map_or(height, |(h, _, _)| *h);
        self.slots.push((height, prev, text.to_string()));
        self.next_height += 7;
        height
    }

    fn slot_values(&self, height: Option<u64>) -> Option<Value> {
        let slot = match height {
            None => self.slots.last(),
            Some(h) => self.slots.iter().find(|(sh, _, _)| *sh == h),
        }?;
        Some(json!({
            "valuesstring": [slot.0.to_string(), slot.1.to_string(), hex::encode(&slot.2)],
            "status": "OK"
        }))
    }

    pub fn handle(&mut self, method: &str, params: &Value) -> Reply {
        match method {
            "DERO.GetSC" => match self.slot_values(params["topoheight"].as_u64()) {
                Some(v) => Reply::Result(v),
                None => Reply::NoResult,
            },
            "DERO.GetBlock" => {
                let height = params["height"].as_u64().unwrap_or_default();
                Reply::Result(json!({
                    "block_header": {"height": height, "timestamp": 1_700_000_000_000u64 + height * 1000},
                    "status": "OK"
                }))
            }
            "DERO.GetRandomAddress" => Reply::Result(json!({"address": ["dero1qycarrier"], "status": "OK"})),
            "DERO.NameToAddress" => {
                let name = params["name"].as_str().unwrap_or_default();
                match self.names.iter().find(|(n, _)| n == name) {
                    Some((_, address)) => Reply::Result(json!({"name": name, "address": address, "status": "OK"})),
                    None => Reply::NoResult,
                }
            }
            "DERO.GetGasEstimate" => Reply::Result(json!({"gascompute": 900, "gasstorage": 250, "status": "OK"})),
            "QueryKey" => match params["key_type"].as_str() {
                Some("secret_key") => Reply::Result(json!({"key": self.wallet_secret})),
                Some("mnemonic") => {
                    let entropy = hex::decode(&self.wallet_secret).unwrap();
                    let phrase = bip39::Mnemonic::from_entropy(&entropy).unwrap();
                    Reply::Result(json!({"key": phrase.to_string()}))
                }
                _ => Reply::NoResult,
            },
            "transfer" => {
                let data = params["sc_rpc"]
                    .as_array()
                    .and_then(|args| args.iter().find(|a| a["name"] == "data"))
                    .and_then(|a| a["value"].as_str())
                    .map(str::to_string);
                match data {
                    Some(text) => {
                        let height = self.store(&text);
                        Reply::Result(json!({"txid": format!("{:064x}", height)}))
                    }
                    None => Reply::NoResult,
                }
            }
            _ => Reply::NoResult,
        }
    }
}

/// Start a mock bridge backed by `ledger`.
pub async fn start_ledger_bridge(ledger: Arc<Mutex<MockLedger>>) -> (SocketAddr, Arc<Mutex<Seen>>) {
    start_mock_bridge(None, move |method, params| ledger.lock().unwrap().handle(method, params)).await
}
