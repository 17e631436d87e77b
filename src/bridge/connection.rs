//! Persistent WebSocket connection to the local permissioned bridge.
//!
//! # Responsibilities
//! - Connect and authorize the application with one identity frame
//! - Run the read loop that feeds the single-slot handoff
//! - Serialize request/response pairs: one request in flight per bridge
//! - Bound every wait and surface `Timeout` instead of hanging

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::bridge::handoff::{handoff, HandoffRx, HandoffTx};
use crate::bridge::throttle::RequestThrottle;
use crate::bridge::transport::RpcTransport;
use crate::bridge::types::{AppInfo, AuthResponse, BridgeError, BridgeResult, RpcRequest, RpcResponse};
use crate::config::BridgeConfig;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observability::metrics;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

fn transport(e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Transport(e.to_string())
}

/// Everything a request needs exclusive access to.
struct Link {
    sink: WsSink,
    replies: HandoffRx,
    throttle: RequestThrottle,
}

/// Authorized bridge connection.
///
/// The reply handoff has no request matching, so the whole write-then-wait
/// sequence runs under `link`. Concurrent callers queue on that lock.
pub struct Bridge {
    link: Mutex<Link>,
    shutdown: Shutdown,
    frames_dropped: Arc<AtomicU64>,
    request_timeout: Duration,
    reader: Mutex<Option<JoinHandle<()>>>,
    endpoint: String,
}

impl Bridge {
    /// Connect, authorize and start the read loop.
    pub async fn connect(config: &BridgeConfig) -> BridgeResult<Self> {
        let endpoint = config.endpoint();
        let request_timeout = Duration::from_secs(config.request_timeout_secs);

        tracing::info!(endpoint = %endpoint, "Connecting to bridge");
        let (ws, _) = timeout(request_timeout, connect_async(endpoint.as_str()))
            .await
            .map_err(|_| BridgeError::Timeout(request_timeout))?
            .map_err(|e| BridgeError::Transport(format!("connect to {}: {}", endpoint, e)))?;
        let (mut sink, mut source) = ws.split();

        let app = AppInfo::new(&config.app_name, &config.app_description, &config.app_url);
        authorize(&mut sink, &mut source, &app, request_timeout).await?;

        let (tx, rx) = handoff();
        let shutdown = Shutdown::new();
        let frames_dropped = Arc::new(AtomicU64::new(0));
        let reader = tokio::spawn(read_loop(
            source,
            tx,
            shutdown.subscribe(),
            frames_dropped.clone(),
        ));

        Ok(Self {
            link: Mutex::new(Link {
                sink,
                replies: rx,
                throttle: RequestThrottle::new(config.rate_limit),
            }),
            shutdown,
            frames_dropped,
            request_timeout,
            reader: Mutex::new(Some(reader)),
            endpoint,
        })
    }

    /// Send one request and wait for the next reply frame.
    pub async fn request(&self, method: &str, params: Value) -> BridgeResult<Value> {
        if self.shutdown.is_triggered() {
            return Err(BridgeError::Closed);
        }

        let start = Instant::now();
        let result = self.round_trip(method, params).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(BridgeError::NoPermissionOrEmptyResult(_)) => "denied",
            Err(BridgeError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };
        metrics::record_bridge_request(method, outcome, start);
        result
    }

    async fn round_trip(&self, method: &str, params: Value) -> BridgeResult<Value> {
        let mut link = self.link.lock().await;
        link.throttle.acquire().await;

        let stale = link.replies.drain_stale();
        if stale > 0 {
            tracing::warn!(count = stale, "Discarded unsolicited bridge frames");
            count_dropped(&self.frames_dropped, stale as u64);
        }

        let frame = serde_json::to_string(&RpcRequest::new(method, params))?;
        link.sink.send(Message::text(frame)).await.map_err(transport)?;
        tracing::debug!(method = %method, "Bridge request sent");

        let raw = link.replies.next(self.request_timeout).await?;
        let response: RpcResponse = serde_json::from_str(&raw)?;
        response.into_result(method)
    }

    /// Close the connection. Any waiter is released with [`BridgeError::Closed`].
    pub async fn close(&self) {
        self.shutdown.trigger();
        if let Some(reader) = self.reader.lock().await.take() {
            let _ = reader.await;
        }
        let mut link = self.link.lock().await;
        let _ = link.sink.close().await;
        tracing::info!(endpoint = %self.endpoint, "Bridge closed");
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Frames the read loop or a request discarded without delivering.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for Bridge {
    async fn call(&self, method: &str, params: Value) -> BridgeResult<Value> {
        self.request(method, params).await
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.request_timeout.as_secs())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn count_dropped(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
    metrics::record_frames_dropped(n);
}

async fn authorize(
    sink: &mut WsSink,
    source: &mut WsSource,
    app: &AppInfo,
    wait: Duration,
) -> BridgeResult<AuthResponse> {
    tracing::debug!(app = %app.name, "Requesting bridge authorization");
    let frame = serde_json::to_string(app)?;
    sink.send(Message::text(frame)).await.map_err(transport)?;

    let reply = timeout(wait, next_data_frame(source))
        .await
        .map_err(|_| BridgeError::Timeout(wait))??;
    let auth: AuthResponse = serde_json::from_str(&reply)?;

    if !auth.accepted {
        let reason = if auth.message.is_empty() {
            "authorization failed".to_string()
        } else {
            auth.message
        };
        return Err(BridgeError::AuthorizationDenied(reason));
    }

    tracing::info!(message = %auth.message, "Bridge authorized application");
    Ok(auth)
}

/// Next text or binary frame, skipping control frames.
async fn next_data_frame(source: &mut WsSource) -> BridgeResult<String> {
    while let Some(message) = source.next().await {
        match message.map_err(transport)? {
            Message::Text(text) => return Ok(text.as_str().to_owned()),
            Message::Binary(bytes) => {
                return String::from_utf8(bytes.to_vec())
                    .map_err(|e| BridgeError::Protocol(e.to_string()))
            }
            Message::Close(_) => return Err(BridgeError::Closed),
            _ => continue,
        }
    }
    Err(BridgeError::Closed)
}

/// Forward every inbound text frame to the handoff until the connection
/// ends or shutdown is triggered. Other data frames are counted and dropped.
async fn read_loop(
    mut source: WsSource,
    tx: HandoffTx,
    mut shutdown: ShutdownSignal,
    dropped: Arc<AtomicU64>,
) {
    loop {
        let next = tokio::select! {
            _ = shutdown.recv() => break,
            next = source.next() => next,
        };

        let frame = match next {
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!("Bridge connection closed by peer");
                break;
            }
            Some(Ok(_)) => {
                tracing::trace!("Dropped non-text bridge frame");
                count_dropped(&dropped, 1);
                continue;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Bridge read failed");
                break;
            }
        };

        tokio::select! {
            _ = shutdown.recv() => break,
            delivered = tx.deliver(frame) => {
                if !delivered {
                    break;
                }
            }
        }
    }
    tracing::debug!("Bridge read loop stopped");
}
