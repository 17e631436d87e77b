//! Single-slot handoff between the read loop and the waiting caller.
//!
//! Replies carry no usable correlation id, so whoever waits on the handoff
//! takes the next frame. Write-then-wait must therefore happen under one lock;
//! see the tests for what goes wrong otherwise.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::bridge::types::{BridgeError, BridgeResult};

/// Create a connected handoff pair holding at most one pending frame.
pub fn handoff() -> (HandoffTx, HandoffRx) {
    let (tx, rx) = mpsc::channel(1);
    (HandoffTx(tx), HandoffRx(rx))
}

/// Read-loop side.
#[derive(Debug, Clone)]
pub struct HandoffTx(mpsc::Sender<String>);

impl HandoffTx {
    /// Blocks while the slot is occupied. Returns false once the receiver is gone.
    pub async fn deliver(&self, frame: String) -> bool {
        self.0.send(frame).await.is_ok()
    }
}

/// Caller side.
#[derive(Debug)]
pub struct HandoffRx(mpsc::Receiver<String>);

impl HandoffRx {
    /// Wait up to `wait` for the next frame.
    pub async fn next(&mut self, wait: Duration) -> BridgeResult<String> {
        match timeout(wait, self.0.recv()).await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(BridgeError::Closed),
            Err(_) => Err(BridgeError::Timeout(wait)),
        }
    }

    /// Discard frames nobody asked for, such as a reply that arrived after
    /// its request timed out. Returns how many were discarded.
    pub fn drain_stale(&mut self) -> usize {
        let mut drained = 0;
        while self.0.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}
