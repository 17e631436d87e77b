//! Sync watermark and the lazy walk over the backward-linked slot chain.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::RpcTransport;
use crate::ledger::{ChainSlot, Ledger, LedgerError, LedgerResult};

/// Position of a traversal plus the watermark left by the previous sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Height of the slot most recently visited.
    pub height: u64,
    /// Head height observed when the last successful sync started.
    pub last_update: u64,
}

enum WalkState {
    /// Head already fetched, not yet yielded.
    Head(ChainSlot),
    /// Next height to fetch.
    Fetch(u64),
    Done,
}

/// Finite, non-restartable sequence of slots from the head backwards.
///
/// The head is always yielded. Any later slot that points at itself (the
/// log's genesis) or whose height equals the watermark ends the walk and is
/// not yielded. A fetch error is yielded once, then the walk ends.
pub struct SlotWalker<'a, T> {
    ledger: &'a Ledger<T>,
    watermark: u64,
    delay: Duration,
    state: WalkState,
}

impl<'a, T: RpcTransport> SlotWalker<'a, T> {
    pub fn new(ledger: &'a Ledger<T>, head: ChainSlot, watermark: u64, delay: Duration) -> Self {
        Self {
            ledger,
            watermark,
            delay,
            state: WalkState::Head(head),
        }
    }

    fn after(slot: &ChainSlot) -> LedgerResult<WalkState> {
        if slot.is_terminal() {
            return Ok(WalkState::Done);
        }
        // Pointers must strictly decrease or the walk could cycle.
        if slot.prev_height > slot.height {
            return Err(LedgerError::MalformedSlot {
                height: slot.height,
                reason: format!("prev {} points forward", slot.prev_height),
            });
        }
        Ok(WalkState::Fetch(slot.prev_height))
    }

    /// Advance to the next slot.
    pub async fn next(&mut self) -> Option<LedgerResult<ChainSlot>> {
        let slot = match std::mem::replace(&mut self.state, WalkState::Done) {
            WalkState::Done => return None,
            WalkState::Head(head) => head,
            WalkState::Fetch(height) => {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                match self.ledger.slot(height).await {
                    Ok(slot) if slot.is_terminal() || slot.height == self.watermark => {
                        return None
                    }
                    Ok(slot) => slot,
                    Err(e) => return Some(Err(e)),
                }
            }
        };

        match Self::after(&slot) {
            Ok(state) => {
                self.state = state;
                Some(Ok(slot))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
