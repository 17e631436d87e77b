//! Sync engine: walks the slot chain and trial-decrypts each payload.

use std::time::Duration;

use crate::bridge::RpcTransport;
use crate::crypto::{attempt_decrypt, PrivateKey};
use crate::ledger::{ChainSlot, Ledger};
use crate::observability::metrics;
use crate::sync::cursor::SlotWalker;
use crate::sync::store::{DecodedMessage, Inbox};
use crate::sync::types::SyncResult;

/// Recovers messages addressed to one private key.
pub struct SyncEngine<'a, T> {
    ledger: &'a Ledger<T>,
    key: &'a PrivateKey,
    fetch_delay: Duration,
}

/// Slot text as stored: hex of the `+`-joined blobs.
fn slot_text(slot: &ChainSlot) -> Option<String> {
    let raw = hex::decode(&slot.msg).ok()?;
    String::from_utf8(raw).ok()
}

impl<'a, T: RpcTransport> SyncEngine<'a, T> {
    pub fn new(ledger: &'a Ledger<T>, key: &'a PrivateKey, fetch_delay: Duration) -> Self {
        Self {
            ledger,
            key,
            fetch_delay,
        }
    }

    /// Walk from the head back to the watermark, adding recovered messages
    /// to `inbox`. Returns how many new messages were added.
    ///
    /// The watermark only moves when the whole walk succeeds, so a failed
    /// sync can simply be retried.
    pub async fn sync(&self, inbox: &mut Inbox) -> SyncResult<usize> {
        let head = self.ledger.slot(0).await?;
        let watermark = inbox.cursor().last_update;
        if head.height == watermark {
            tracing::debug!(height = head.height, "Already synced");
            return Ok(0);
        }

        let start = head.height;
        tracing::info!(head = start, watermark, "Sync started");

        let mut walker = SlotWalker::new(self.ledger, head, watermark, self.fetch_delay);
        let mut added = 0;
        while let Some(slot) = walker.next().await {
            let slot = slot?;
            inbox.cursor_mut().height = slot.height;
            metrics::record_slot_visited();

            let Some(text) = slot_text(&slot) else {
                tracing::warn!(height = slot.height, "Slot payload is not hex text, skipping");
                continue;
            };
            let recovered = attempt_decrypt(&text, self.key);
            if recovered.is_empty() {
                continue;
            }

            let approximate_time = match self.ledger.block_timestamp(slot.height).await {
                Ok(time) => Some(time),
                Err(e) => {
                    tracing::warn!(height = slot.height, error = %e, "Block time unavailable");
                    None
                }
            };

            for plaintext in recovered {
                let message = DecodedMessage {
                    plaintext,
                    source_height: slot.height,
                    approximate_time,
                };
                if inbox.insert(message) {
                    added += 1;
                }
            }
            tracing::debug!(height = slot.height, total = added, "Recovered messages from slot");
        }

        inbox.cursor_mut().last_update = start;
        metrics::record_messages_recovered(added);
        tracing::info!(added, last_update = start, "Sync finished");
        Ok(added)
    }
}
