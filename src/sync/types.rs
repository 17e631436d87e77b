//! Sync error definitions.

use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A slot fetch or parse failed. The watermark was left unchanged.
    #[error("Sync aborted: {0}")]
    Ledger(#[from] LedgerError),
}

pub type SyncResult<T> = Result<T, SyncError>;
