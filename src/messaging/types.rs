//! Send path results and errors.

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Refused locally, before any request is made.
    #[error("Blob too short: {actual} characters (minimum {min})")]
    BlobTooShort { actual: usize, min: usize },
}

pub type MessagingResult<T> = Result<T, MessagingError>;

/// Outcome of a successful send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub txid: String,
    /// What the recipients will read, marker included.
    pub plaintext: String,
    pub recipients: usize,
}
