//! Crate-level error aggregating every subsystem's error type.

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::crypto::CryptoError;
use crate::ledger::LedgerError;
use crate::messaging::MessagingError;
use crate::sync::SyncError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Send error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
