//! Loads the receiving private key from the wallet, once per process.
//!
//! # Security
//! - The key is requested through the bridge and never persisted
//! - Raw key material is never logged

use crate::bridge::RpcTransport;
use crate::crypto::{KeyDecoder, PrivateKey};
use crate::ledger::Ledger;
use crate::messaging::types::MessagingResult;

/// Query the wallet for its key and decode it with `decoder`.
pub async fn load_private_key<T, D>(ledger: &Ledger<T>, decoder: &D) -> MessagingResult<PrivateKey>
where
    T: RpcTransport,
    D: KeyDecoder + ?Sized,
{
    let raw = ledger.query_key(decoder.key_type()).await?;
    let key = decoder.decode(raw.trim())?;
    tracing::info!(public_key = %key.public_key(), "Wallet key loaded");
    Ok(key)
}
