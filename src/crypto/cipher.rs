//! ChaCha20-Poly1305 sealing with a trailing nonce.
//!
//! Output layout: `ciphertext || tag (16) || nonce (12)`. The nonce goes last
//! and readers slice it off the end, so the position is part of the wire format.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::types::{CryptoError, CryptoResult, SymmetricKey, NONCE_SIZE, TAG_SIZE};

/// Smallest sealed buffer that can possibly open.
pub const MIN_SEALED_LEN: usize = TAG_SIZE + NONCE_SIZE;

/// Seal `plaintext` under `key` with a fresh random nonce and no associated data.
pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Cipher(format!("seal failed: {}", e)))?;
    sealed.extend_from_slice(&nonce);
    Ok(sealed)
}

/// Open a buffer produced by [`seal`].
///
/// Returns `None` when the tag does not verify; for a candidate key that is
/// the expected outcome, not an error.
pub fn open(key: &SymmetricKey, data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < MIN_SEALED_LEN {
        return None;
    }
    let (body, nonce) = data.split_at(data.len() - NONCE_SIZE);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher.decrypt(Nonce::from_slice(nonce), body).ok()
}
