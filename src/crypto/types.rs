//! Crypto-specific constants, key material and error definitions.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a compressed curve point in bytes.
pub const POINT_SIZE: usize = 33;

/// Size of a compressed curve point once hex encoded.
pub const POINT_HEX_LEN: usize = POINT_SIZE * 2;

/// Size of the symmetric key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of the AEAD nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Smallest plaintext (after marker insertion) that may be sealed.
pub const MIN_PLAINTEXT_LEN: usize = 28;

/// Errors that can occur while sealing or opening messages.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A recipient key is missing, malformed or not a curve point.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// A derived point did not compress to the expected size.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The plaintext is below the sealing floor.
    #[error("Message is too short: {actual} bytes, need at least {min}")]
    MessageTooShort { actual: usize, min: usize },

    /// The AEAD primitive rejected the operation.
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// The owned private key could not be decoded.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// A 256-bit AEAD key, derived as SHA-256 of a compressed point.
///
/// Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Avoid logging or persisting the returned bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CryptoError::MessageTooShort { actual: 12, min: 28 };
        assert_eq!(
            err.to_string(),
            "Message is too short: 12 bytes, need at least 28"
        );

        let err = CryptoError::InvalidRecipient("bogus".to_string());
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_symmetric_key_debug_is_redacted() {
        let key = SymmetricKey::from_bytes([7u8; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "SymmetricKey([REDACTED])");
    }

    #[test]
    fn test_symmetric_key_zeroize() {
        let mut key = SymmetricKey::from_bytes([7u8; KEY_SIZE]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_SIZE]);
    }
}
