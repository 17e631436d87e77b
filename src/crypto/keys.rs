//! Long-lived key material and point encoding helpers.
//!
//! # Security
//! - The owned private key is decoded once and never serialized
//! - `Debug` output of private keys is redacted

use bip39::{Language, Mnemonic};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, ProjectivePoint, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::types::{CryptoError, CryptoResult, SymmetricKey, POINT_SIZE};

/// Compress a point to its 33-byte SEC1 form.
///
/// The identity compresses to a single byte and is rejected.
pub fn compress(point: &ProjectivePoint) -> CryptoResult<[u8; POINT_SIZE]> {
    let encoded = AffinePoint::from(*point).to_encoded_point(true);
    let bytes = encoded.as_bytes();
    <[u8; POINT_SIZE]>::try_from(bytes).map_err(|_| {
        CryptoError::Encoding(format!(
            "point compressed to {} bytes, expected {}",
            bytes.len(),
            POINT_SIZE
        ))
    })
}

/// Decompress a 33-byte point, validating that it lies on the curve.
pub fn decompress(bytes: &[u8]) -> CryptoResult<ProjectivePoint> {
    PublicKey::from_compressed(bytes).map(|key| key.to_projective())
}

/// Derive the AEAD key shared through `point`.
pub fn derive_key(point: &ProjectivePoint) -> CryptoResult<SymmetricKey> {
    let compressed = compress(point)?;
    Ok(SymmetricKey::from_bytes(Sha256::digest(compressed).into()))
}

/// A recipient's public key (a validated, non-identity curve point).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Parse a compressed point given as raw bytes.
    pub fn from_compressed(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != POINT_SIZE {
            return Err(CryptoError::InvalidRecipient(format!(
                "expected {} byte compressed point, got {} bytes",
                POINT_SIZE,
                bytes.len()
            )));
        }
        // SEC1 also admits 33-byte compact (0x05) points; only 0x02/0x03 are compressed.
        if !matches!(bytes[0], 0x02 | 0x03) {
            return Err(CryptoError::InvalidRecipient(format!(
                "tag {:#04x} is not a compressed point",
                bytes[0]
            )));
        }
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidRecipient("not a valid curve point".to_string()))
    }

    /// Parse a hex-encoded compressed point (with or without 0x prefix).
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let trimmed = s.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(key_hex)
            .map_err(|e| CryptoError::InvalidRecipient(format!("'{}': {}", trimmed, e)))?;
        Self::from_compressed(&bytes)
    }

    pub fn to_projective(&self) -> ProjectivePoint {
        self.0.to_projective()
    }

    pub fn to_compressed(&self) -> [u8; POINT_SIZE] {
        let mut out = [0u8; POINT_SIZE];
        out.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The recipient's long-lived private scalar.
///
/// Zeroized on drop by the underlying [`SecretKey`].
#[derive(Clone)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Parse a 32-byte big-endian scalar given as hex.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let trimmed = s.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(key_hex)
            .map_err(|e| CryptoError::InvalidPrivateKey(format!("invalid hex: {}", e)))?;
        SecretKey::from_slice(&bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPrivateKey("scalar out of range".to_string()))
    }

    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self(SecretKey::random(&mut rand::rngs::OsRng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    pub(crate) fn scalar(&self) -> k256::Scalar {
        *self.0.to_nonzero_scalar()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// Turns the string a wallet hands out for a key query into a private key.
pub trait KeyDecoder: Send + Sync {
    /// The `key_type` to ask the wallet for.
    fn key_type(&self) -> &str;

    fn decode(&self, raw: &str) -> CryptoResult<PrivateKey>;
}

/// Decoder for wallets that export the raw secret scalar as hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexSecretDecoder;

impl KeyDecoder for HexSecretDecoder {
    fn key_type(&self) -> &str {
        "secret_key"
    }

    fn decode(&self, raw: &str) -> CryptoResult<PrivateKey> {
        PrivateKey::from_hex(raw)
    }
}

/// Number of words in a wallet recovery phrase (256 bits of entropy).
pub const MNEMONIC_WORDS: usize = 24;

/// Decoder for wallets that export their recovery phrase.
///
/// The phrase is BIP-39 English; its 32 bytes of entropy are the scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct MnemonicDecoder;

impl KeyDecoder for MnemonicDecoder {
    fn key_type(&self) -> &str {
        "mnemonic"
    }

    fn decode(&self, raw: &str) -> CryptoResult<PrivateKey> {
        let words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        if words.len() != MNEMONIC_WORDS {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected {} words, got {}",
                MNEMONIC_WORDS,
                words.len()
            )));
        }
        let phrase = Zeroizing::new(words.join(" "));
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &phrase)
            .map_err(|e| CryptoError::InvalidPrivateKey(format!("bad recovery phrase: {}", e)))?;
        let entropy = Zeroizing::new(mnemonic.to_entropy());
        SecretKey::from_slice(&entropy)
            .map(PrivateKey)
            .map_err(|_| CryptoError::InvalidPrivateKey("scalar out of range".to_string()))
    }
}
