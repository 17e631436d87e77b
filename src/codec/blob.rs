//! Printable blob layout.
//!
//! ```text
//! hex(X) ‖ hex(C_1) ‖ … ‖ hex(C_n) ‖ 'x' ‖ hex(ciphertext ‖ tag ‖ nonce)
//! ```
//!
//! Every point segment is exactly 66 hex characters; `x` never occurs in hex
//! so it is a self-describing delimiter. Several blobs share one slot joined
//! by `+`.

use thiserror::Error;

use crate::crypto::cipher::MIN_SEALED_LEN;
use crate::crypto::types::{POINT_HEX_LEN, POINT_SIZE};

/// Separator between the key segments and the ciphertext.
pub const DELIMITER: char = 'x';

/// Separator between independent blobs stored in one slot.
pub const SEPARATOR: char = '+';

/// Shortest well-formed blob: ephemeral key, one commitment, delimiter and
/// the smallest sealed buffer.
pub const MIN_BLOB_LEN: usize = 2 * POINT_HEX_LEN + 1 + 2 * MIN_SEALED_LEN;

/// Errors produced while parsing blobs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed blob: {0}")]
    MalformedBlob(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::MalformedBlob(reason.into())
}

/// One sealed message: the ephemeral point, the ordered recipient
/// commitments and the sealed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    ephemeral: [u8; POINT_SIZE],
    commitments: Vec<[u8; POINT_SIZE]>,
    sealed: Vec<u8>,
}

impl EncryptedBlob {
    pub fn new(
        ephemeral: [u8; POINT_SIZE],
        commitments: Vec<[u8; POINT_SIZE]>,
        sealed: Vec<u8>,
    ) -> CodecResult<Self> {
        if commitments.is_empty() {
            return Err(malformed("at least one commitment is required"));
        }
        if sealed.len() < MIN_SEALED_LEN {
            return Err(malformed(format!(
                "sealed payload is {} bytes, need at least {}",
                sealed.len(),
                MIN_SEALED_LEN
            )));
        }
        Ok(Self {
            ephemeral,
            commitments,
            sealed,
        })
    }

    pub fn ephemeral(&self) -> &[u8; POINT_SIZE] {
        &self.ephemeral
    }

    /// Commitments in recipient order.
    pub fn commitments(&self) -> &[[u8; POINT_SIZE]] {
        &self.commitments
    }

    /// Ciphertext, tag and trailing nonce.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(
            (1 + self.commitments.len()) * POINT_HEX_LEN + 1 + self.sealed.len() * 2,
        );
        out.push_str(&hex::encode(self.ephemeral));
        for commitment in &self.commitments {
            out.push_str(&hex::encode(commitment));
        }
        out.push(DELIMITER);
        out.push_str(&hex::encode(&self.sealed));
        out
    }

    /// Parse a single blob. Nothing is returned unless every check passes.
    pub fn decode(s: &str) -> CodecResult<Self> {
        if s.len() < MIN_BLOB_LEN {
            return Err(malformed(format!(
                "{} characters, need at least {}",
                s.len(),
                MIN_BLOB_LEN
            )));
        }

        let delimiters = s.matches(DELIMITER).count();
        if delimiters != 1 {
            return Err(malformed(format!("{} delimiters, expected 1", delimiters)));
        }
        let (keys, payload) = s
            .split_once(DELIMITER)
            .ok_or_else(|| malformed("missing delimiter"))?;

        if keys.len() % POINT_HEX_LEN != 0 {
            return Err(malformed(format!(
                "delimiter at offset {}, not a multiple of {}",
                keys.len(),
                POINT_HEX_LEN
            )));
        }
        let segments = keys.len() / POINT_HEX_LEN;
        if segments < 2 {
            return Err(malformed(format!(
                "{} point segments, need at least 2",
                segments
            )));
        }

        let mut points = Vec::with_capacity(segments);
        for i in 0..segments {
            let segment = keys
                .get(i * POINT_HEX_LEN..(i + 1) * POINT_HEX_LEN)
                .ok_or_else(|| malformed(format!("segment {} is not ASCII", i)))?;
            let mut point = [0u8; POINT_SIZE];
            hex::decode_to_slice(segment, &mut point)
                .map_err(|e| malformed(format!("segment {}: {}", i, e)))?;
            points.push(point);
        }

        let sealed = hex::decode(payload).map_err(|e| malformed(format!("payload: {}", e)))?;

        let ephemeral = points.remove(0);
        Self::new(ephemeral, points, sealed)
    }
}

/// Split a slot value into its independent blobs.
pub fn split_messages(slot: &str) -> impl Iterator<Item = &str> {
    slot.split(SEPARATOR)
}

/// Join encoded blobs into one slot value.
pub fn join_messages<S: AsRef<str>>(blobs: &[S]) -> String {
    let mut out = String::new();
    for (i, blob) in blobs.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(blob.as_ref());
    }
    out
}
