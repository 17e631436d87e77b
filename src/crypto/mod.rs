//! Encryption engine.
//!
//! # Data Flow
//! ```text
//! send:    recipients → engine.rs (ephemeral + commitments)
//!              → marker.rs (tag plaintext) → cipher.rs (AEAD seal)
//!              → codec::EncryptedBlob
//! receive: slot value → codec (split, parse) → engine.rs (trial keys)
//!              → cipher.rs (AEAD open) → marker.rs (accept)
//! ```
//!
//! # Security Constraints
//! - Ephemeral scalars live only for the duration of one send
//! - The owned private key is held immutably for the process lifetime
//! - Keys and plaintext are never logged

pub mod cipher;
pub mod engine;
pub mod keys;
pub mod marker;
pub mod types;

pub use engine::{attempt_decrypt, encode_and_authenticate, generate_send_secrets, seal, SealedMessage};
pub use keys::{HexSecretDecoder, KeyDecoder, MnemonicDecoder, PrivateKey, PublicKey};
pub use types::{CryptoError, CryptoResult, SymmetricKey};
