//! Wire codec for slot payloads.
//!
//! Pure text encoding, no cryptography. Point segments are checked for shape
//! (length, hex) here; whether they are valid curve points is decided by the
//! crypto engine.

pub mod blob;

pub use blob::{join_messages, split_messages, CodecError, CodecResult, EncryptedBlob, MIN_BLOB_LEN};
