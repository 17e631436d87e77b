//! Ledger access over the bridge.
//!
//! The message log lives in one contract's storage as a chain of slots.
//! Each slot carries its `height`, a `prev` pointer to the slot before it
//! and the `msg` payload. The genesis slot, written when the contract is
//! installed, points to itself and ends every walk.

pub mod accessor;
pub mod address;
pub mod types;

pub use accessor::Ledger;
pub use address::{Address, Network};
pub use types::{ring_fee, ChainSlot, LedgerError, LedgerResult, TransferParams, RING_FEES};
