//! Sync subsystem.
//!
//! # Data Flow
//! ```text
//! slot(0) → head
//!     head.height == last_update → nothing to do
//!     otherwise walk head → prev → … until the sentinel or the watermark:
//!         hex-decode msg → attempt_decrypt → inbox (+ block time)
//!     last_update = head.height
//! ```

pub mod cursor;
pub mod engine;
pub mod store;
pub mod types;

pub use cursor::{SlotWalker, SyncCursor};
pub use engine::SyncEngine;
pub use store::{DecodedMessage, Inbox};
pub use types::{SyncError, SyncResult};
