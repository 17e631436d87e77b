//! Transport bridge subsystem.
//!
//! # Data Flow
//! ```text
//! connect → identity frame → {accepted, message}
//!
//! request(method, params):
//!     lock link → throttle → write envelope
//!         → wait on handoff (bounded) → parse envelope → result
//!
//! read loop (background task):
//!     inbound text frame → handoff (single slot)
//!     anything else      → dropped + counted
//! ```
//!
//! # Concurrency
//! Replies are matched to requests purely by order. One request may be in
//! flight per bridge; the link mutex enforces it.

pub mod connection;
pub mod handoff;
pub mod throttle;
pub mod transport;
pub mod types;

pub use connection::Bridge;
pub use transport::RpcTransport;
pub use types::{AppInfo, BridgeError, BridgeResult};
