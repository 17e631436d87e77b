//! Covert multi-recipient messaging over a ledger's contract storage.

// Wire and crypto core
pub mod codec;
pub mod crypto;

// Ledger access
pub mod bridge;
pub mod ledger;

// Flows
pub mod messaging;
pub mod sync;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use bridge::Bridge;
pub use config::schema::AppConfig;
pub use error::{Error, Result};
pub use ledger::Ledger;
