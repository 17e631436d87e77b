//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or defaults when none is given
//!     → loader.rs (parse, SLOTMAIL_SCID override)
//!     → validation.rs (every problem reported at once)
//!     → AppConfig, read-only for the rest of the process
//! ```
//!
//! Every field has a default, so an empty file is a valid file.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, BridgeConfig, LedgerConfig, ObservabilityConfig, StoreConfig, SyncConfig,
    WalletKeyType,
};
