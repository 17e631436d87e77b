//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Connect bridge → Query wallet key
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C or Bridge::close → Shutdown::trigger
//!         → read loop exits → waiters get BridgeError::Closed
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
