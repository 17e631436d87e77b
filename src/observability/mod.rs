//! Logging and metrics.
//!
//! # Data Flow
//! ```text
//! bridge   → request outcome + latency, dropped frames
//! sync     → slots visited, messages recovered
//! all      → tracing events → fmt layer (stderr)
//!          → Prometheus scrape endpoint when enabled
//! ```
//!
//! Keys and plaintext never reach a log line or a metric label.

pub mod logging;
pub mod metrics;
