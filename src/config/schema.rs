//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every section has defaults so a partial file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Local bridge connection and identity.
    pub bridge: BridgeConfig,

    /// Contract and transfer settings.
    pub ledger: LedgerConfig,

    /// Chain traversal settings.
    pub sync: SyncConfig,

    /// Inbox persistence.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bridge host and port (e.g., "localhost:44326").
    pub address: String,

    /// WebSocket path on the bridge.
    pub path: String,

    /// Application name shown to the user when asking for permission.
    pub app_name: String,

    pub app_description: String,

    pub app_url: String,

    /// Upper bound on the wait for any single reply, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum requests per second sent through the bridge.
    pub rate_limit: u32,
}

impl BridgeConfig {
    /// WebSocket endpoint built from address and path.
    pub fn endpoint(&self) -> String {
        format!("ws://{}{}", self.address, self.path)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: "localhost:44326".to_string(),
            path: "/xswd".to_string(),
            app_name: "slotmail".to_string(),
            app_description: "Send messages to one or more users".to_string(),
            app_url: "http://localhost".to_string(),
            request_timeout_secs: 120,
            rate_limit: 10,
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Id of the message-log contract (64 hex characters).
    pub scid: String,

    /// Default ring size for submitted transfers.
    pub ringsize: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            scid: String::new(),
            ringsize: 16,
        }
    }
}

/// How the wallet exports the receiving key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKeyType {
    /// Recovery phrase.
    #[default]
    Mnemonic,
    /// Raw scalar as hex.
    SecretKey,
}

/// Chain traversal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pause between successive slot fetches in milliseconds.
    pub fetch_delay_ms: u64,

    /// Key format requested from the wallet.
    pub key_type: WalletKeyType,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 50,
            key_type: WalletKeyType::Mnemonic,
        }
    }
}

/// Inbox persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding recovered messages and the sync watermark.
    /// `None` keeps the inbox in memory only.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
