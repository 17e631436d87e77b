//! Ledger addresses.
//!
//! An address is bech32 text: a network prefix, then a version byte followed
//! by the owner's 33-byte compressed public key.
//!
//! ```text
//! dero1qy…   mainnet
//! deto1qy…   testnet
//! ```

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};

use crate::crypto::PublicKey;
use crate::crypto::types::POINT_SIZE;
use crate::ledger::types::LedgerError;

/// Version byte of a plain (non-integrated) address.
const ADDRESS_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "dero",
            Network::Testnet => "deto",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "dero" => Some(Network::Mainnet),
            "deto" => Some(Network::Testnet),
            _ => None,
        }
    }
}

/// A validated ledger address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    network: Network,
    key: PublicKey,
}

impl Address {
    pub fn new(network: Network, key: PublicKey) -> Self {
        Self { network, key }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    pub fn into_public_key(self) -> PublicKey {
        self.key
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| LedgerError::InvalidAddress {
            address: s.to_string(),
            reason,
        };

        let (hrp, data) = bech32::decode(s.trim()).map_err(|e| invalid(e.to_string()))?;
        let network = Network::from_prefix(&hrp.to_lowercase())
            .ok_or_else(|| invalid(format!("unknown prefix '{}'", hrp)))?;

        match data.split_first() {
            Some((&ADDRESS_VERSION, key)) if key.len() == POINT_SIZE => {
                let key = PublicKey::from_compressed(key).map_err(|e| invalid(e.to_string()))?;
                Ok(Self { network, key })
            }
            Some((&ADDRESS_VERSION, key)) => Err(invalid(format!(
                "payload carries {} key bytes, expected {}",
                key.len(),
                POINT_SIZE
            ))),
            Some((version, _)) => Err(invalid(format!("unsupported version {}", version))),
            None => Err(invalid("empty payload".to_string())),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(1 + POINT_SIZE);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.key.to_compressed());

        let hrp = Hrp::parse_unchecked(self.network.prefix());
        let text = bech32::encode::<Bech32>(hrp, &payload).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
