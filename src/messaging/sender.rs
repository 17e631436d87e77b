//! Recipient resolution, sealing and the contract invocation that stores a blob.

use crate::bridge::RpcTransport;
use crate::codec::MIN_BLOB_LEN;
use crate::crypto::{self, CryptoError, PublicKey, SealedMessage};
use crate::ledger::types::{Argument, Transfer, ZERO_HASH};
use crate::ledger::{ring_fee, Address, Ledger, LedgerError, TransferParams};
use crate::messaging::types::{MessagingError, MessagingResult, SendReceipt};

/// Contract entrypoint that appends a slot.
pub const STORE_ENTRYPOINT: &str = "Store";

/// Parse a recipient given directly: a ledger address or a hex compressed key.
pub fn parse_recipient(entry: &str) -> Option<PublicKey> {
    let entry = entry.trim();
    entry
        .parse::<Address>()
        .map(Address::into_public_key)
        .ok()
        .or_else(|| PublicKey::from_hex(entry).ok())
}

/// Builds and submits message transactions against one contract.
pub struct MessageSender<'a, T> {
    ledger: &'a Ledger<T>,
}

impl<'a, T: RpcTransport> MessageSender<'a, T> {
    pub fn new(ledger: &'a Ledger<T>) -> Self {
        Self { ledger }
    }

    /// Turn user-supplied recipients into public keys.
    ///
    /// Each entry is a ledger address, a hex compressed key, or a registered
    /// name. Names that do not resolve to a valid address are dropped with a
    /// warning.
    pub async fn resolve_recipients<S: AsRef<str>>(
        &self,
        entries: &[S],
    ) -> MessagingResult<Vec<PublicKey>> {
        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.as_ref().trim();
            if let Some(key) = parse_recipient(entry) {
                keys.push(key);
                continue;
            }

            match self.ledger.name_to_address(entry).await {
                Ok(address) => match parse_recipient(&address) {
                    Some(key) => keys.push(key),
                    None => tracing::warn!(name = %entry, address = %address, "Registered address is invalid, dropping"),
                },
                Err(LedgerError::UnknownName(_)) => {
                    tracing::warn!(name = %entry, "Recipient not found, dropping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if keys.is_empty() {
            return Err(CryptoError::InvalidRecipient("no valid recipients".to_string()).into());
        }
        Ok(keys)
    }

    /// Seal `plaintext` for `recipients`. Purely local.
    pub fn seal(&self, recipients: &[PublicKey], plaintext: &str) -> MessagingResult<SealedMessage> {
        Ok(crypto::seal(recipients, plaintext)?)
    }

    /// Store `blob` in a new slot. Returns the transaction id.
    ///
    /// The invocation rides on a zero-amount transfer to a random ledger
    /// address; fees are the storage gas plus the ring-size fee.
    pub async fn submit(&self, blob: &str, ringsize: u64) -> MessagingResult<String> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(MessagingError::BlobTooShort {
                actual: blob.len(),
                min: MIN_BLOB_LEN,
            });
        }
        let ring = ring_fee(ringsize).ok_or(LedgerError::InvalidRingsize(ringsize))?;

        let destination = self.ledger.random_address().await?;
        let mut params = TransferParams {
            transfers: vec![Transfer {
                scid: ZERO_HASH.to_string(),
                destination,
                amount: 0,
                burn: 0,
                payload_rpc: Vec::new(),
            }],
            sc_rpc: vec![
                Argument::string("entrypoint", STORE_ENTRYPOINT),
                Argument::string("data", blob),
                Argument::uint64("SC_ACTION", 0),
                Argument::hash("SC_ID", self.ledger.scid()),
            ],
            ringsize,
            ..Default::default()
        };

        let gas = self.ledger.estimate_gas(&params).await?;
        params.fees = gas.gasstorage + ring;
        tracing::debug!(
            gas_storage = gas.gasstorage,
            gas_compute = gas.gascompute,
            fees = params.fees,
            ringsize,
            "Gas estimated"
        );

        let txid = self.ledger.transfer(&params).await?;
        tracing::info!(txid = %txid, blob_len = blob.len(), "Message submitted");
        Ok(txid)
    }

    /// Resolve, seal and submit in one go.
    pub async fn send<S: AsRef<str>>(
        &self,
        recipients: &[S],
        plaintext: &str,
        ringsize: u64,
    ) -> MessagingResult<SendReceipt> {
        let keys = self.resolve_recipients(recipients).await?;
        let sealed = self.seal(&keys, plaintext)?;
        let txid = self.submit(&sealed.blob.encode(), ringsize).await?;
        Ok(SendReceipt {
            txid,
            plaintext: sealed.plaintext,
            recipients: keys.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeError;
    use crate::crypto::{attempt_decrypt, PrivateKey};
    use crate::ledger::Network;
    use crate::ledger::accessor::tests::FakeTransport;
    use crate::ledger::types::{methods, DataType};
    use serde_json::json;

    const SCID: &str = "5cd4ab1ec4e0b3a3b1a0c9d1e7f6a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8";
    const TEXT: &str = "the drop point moved to the east gate";

    fn sender_ledger() -> Ledger<FakeTransport> {
        Ledger::new(FakeTransport::default(), SCID)
    }

    #[test]
    fn test_parse_recipient() {
        let key = PrivateKey::random().public_key();
        let address = Address::new(Network::Mainnet, key.clone()).to_string();
        assert_eq!(parse_recipient(&address), Some(key.clone()));
        assert_eq!(parse_recipient(&format!(" {} ", key.to_hex())), Some(key));
        assert_eq!(parse_recipient("bob"), None);
        assert_eq!(parse_recipient("dero1alice"), None);
    }

    #[tokio::test]
    async fn test_resolve_keys_addresses_and_names() {
        let ledger = sender_ledger();
        let alice = PrivateKey::random().public_key();
        let bob = PrivateKey::random().public_key();
        let erin = PrivateKey::random().public_key();
        ledger.transport().reply(
            methods::NAME_TO_ADDRESS,
            Ok(json!({"name": "bob", "address": Address::new(Network::Mainnet, bob.clone()).to_string()})),
        );
        ledger.transport().reply(
            methods::NAME_TO_ADDRESS,
            Ok(json!({"name": "carol", "address": "dero1notanaddress"})),
        );

        let erin_address = Address::new(Network::Testnet, erin.clone()).to_string();
        let keys = MessageSender::new(&ledger)
            .resolve_recipients(&[
                alice.to_hex().as_str(),
                "bob",
                "carol",
                "dave",
                erin_address.as_str(),
            ])
            .await
            .unwrap();
        assert_eq!(keys, vec![alice, bob, erin]);
        // Keys and addresses never hit the name service.
        let looked_up: Vec<_> = ledger
            .transport()
            .calls_to(methods::NAME_TO_ADDRESS)
            .iter()
            .map(|p| p["name"].clone())
            .collect();
        assert_eq!(looked_up, vec![json!("bob"), json!("carol"), json!("dave")]);
    }

    #[tokio::test]
    async fn test_resolve_nothing_is_invalid_recipient() {
        let ledger = sender_ledger();
        let err = MessageSender::new(&ledger)
            .resolve_recipients(&["ghost"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MessagingError::Crypto(CryptoError::InvalidRecipient(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_propagates_transport_failure() {
        let ledger = sender_ledger();
        ledger
            .transport()
            .reply(methods::NAME_TO_ADDRESS, Err(BridgeError::Closed));
        let err = MessageSender::new(&ledger)
            .resolve_recipients(&["bob"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MessagingError::Ledger(LedgerError::Bridge(BridgeError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_submit_builds_invocation() {
        let ledger = sender_ledger();
        let recipient = PrivateKey::random();
        ledger.transport().reply(
            methods::GET_RANDOM_ADDRESS,
            Ok(json!({"address": ["dero1carrier"]})),
        );
        ledger.transport().reply(
            methods::GET_GAS_ESTIMATE,
            Ok(json!({"gascompute": 1200, "gasstorage": 345, "status": "OK"})),
        );
        ledger
            .transport()
            .reply(methods::TRANSFER, Ok(json!({"txid": "c0ffee"})));

        let sender = MessageSender::new(&ledger);
        let sealed = sender.seal(&[recipient.public_key()], TEXT).unwrap();
        let blob = sealed.blob.encode();
        let txid = sender.submit(&blob, 16).await.unwrap();
        assert_eq!(txid, "c0ffee");

        let estimate = &ledger.transport().calls_to(methods::GET_GAS_ESTIMATE)[0];
        assert_eq!(estimate["fees"], json!(0));
        let transfer: TransferParams =
            serde_json::from_value(ledger.transport().calls_to(methods::TRANSFER)[0].clone())
                .unwrap();
        assert_eq!(transfer.fees, 345 + 80);
        assert_eq!(transfer.ringsize, 16);
        assert_eq!(transfer.transfers.len(), 1);
        assert_eq!(transfer.transfers[0].destination, "dero1carrier");
        assert_eq!(transfer.transfers[0].amount, 0);
        assert_eq!(transfer.transfers[0].scid, ZERO_HASH);

        let names: Vec<_> = transfer.sc_rpc.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["entrypoint", "data", "SC_ACTION", "SC_ID"]);
        assert_eq!(transfer.sc_rpc[0].value, json!("Store"));
        assert_eq!(transfer.sc_rpc[3].datatype, DataType::Hash);
        assert_eq!(transfer.sc_rpc[3].value, json!(SCID));

        // The stored data is what the recipient will read back.
        let stored = transfer.sc_rpc[1].value.as_str().unwrap();
        assert_eq!(attempt_decrypt(stored, &recipient), vec![sealed.plaintext]);
    }

    #[tokio::test]
    async fn test_submit_validates_before_network() {
        let ledger = sender_ledger();
        let sender = MessageSender::new(&ledger);

        let err = sender.submit("abc", 16).await.unwrap_err();
        assert!(matches!(err, MessagingError::BlobTooShort { actual: 3, .. }));

        let blob = "0".repeat(MIN_BLOB_LEN);
        let err = sender.submit(&blob, 3).await.unwrap_err();
        assert!(matches!(
            err,
            MessagingError::Ledger(LedgerError::InvalidRingsize(3))
        ));
        assert!(ledger.transport().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_destination() {
        let ledger = sender_ledger();
        ledger
            .transport()
            .reply(methods::GET_RANDOM_ADDRESS, Ok(json!({"address": []})));
        let blob = "0".repeat(MIN_BLOB_LEN);
        let err = MessageSender::new(&ledger).submit(&blob, 16).await.unwrap_err();
        assert!(matches!(err, MessagingError::Ledger(LedgerError::NoDestination)));
        assert!(ledger.transport().calls_to(methods::TRANSFER).is_empty());
    }

    #[tokio::test]
    async fn test_send_end_to_end() {
        let ledger = sender_ledger();
        let a = PrivateKey::random();
        let b = PrivateKey::random();
        ledger.transport().reply(
            methods::GET_RANDOM_ADDRESS,
            Ok(json!({"address": ["dero1carrier"]})),
        );
        ledger
            .transport()
            .reply(methods::GET_GAS_ESTIMATE, Ok(json!({"gasstorage": 10})));
        ledger
            .transport()
            .reply(methods::TRANSFER, Ok(json!({"txid": "feed"})));

        let receipt = MessageSender::new(&ledger)
            .send(&[a.public_key().to_hex(), b.public_key().to_hex()], TEXT, 2)
            .await
            .unwrap();
        assert_eq!(receipt.txid, "feed");
        assert_eq!(receipt.recipients, 2);
        assert!(receipt.plaintext.contains(crate::crypto::marker::MARKER));

        let transfer = &ledger.transport().calls_to(methods::TRANSFER)[0];
        assert_eq!(transfer["fees"], json!(10 + 40));
    }
}
