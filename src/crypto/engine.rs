//! Multi-recipient sealing and trial decryption.
//!
//! # Scheme
//! ```text
//! send:    k, s random;  X = k·G;  Y = s·G
//!          C_i = Y + k·P_i          (one per recipient, in order)
//!          key = SHA-256(Y)
//! receive: S_i = C_i − x·X          (x = own private scalar)
//!          candidate key = SHA-256(S_i); open, then require the marker
//! ```
//!
//! Recipients are not tagged in the blob, so a receiver tries every
//! commitment. A failed tag check just means "not for us".

use k256::{ProjectivePoint, SecretKey};
use rand::rngs::OsRng;

use crate::codec::{split_messages, EncryptedBlob};
use crate::crypto::cipher;
use crate::crypto::keys::{compress, decompress, derive_key, PrivateKey, PublicKey};
use crate::crypto::marker::{has_marker, insert_marker};
use crate::crypto::types::{
    CryptoError, CryptoResult, SymmetricKey, MIN_PLAINTEXT_LEN, POINT_SIZE,
};

/// Per-send key material. The ephemeral scalars never leave
/// [`generate_send_secrets`].
#[derive(Debug)]
pub struct SendSecrets {
    /// `X = k·G`, compressed.
    pub ephemeral: [u8; POINT_SIZE],
    /// `C_i = Y + k·P_i`, compressed, in recipient order.
    pub commitments: Vec<[u8; POINT_SIZE]>,
    /// `SHA-256(Y)`.
    pub key: SymmetricKey,
}

/// Output of [`encode_and_authenticate`].
#[derive(Debug, Clone)]
pub struct Sealed {
    /// `ciphertext || tag || nonce`.
    pub ciphertext: Vec<u8>,
    /// The plaintext actually sealed, marker included.
    pub plaintext: String,
}

/// A message ready to be stored in a slot.
#[derive(Debug, Clone)]
pub struct SealedMessage {
    pub blob: EncryptedBlob,
    pub plaintext: String,
}

/// Generate the ephemeral key, base secret and one commitment per recipient.
pub fn generate_send_secrets(recipients: &[PublicKey]) -> CryptoResult<SendSecrets> {
    if recipients.is_empty() {
        return Err(CryptoError::InvalidRecipient(
            "at least one recipient is required".to_string(),
        ));
    }

    // Both secrets are zeroized when they go out of scope.
    let k = SecretKey::random(&mut OsRng);
    let s = SecretKey::random(&mut OsRng);
    let k_scalar = *k.to_nonzero_scalar();

    let x = ProjectivePoint::GENERATOR * k_scalar;
    let y = ProjectivePoint::GENERATOR * *s.to_nonzero_scalar();

    let ephemeral = compress(&x)?;
    let commitments = recipients
        .iter()
        .map(|recipient| compress(&(y + recipient.to_projective() * k_scalar)))
        .collect::<CryptoResult<Vec<_>>>()?;

    Ok(SendSecrets {
        ephemeral,
        commitments,
        key: derive_key(&y)?,
    })
}

/// Add the marker if needed, enforce the length floor and seal.
pub fn encode_and_authenticate(plaintext: &str, key: &SymmetricKey) -> CryptoResult<Sealed> {
    let plaintext = insert_marker(plaintext, &mut OsRng);
    if plaintext.len() < MIN_PLAINTEXT_LEN {
        return Err(CryptoError::MessageTooShort {
            actual: plaintext.len(),
            min: MIN_PLAINTEXT_LEN,
        });
    }

    let ciphertext = cipher::seal(key, plaintext.as_bytes())?;
    Ok(Sealed {
        ciphertext,
        plaintext,
    })
}

/// Seal `plaintext` for every recipient into a single blob.
pub fn seal(recipients: &[PublicKey], plaintext: &str) -> CryptoResult<SealedMessage> {
    let secrets = generate_send_secrets(recipients)?;
    let sealed = encode_and_authenticate(plaintext, &secrets.key)?;
    let blob = EncryptedBlob::new(secrets.ephemeral, secrets.commitments, sealed.ciphertext)
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    Ok(SealedMessage {
        blob,
        plaintext: sealed.plaintext,
    })
}

/// Try to open one blob with every commitment it carries.
fn open_blob(blob: &EncryptedBlob, own: &PrivateKey) -> Option<String> {
    let ephemeral = decompress(blob.ephemeral()).ok()?;
    let commitments = blob
        .commitments()
        .iter()
        .map(|c| decompress(c))
        .collect::<CryptoResult<Vec<_>>>()
        .ok()?;

    let blinding = ephemeral * own.scalar();
    for commitment in commitments {
        let Ok(candidate) = derive_key(&(commitment - blinding)) else {
            continue;
        };
        let Some(plain) = cipher::open(&candidate, blob.sealed()) else {
            continue;
        };
        if has_marker(&plain) {
            return Some(String::from_utf8_lossy(&plain).into_owned());
        }
    }
    None
}

/// Recover every message in a slot value addressed to `own`.
///
/// Best effort: malformed blobs and foreign commitments are skipped silently.
pub fn attempt_decrypt(slot_blob: &str, own: &PrivateKey) -> Vec<String> {
    split_messages(slot_blob)
        .filter_map(|raw| EncryptedBlob::decode(raw).ok())
        .filter_map(|blob| open_blob(&blob, own))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::join_messages;
    use crate::crypto::marker::MARKER;
    use crate::crypto::types::{NONCE_SIZE, TAG_SIZE};

    const FORTY: &str = "meet me by the old mill at nine tonight!";

    #[test]
    fn test_rejects_empty_recipients() {
        assert!(matches!(
            generate_send_secrets(&[]),
            Err(CryptoError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn test_secrets_shape() {
        let a = PrivateKey::random().public_key();
        let b = PrivateKey::random().public_key();
        let secrets = generate_send_secrets(&[a.clone(), b, a]).unwrap();
        assert_eq!(secrets.commitments.len(), 3);
        // Same recipient twice still gets the same commitment.
        assert_eq!(secrets.commitments[0], secrets.commitments[2]);
        assert_ne!(secrets.commitments[0], secrets.commitments[1]);
    }

    #[test]
    fn test_message_too_short() {
        let key = SymmetricKey::from_bytes([1u8; 32]);
        // "<marker>\nhi" is 23 bytes.
        match encode_and_authenticate("hi", &key) {
            Err(CryptoError::MessageTooShort { actual, min }) => {
                assert_eq!(actual, MARKER.len() + 3);
                assert_eq!(min, MIN_PLAINTEXT_LEN);
            }
            other => panic!("expected MessageTooShort, got {:?}", other),
        }

        // Seven more bytes cross the floor.
        let sealed = encode_and_authenticate("hi12345", &key).unwrap();
        assert_eq!(sealed.plaintext.len(), MIN_PLAINTEXT_LEN);
    }

    #[test]
    fn test_scenario_two_recipients() {
        let alice = PrivateKey::random();
        let bob = PrivateKey::random();
        let carol = PrivateKey::random();
        assert_eq!(FORTY.len(), 40);

        let sealed = seal(&[alice.public_key(), bob.public_key()], FORTY).unwrap();
        let encoded = sealed.blob.encode();

        let (keys, payload) = encoded.split_once('x').unwrap();
        assert_eq!(encoded.matches('x').count(), 1);
        assert_eq!(keys.len(), 3 * 66);
        let sealed_len = hex::decode(payload).unwrap().len();
        assert!(sealed_len >= FORTY.len() + TAG_SIZE + NONCE_SIZE);

        assert!(sealed.plaintext.contains(MARKER));
        assert_eq!(sealed.plaintext.replace(&format!(" {} ", MARKER), " "), FORTY);

        assert_eq!(attempt_decrypt(&encoded, &alice), vec![sealed.plaintext.clone()]);
        assert_eq!(attempt_decrypt(&encoded, &bob), vec![sealed.plaintext.clone()]);
        assert!(attempt_decrypt(&encoded, &carol).is_empty());
    }

    #[test]
    fn test_single_recipient_roundtrip() {
        let me = PrivateKey::random();
        let text = format!("already tagged {} so keep it verbatim", MARKER);
        let sealed = seal(&[me.public_key()], &text).unwrap();
        assert_eq!(sealed.plaintext, text);
        assert_eq!(attempt_decrypt(&sealed.blob.encode(), &me), vec![text]);
    }

    #[test]
    fn test_multiple_messages_in_one_slot() {
        let me = PrivateKey::random();
        let other = PrivateKey::random();

        let mine = seal(&[me.public_key()], "first note for me, long enough to seal").unwrap();
        let theirs = seal(&[other.public_key()], "note for someone else entirely, sorry").unwrap();
        let also_mine = seal(
            &[other.public_key(), me.public_key()],
            "second note shared by both of us here",
        )
        .unwrap();

        let slot = join_messages(&[
            mine.blob.encode(),
            "garbage".to_string(),
            theirs.blob.encode(),
            also_mine.blob.encode(),
        ]);
        assert_eq!(
            attempt_decrypt(&slot, &me),
            vec![mine.plaintext, also_mine.plaintext]
        );
    }

    #[test]
    fn test_open_without_marker_is_rejected() {
        let me = PrivateKey::random();
        let secrets = generate_send_secrets(&[me.public_key()]).unwrap();
        // Seal directly, bypassing marker insertion.
        let ciphertext = cipher::seal(&secrets.key, b"no marker in this plaintext at all").unwrap();
        let blob = EncryptedBlob::new(secrets.ephemeral, secrets.commitments, ciphertext).unwrap();
        assert!(attempt_decrypt(&blob.encode(), &me).is_empty());
    }

    #[test]
    fn test_invalid_points_are_skipped() {
        let me = PrivateKey::random();
        let sealed = seal(&[me.public_key()], FORTY).unwrap();
        let mut encoded = sealed.blob.encode();
        // Turn the commitment's SEC1 tag into an invalid one.
        encoded.replace_range(66..68, "05");
        assert!(attempt_decrypt(&encoded, &me).is_empty());
    }
}
