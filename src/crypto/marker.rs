//! Marker token embedded in every sealed plaintext.
//!
//! A successful AEAD open is only accepted when the plaintext carries the
//! marker. When the sender did not type it, it is spliced in at a random word
//! boundary instead of always leading the message.

use rand::Rng;

/// Token that every accepted plaintext must contain.
pub const MARKER: &str = "<SLOTMAIL ENCRYPTED>";

/// Whether `plaintext` carries the marker.
pub fn has_marker(plaintext: &[u8]) -> bool {
    let needle = MARKER.as_bytes();
    plaintext.windows(needle.len()).any(|w| w == needle)
}

/// Candidate insertion points: every space except a trailing one.
fn boundaries(msg: &str) -> Vec<usize> {
    let trailing = msg.len().checked_sub(1);
    msg.bytes()
        .enumerate()
        .filter(|&(i, b)| b == b' ' && Some(i) != trailing)
        .map(|(i, _)| i)
        .collect()
}

/// Return `msg` with the marker added, unless it is already present.
///
/// With at least two interior spaces the space at a uniformly chosen boundary
/// is replaced by ` MARKER `. Otherwise the marker is prepended on its own line.
pub fn insert_marker<R: Rng + ?Sized>(msg: &str, rng: &mut R) -> String {
    if has_marker(msg.as_bytes()) {
        return msg.to_string();
    }

    let candidates = boundaries(msg);
    if candidates.len() < 2 {
        return format!("{}\n{}", MARKER, msg);
    }

    let pos = candidates[rng.gen_range(0..candidates.len())];
    format!("{} {} {}", &msg[..pos], MARKER, &msg[pos + 1..])
}
