//! Signature primitives shared by the verifier and the device-side tooling.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// The exact byte string a device signs: `"{device_id}:{ts}"`, decimal ts.
pub fn signing_message(device_id: &str, ts: i64) -> String {
    format!("{device_id}:{ts}")
}

/// Raw HMAC-SHA256 digest of `message` keyed by the factory secret.
pub fn hmac_digest(secret: &[u8], message: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length; new_from_slice cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Hex signature a correctly behaving device would present. Used by the
/// `sign` CLI verb and by tests.
pub fn sign_hex(secret: &[u8], device_id: &str, ts: i64) -> String {
    hex::encode(hmac_digest(secret, signing_message(device_id, ts).as_bytes()))
}

/// Constant-time byte equality. Does not short-circuit on the first
/// differing byte; a length mismatch is an immediate mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// A fresh device api key: 16 bytes from the OS CSPRNG, hex encoded.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
