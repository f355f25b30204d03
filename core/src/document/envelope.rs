//! HMAC-signed payload envelope for the document channel.
//!
//! The mapping `{wid, uid, alg, ts}` is serialized as JSON with keys
//! sorted lexicographically (matching the deterministic-ordering contract
//! of the originating service's `json.dumps(..., sort_keys=True)`), then
//! HMAC-SHA256-signed under the process secret. `sig` is added to the map
//! and the whole thing is re-serialized and base64-encoded. Verification
//! recomputes the signature over the map *without* `sig`, so insertion
//! order after signing is irrelevant.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::config::AuroraaSecret;
use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// A decoded, signature-verified document envelope.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub wid: String,
    pub uid: String,
    pub alg: String,
    pub ts: String,
}

/// Builds and signs an envelope for `(wid, uid, alg, ts)`, returning the
/// base64-encoded `payload_string`.
pub fn build_payload(
    secret: &AuroraaSecret,
    wid: &str,
    uid: &str,
    alg: &str,
    ts: &str,
) -> String {
    let mut fields: BTreeMap<String, Value> = BTreeMap::new();
    fields.insert("alg".to_string(), Value::String(alg.to_string()));
    fields.insert("ts".to_string(), Value::String(ts.to_string()));
    fields.insert("uid".to_string(), Value::String(uid.to_string()));
    fields.insert("wid".to_string(), Value::String(wid.to_string()));

    // serde_json::Map preserves BTreeMap's sorted iteration order when
    // built from a BTreeMap, matching Python's `sort_keys=True`.
    let sorted_json = serde_json::to_string(&fields).expect("map of strings always serializes");
    let sig = hex::encode(hmac_digest(secret, sorted_json.as_bytes()));

    let mut signed: BTreeMap<String, Value> = fields;
    signed.insert("sig".to_string(), Value::String(sig));
    let final_json = serde_json::to_string(&signed).expect("map of strings always serializes");

    BASE64.encode(final_json)
}

/// Decodes and verifies a base64 `payload_string`, checking the HMAC
/// signature, claimed owner, and algorithm version.
pub fn decode_and_verify(
    secret: &AuroraaSecret,
    payload_string: &str,
    expected_owner: &str,
    expected_alg: &str,
) -> Result<Envelope, CoreError> {
    let json_bytes = BASE64
        .decode(payload_string)
        .map_err(|_| CoreError::BadLength("payload was not valid base64".to_string()))?;

    let mut map: BTreeMap<String, Value> = serde_json::from_slice(&json_bytes)
        .map_err(|_| CoreError::BadLength("payload was not valid JSON".to_string()))?;

    let sig_value = map
        .remove("sig")
        .ok_or(CoreError::BadSignature)?;
    let claimed_sig = sig_value.as_str().ok_or(CoreError::BadSignature)?.to_string();

    let unsigned_json = serde_json::to_string(&map).expect("map of strings always serializes");
    let expected_sig = hex::encode(hmac_digest(secret, unsigned_json.as_bytes()));

    if !constant_time_eq(claimed_sig.as_bytes(), expected_sig.as_bytes()) {
        return Err(CoreError::BadSignature);
    }

    let get = |key: &str| -> Result<String, CoreError> {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CoreError::BadLength(format!("envelope missing field `{key}`")))
    };

    let uid = get("uid")?;
    let alg = get("alg")?;
    let wid = get("wid")?;
    let ts = get("ts")?;

    if uid != expected_owner {
        return Err(CoreError::OwnerMismatch);
    }
    if alg != expected_alg {
        return Err(CoreError::VersionMismatch);
    }

    Ok(Envelope { wid, uid, alg, ts })
}

fn hmac_digest(secret: &AuroraaSecret, data: &[u8]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time byte comparison, to avoid leaking signature-match
/// information through branch timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> AuroraaSecret {
        AuroraaSecret::new(vec![1u8; 32]).unwrap()
    }

    #[test]
    fn build_then_verify_roundtrips() {
        let s = secret();
        let payload = build_payload(&s, "wid-1", "u1", "v3-continuous", "2025-07-30T00:00:00Z");
        let env = decode_and_verify(&s, &payload, "u1", "v3-continuous").unwrap();
        assert_eq!(env.wid, "wid-1");
        assert_eq!(env.uid, "u1");
    }

    #[test]
    fn wrong_owner_is_rejected() {
        let s = secret();
        let payload = build_payload(&s, "wid-1", "u1", "v3-continuous", "2025-07-30T00:00:00Z");
        let err = decode_and_verify(&s, &payload, "u2", "v3-continuous").unwrap_err();
        assert!(matches!(err, CoreError::OwnerMismatch));
    }

    #[test]
    fn wrong_algorithm_is_rejected() {
        let s = secret();
        let payload = build_payload(&s, "wid-1", "u1", "v3-continuous", "2025-07-30T00:00:00Z");
        let err = decode_and_verify(&s, &payload, "u1", "v4").unwrap_err();
        assert!(matches!(err, CoreError::VersionMismatch));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let s = secret();
        let mut payload = build_payload(&s, "wid-1", "u1", "v3-continuous", "2025-07-30T00:00:00Z");
        // Flip a character near the end (inside the base64 body, not padding).
        let mut bytes: Vec<u8> = payload.clone().into_bytes();
        let flip_at = bytes.len() / 2;
        bytes[flip_at] = if bytes[flip_at] == b'A' { b'B' } else { b'A' };
        payload = String::from_utf8(bytes).unwrap();
        assert!(decode_and_verify(&s, &payload, "u1", "v3-continuous").is_err());
    }
}
