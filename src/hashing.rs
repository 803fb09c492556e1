//! Hashing System - MD5 for Identicons, SHA-256 for Manifests
//!
//! Provides the deterministic digest the whole pipeline is seeded from,
//! plus reproducible hashes for manifests.

use md5::Md5;
use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

/// Expand an input byte string into its MD5 digest bytes.
///
/// Every downstream stage (color, grid) reads from this sequence. Same
/// input, same bytes, always.
pub fn expand_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    result.to_vec()
}

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Hex-encode digest bytes for manifests and filenames
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// Compute manifest hash for a rendered identicon
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_digest_deterministic() {
        let d1 = expand_digest(b"banana");
        let d2 = expand_digest(b"banana");
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 16);
    }

    #[test]
    fn test_digest_reference_vector() {
        // MD5("hello world!") = fc3ff98e8c6a0d3087d515c0473f8677
        let digest = expand_digest(b"hello world!");
        assert_eq!(encode_hex(&digest), "fc3ff98e8c6a0d3087d515c0473f8677");
    }

    #[test]
    fn test_empty_input_digests() {
        let digest = expand_digest(b"");
        assert_eq!(digest.len(), 16);
        assert_eq!(encode_hex(&digest), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_manifest_hash_stable() {
        let manifest = json!({
            "input": "hello world!",
            "engine_version": "1.0.0"
        });
        let h1 = compute_manifest_hash(&manifest).unwrap();
        let h2 = compute_manifest_hash(&manifest).unwrap();
        assert_eq!(h1, h2);
    }
}
