//! Configuration hashing for change detection.
//!
//! A block's hash is recorded in state after every successful apply; the
//! engine only calls a handler's update when the hash moved.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::spec::BlockConfig;

/// Hasher for computing configuration hashes.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new configuration hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the hash of one block.
    ///
    /// The type and the attribute values participate; the local name does
    /// not, so renaming a block keeps its hash. Object keys are sorted
    /// before hashing.
    #[must_use]
    pub fn hash_block(&self, block: &BlockConfig) -> String {
        let mut hasher = Sha256::new();
        hasher.update(block.type_name.as_bytes());
        hasher.update([0u8]);
        hash_value(&mut hasher, &block.config);
        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two hashes to determine if they are equal.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        if hash1.len() != hash2.len() {
            return false;
        }

        hash1
            .bytes()
            .zip(hash2.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Feeds a tagged, key-sorted encoding of `value` into the hasher.
fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(b) => hasher.update(if *b { b"t" } else { b"f" }),
        Value::Number(n) => {
            hasher.update(b"#");
            hasher.update(n.to_string().as_bytes());
            hasher.update([0u8]);
        }
        Value::String(s) => {
            hasher.update(b"s");
            hasher.update((s.len() as u64).to_be_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for item in items {
                hash_value(hasher, item);
            }
            hasher.update(b"]");
        }
        Value::Object(fields) => {
            let mut keys: Vec<_> = fields.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for key in keys {
                hasher.update((key.len() as u64).to_be_bytes());
                hasher.update(key.as_bytes());
                hash_value(hasher, &fields[key.as_str()]);
            }
            hasher.update(b"}");
        }
    }
}
