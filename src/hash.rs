use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Error;

/// SHA-256 hash used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    /// zero hash (useful as sentinel)
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// length of the hex rendering
    pub const HEX_LEN: usize = 64;

    /// create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// parse from hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidHashHex(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidHashHex(s.to_string()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// abbreviated hex form for display
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// does the hex rendering start with `prefix` (case-insensitive)
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }

    /// split into path components for object store
    /// returns (first 2 hex chars, remaining 62 hex chars)
    pub fn to_path_components(&self) -> (String, String) {
        let hex = self.to_hex();
        (hex[..2].to_string(), hex[2..].to_string())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..12])
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// domain tags keep blob and commit digests in disjoint spaces
const BLOB_TAG: &[u8] = b"twig-blob\0";
const COMMIT_TAG: &[u8] = b"twig-commit\0";

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// compute blob hash over (name, content)
///
/// format:
///   tag: "twig-blob\0"
///   name_len: 8 bytes LE
///   name: bytes
///   content_len: 8 bytes LE
///   content: bytes
pub fn compute_blob_hash(name: &str, content: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(BLOB_TAG);
    update_field(&mut hasher, name.as_bytes());
    update_field(&mut hasher, content);
    Hash(hasher.finalize().into())
}

/// compute commit hash over (tracked, parents, message, timestamp)
///
/// tracked entries are hashed in ascending filename order, which a BTreeMap
/// already guarantees. format:
///   tag: "twig-commit\0"
///   entry_count: 8 bytes LE
///   for each entry: name_len | name | blob hash (32 bytes)
///   parent_count: 8 bytes LE
///   for each parent: hash (32 bytes)
///   message_len | message
///   timestamp_len | timestamp
pub fn compute_commit_hash(
    tracked: &BTreeMap<String, Hash>,
    parents: &[Hash],
    message: &str,
    timestamp: &str,
) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(COMMIT_TAG);

    hasher.update((tracked.len() as u64).to_le_bytes());
    for (name, blob) in tracked {
        update_field(&mut hasher, name.as_bytes());
        hasher.update(blob.as_bytes());
    }

    hasher.update((parents.len() as u64).to_le_bytes());
    for parent in parents {
        hasher.update(parent.as_bytes());
    }

    update_field(&mut hasher, message.as_bytes());
    update_field(&mut hasher, timestamp.as_bytes());

    Hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let original =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let hex = original.to_hex();
        let parsed = Hash::from_hex(&hex).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_hash_invalid_hex() {
        assert!(Hash::from_hex("not valid hex").is_err());
        assert!(Hash::from_hex("abcd").is_err()); // too short
        assert!(Hash::from_hex(
            "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789ff"
        )
        .is_err()); // too long
    }

    #[test]
    fn test_hash_path_components() {
        let h =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let (dir, file) = h.to_path_components();
        assert_eq!(dir, "ab");
        assert_eq!(file, "cdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789");
    }

    #[test]
    fn test_hash_prefix() {
        let h =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        assert!(h.has_prefix("abc"));
        assert!(h.has_prefix("ABCDEF"));
        assert!(!h.has_prefix("abd"));
        assert_eq!(h.short(), "abcdef0");
    }

    #[test]
    fn test_blob_hash_determinism() {
        let h1 = compute_blob_hash("hello.txt", b"world");
        let h2 = compute_blob_hash("hello.txt", b"world");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_blob_hash_depends_on_name() {
        let h1 = compute_blob_hash("a.txt", b"same");
        let h2 = compute_blob_hash("b.txt", b"same");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_blob_hash_field_boundaries() {
        // length prefixes keep ("ab", "c") apart from ("a", "bc")
        let h1 = compute_blob_hash("ab", b"c");
        let h2 = compute_blob_hash("a", b"bc");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_blob_hash_empty_content() {
        let h = compute_blob_hash("empty", b"");
        assert_ne!(h, Hash::ZERO);
    }

    #[test]
    fn test_commit_hash_insertion_order() {
        let a = compute_blob_hash("a", b"1");
        let b = compute_blob_hash("b", b"2");

        let mut t1 = BTreeMap::new();
        t1.insert("b".to_string(), b);
        t1.insert("a".to_string(), a);

        let mut t2 = BTreeMap::new();
        t2.insert("a".to_string(), a);
        t2.insert("b".to_string(), b);

        assert_eq!(
            compute_commit_hash(&t1, &[], "msg", "2024-01-01 00:00:00 +0000"),
            compute_commit_hash(&t2, &[], "msg", "2024-01-01 00:00:00 +0000"),
        );
    }

    #[test]
    fn test_commit_hash_sensitivity() {
        let tracked = BTreeMap::new();
        let base = compute_commit_hash(&tracked, &[], "msg", "t0");

        assert_ne!(base, compute_commit_hash(&tracked, &[], "msg2", "t0"));
        assert_ne!(base, compute_commit_hash(&tracked, &[], "msg", "t1"));
        assert_ne!(base, compute_commit_hash(&tracked, &[Hash::ZERO], "msg", "t0"));
        // blob and commit digest spaces are disjoint
        assert_ne!(base, compute_blob_hash("", b""));
    }

    #[test]
    fn test_commit_hash_layout() {
        let blob = compute_blob_hash("a", b"1");
        let parent = compute_blob_hash("p", b"p");
        let mut tracked = BTreeMap::new();
        tracked.insert("a".to_string(), blob);

        // files first, then parents, message and timestamp
        let mut hasher = Sha256::new();
        hasher.update(b"twig-commit\0");
        hasher.update(1u64.to_le_bytes());
        hasher.update(1u64.to_le_bytes());
        hasher.update(b"a");
        hasher.update(blob.as_bytes());
        hasher.update(1u64.to_le_bytes());
        hasher.update(parent.as_bytes());
        hasher.update(3u64.to_le_bytes());
        hasher.update(b"msg");
        hasher.update(2u64.to_le_bytes());
        hasher.update(b"t0");
        let expected = Hash::from_bytes(hasher.finalize().into());

        assert_eq!(compute_commit_hash(&tracked, &[parent], "msg", "t0"), expected);
    }

    #[test]
    fn test_hash_serde_json() {
        let h =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains("abcdef"));
        let parsed: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }
}
