/*
    checksum.rs - Whole-store content fingerprint

    Every (namespace, key, value) triple is hashed on its own and the store
    checksum is the XOR of all triple digests. XOR is commutative and
    self-inverse, so the result depends only on the current set of triples:
    insertion order and delete/re-insert history cancel out.
*/

use std::fmt;

/// Digest width in bytes
pub const CHECKSUM_LEN: usize = 32;

const ENTRY_DOMAIN: &[u8] = b"dopedb.entry.v1";

/// Store checksum value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checksum([u8; CHECKSUM_LEN]);

impl Checksum {
    /// Checksum of a store with no entries
    pub const EMPTY: Checksum = Checksum([0u8; CHECKSUM_LEN]);

    /// Lowercase hex rendering used on the wire
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the wire rendering back into a checksum
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let bytes: [u8; CHECKSUM_LEN] = bytes.try_into().ok()?;
        Some(Checksum(bytes))
    }

    fn xor_assign(&mut self, other: &[u8; CHECKSUM_LEN]) {
        for (a, b) in self.0.iter_mut().zip(other.iter()) {
            *a ^= b;
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest of a single triple. Fields are length-prefixed so that
/// ("a", "bc") and ("ab", "c") never collide.
pub fn entry_digest(namespace: &str, key: &str, value: &str) -> [u8; CHECKSUM_LEN] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(ENTRY_DOMAIN);
    for field in [namespace, key, value] {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Incrementally maintained checksum
#[derive(Debug, Default)]
pub struct ChecksumEngine {
    current: Checksum,
}

impl ChecksumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Checksum {
        self.current
    }

    /// Account for a triple entering the store
    pub fn add(&mut self, namespace: &str, key: &str, value: &str) {
        self.current.xor_assign(&entry_digest(namespace, key, value));
    }

    /// Account for a triple leaving the store
    pub fn remove(&mut self, namespace: &str, key: &str, value: &str) {
        // XOR is its own inverse
        self.current.xor_assign(&entry_digest(namespace, key, value));
    }

    /// Account for an overwrite of `key`, where `previous` is the old value if any
    pub fn replace(&mut self, namespace: &str, key: &str, previous: Option<&str>, value: &str) {
        if let Some(old) = previous {
            self.remove(namespace, key, old);
        }
        self.add(namespace, key, value);
    }

    /// Full recomputation over an arbitrary iterator of triples
    pub fn recompute<'a, I>(entries: I) -> Checksum
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut checksum = Checksum::EMPTY;
        for (namespace, key, value) in entries {
            checksum.xor_assign(&entry_digest(namespace, key, value));
        }
        checksum
    }
}
