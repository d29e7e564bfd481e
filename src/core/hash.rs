// Hash type and digest helpers

use sha2::{Digest, Sha256};
use std::fmt;

/// 256-bit digest (32 bytes).
/// Used for transaction digests, block hashes, and the genesis link sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Create a new Hash256 from a byte array
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a Hash256 from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, String> {
        if slice.len() != 32 {
            return Err(format!("Invalid hash length: expected 32, got {}", slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the hash as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// All-zero hash, the `previous_hash` sentinel of the genesis block
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Lowercase hex, most significant byte first
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let bytes = hex::decode(hex_str).map_err(|e| format!("Invalid hex string: {}", e))?;
        Self::from_slice(&bytes)
    }

    /// Number of leading zero hex digits, counted nibble by nibble.
    /// This is the quantity the proof-of-work difficulty is expressed in.
    pub fn leading_zero_nibbles(&self) -> usize {
        let mut count = 0;
        for byte in &self.0 {
            if *byte == 0 {
                count += 2;
            } else {
                if byte >> 4 == 0 {
                    count += 1;
                }
                break;
            }
        }
        count
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Single SHA-256 over raw bytes
pub fn sha256(data: &[u8]) -> Hash256 {
    let digest = Sha256::digest(data);
    Hash256::from_slice(&digest).expect("SHA256 always returns 32 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_deterministic() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.as_bytes().len(), 32);

        // Same data should produce same hash
        let hash2 = sha256(data);
        assert_eq!(hash, hash2);

        // Different data should not
        assert_ne!(hash, sha256(b"hello worlds"));
    }

    #[test]
    fn test_sha256_empty_input() {
        // SHA-256 of the empty string is a fixed, well-known value
        let hash = sha256(b"");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash256_zero() {
        let zero = Hash256::zero();
        assert_eq!(zero.as_bytes(), &[0u8; 32]);
        assert_eq!(zero.leading_zero_nibbles(), 64);
    }

    #[test]
    fn test_hash256_hex_roundtrip() {
        let hash = sha256(b"roundtrip");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        let decoded = Hash256::from_hex(&hex).unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn test_hash256_hex_order_preserved() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let hash = Hash256::new(bytes);
        let hex = hash.to_hex();
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("01"));
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Hash256::from_hex("zz").is_err());
        assert!(Hash256::from_hex("abcd").is_err());
    }

    #[test]
    fn test_leading_zero_nibbles() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(Hash256::new(bytes).leading_zero_nibbles(), 0);

        bytes[0] = 0x0f;
        assert_eq!(Hash256::new(bytes).leading_zero_nibbles(), 1);

        bytes[0] = 0x00;
        assert_eq!(Hash256::new(bytes).leading_zero_nibbles(), 2);

        bytes[1] = 0x0a;
        assert_eq!(Hash256::new(bytes).leading_zero_nibbles(), 3);

        bytes[1] = 0x00;
        assert_eq!(Hash256::new(bytes).leading_zero_nibbles(), 4);
    }
}
