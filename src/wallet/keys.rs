// Key management and ECDSA signing

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from decoding key or signature material
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),
}

/// Account address: the lowercase hex encoding of a compressed
/// secp256k1 public key (33 bytes, 66 hex characters).
/// The address itself is the verifying key, so no lookup is needed
/// to check a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Get address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key pair
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub address: Address,
}

impl KeyPair {
    /// Generate a new key pair
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let secret_key = SecretKey::new(&mut rng);
        Self::from_secret_key(secret_key)
    }

    /// Restore a key pair from a hex-encoded secret key
    pub fn from_secret_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|e| KeyError::InvalidSecretKey(e.to_string()))?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|e| KeyError::InvalidSecretKey(e.to_string()))?;
        Ok(Self::from_secret_key(secret_key))
    }

    fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = secret_key.public_key(&secp);
        let address = Address(hex::encode(public_key.serialize()));

        Self {
            secret_key,
            public_key,
            address,
        }
    }

    /// Hex encoding of the secret key, for export
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Sign a 32-byte digest, returning the DER-encoded signature as hex
    pub fn sign_digest(&self, digest: &[u8; 32]) -> String {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest).expect("digest is exactly 32 bytes");
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        hex::encode(signature.serialize_der().to_vec())
    }
}

/// Check a hex-encoded DER signature over a 32-byte digest against the
/// public key an address encodes.
///
/// A well-formed signature that simply does not match yields `Ok(false)`;
/// only undecodable key or signature material is an error.
pub fn verify_signature(
    address: &Address,
    digest: &[u8; 32],
    signature_hex: &str,
) -> Result<bool, KeyError> {
    let secp = Secp256k1::new();

    let pubkey_bytes =
        hex::decode(address.as_str()).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
    let public_key =
        PublicKey::from_slice(&pubkey_bytes).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

    let signature_bytes =
        hex::decode(signature_hex).map_err(|e| KeyError::InvalidSignature(e.to_string()))?;
    let signature = Signature::from_der(&signature_bytes)
        .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;

    let message = Message::from_digest_slice(digest).expect("digest is exactly 32 bytes");
    Ok(secp.verify_ecdsa(&message, &signature, &public_key).is_ok())
}
