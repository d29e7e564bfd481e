// Transaction data structures

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{sha256, Hash256};
use crate::wallet::{verify_signature, Address, KeyError, KeyPair};

/// Errors raised when signing or verifying a transaction
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The key pair does not own the transaction: its address differs from
    /// the sender, or the transaction is a mining reward (never signed).
    #[error("key pair for {0} cannot sign this transaction")]
    Unauthorized(Address),
    #[error("transfer from {0} is not signed")]
    MissingSignature(Address),
    #[error("signature from {0} failed verification")]
    SignatureRejected(Address),
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// A ledger transaction.
///
/// `Transfer` moves value between two accounts and must carry a signature
/// made with the sender's key. `Reward` mints the mining payout and is
/// structurally unsigned; it is only ever created by the ledger itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Transfer {
        sender: Address,
        recipient: Address,
        amount: u64,
        signature: Option<String>,
    },
    Reward {
        recipient: Address,
        amount: u64,
    },
}

impl Transaction {
    /// Create an unsigned transfer
    pub fn transfer(sender: Address, recipient: Address, amount: u64) -> Self {
        Self::Transfer {
            sender,
            recipient,
            amount,
            signature: None,
        }
    }

    /// Create a mining reward payout
    pub fn reward(recipient: Address, amount: u64) -> Self {
        Self::Reward { recipient, amount }
    }

    /// SHA-256 digest of the signing preimage.
    ///
    /// The preimage is `"transfer:" sender ":" recipient ":" amount` for a
    /// transfer and `"reward:" recipient ":" amount` for a reward, with the
    /// amount in decimal. The variant tag keeps the two kinds from ever
    /// colliding, and the signature itself is never part of the preimage.
    pub fn digest(&self) -> Hash256 {
        let preimage = match self {
            Self::Transfer {
                sender,
                recipient,
                amount,
                ..
            } => format!("transfer:{}:{}:{}", sender, recipient, amount),
            Self::Reward { recipient, amount } => format!("reward:{}:{}", recipient, amount),
        };
        sha256(preimage.as_bytes())
    }

    /// Sign a transfer with the sender's key pair.
    ///
    /// Fails with `Unauthorized` when the key pair's address is not the
    /// sender, or when the transaction is a reward.
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<(), TransactionError> {
        let digest = self.digest();
        match self {
            Self::Reward { .. } => Err(TransactionError::Unauthorized(keypair.address.clone())),
            Self::Transfer {
                sender, signature, ..
            } => {
                if *sender != keypair.address {
                    return Err(TransactionError::Unauthorized(keypair.address.clone()));
                }
                *signature = Some(keypair.sign_digest(digest.as_bytes()));
                Ok(())
            }
        }
    }

    /// Check the transaction's chain of custody.
    ///
    /// Rewards are valid as-is. A transfer must carry a signature that
    /// verifies against its sender address over the current digest, so any
    /// field edit after signing shows up here.
    pub fn verify(&self) -> Result<(), TransactionError> {
        match self {
            Self::Reward { .. } => Ok(()),
            Self::Transfer {
                sender, signature, ..
            } => {
                let signature = match signature {
                    Some(sig) if !sig.is_empty() => sig,
                    _ => return Err(TransactionError::MissingSignature(sender.clone())),
                };

                if verify_signature(sender, self.digest().as_bytes(), signature)? {
                    Ok(())
                } else {
                    Err(TransactionError::SignatureRejected(sender.clone()))
                }
            }
        }
    }

    /// Sending account, `None` for rewards
    pub fn sender(&self) -> Option<&Address> {
        match self {
            Self::Transfer { sender, .. } => Some(sender),
            Self::Reward { .. } => None,
        }
    }

    /// Receiving account
    pub fn recipient(&self) -> &Address {
        match self {
            Self::Transfer { recipient, .. } => recipient,
            Self::Reward { recipient, .. } => recipient,
        }
    }

    /// Transferred or minted amount
    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer { amount, .. } => *amount,
            Self::Reward { amount, .. } => *amount,
        }
    }

    /// Check if this is a mining reward
    pub fn is_reward(&self) -> bool {
        matches!(self, Self::Reward { .. })
    }
}
