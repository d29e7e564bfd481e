// Block and chain validation

use thiserror::Error;

use crate::consensus::pow::meets_difficulty;
use crate::core::Block;

/// Validation error types, carrying the chain height of the offending block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Stored hash differs from a fresh recomputation over the block fields
    #[error("block {height}: stored hash does not match recomputed digest")]
    HashMismatch { height: usize },
    /// previous_hash does not equal the parent's stored hash
    #[error("block {height}: broken link to parent block")]
    BrokenLink { height: usize },
    /// Block hash does not carry enough leading zero hex digits
    #[error("block {height}: hash is below the difficulty target")]
    BelowDifficulty { height: usize },
    /// Some contained transaction fails its chain-of-custody check
    #[error("block {height}: contains an invalid transaction")]
    InvalidTransactions { height: usize },
}

/// Block validator
pub struct BlockValidator {
    difficulty: usize,
}

impl BlockValidator {
    /// Create a new block validator with fixed difficulty
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    /// Validate a non-genesis block against its parent.
    ///
    /// Checks, in order: the cached hash against a recomputation, the link
    /// to the parent, the proof-of-work target, and every contained
    /// transaction. The first failure wins.
    pub fn check(&self, height: usize, block: &Block, parent: &Block) -> Result<(), ValidationError> {
        if !block.hash_matches() {
            return Err(ValidationError::HashMismatch { height });
        }

        if block.previous_hash != parent.hash {
            return Err(ValidationError::BrokenLink { height });
        }

        if !meets_difficulty(&block.hash, self.difficulty) {
            return Err(ValidationError::BelowDifficulty { height });
        }

        if !block.has_valid_transactions() {
            return Err(ValidationError::InvalidTransactions { height });
        }

        Ok(())
    }
}
