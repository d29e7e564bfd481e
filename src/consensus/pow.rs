// Proof of Work implementation

use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::{Block, Hash256};

/// Attempts between observer callbacks during mining
pub const OBSERVE_INTERVAL: u64 = 10_000;

/// Check a hash against a difficulty expressed in leading zero hex digits
pub fn meets_difficulty(hash: &Hash256, difficulty: usize) -> bool {
    hash.leading_zero_nibbles() >= difficulty
}

/// Snapshot of a mining run, handed to the observer callback
#[derive(Debug, Clone, Copy)]
pub struct MiningProgress {
    /// Nonces tried so far
    pub attempts: u64,
    /// Nonce currently in the block
    pub nonce: u64,
    /// Time since the search started
    pub elapsed: Duration,
}

/// The observer asked for the search to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mining interrupted after {attempts} attempts")]
pub struct MiningInterrupted {
    pub attempts: u64,
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The nonce that was found
    pub nonce: u64,
    /// The resulting hash
    pub hash: Hash256,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64()
    }
}

/// Proof of Work miner
pub struct Miner {
    difficulty: usize,
}

impl Miner {
    /// Create a new miner with fixed difficulty
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    /// Difficulty this miner searches at
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Mine a block in place by searching for a nonce whose hash meets the
    /// difficulty target. Runs until found.
    pub fn mine(&self, block: &mut Block) -> MiningResult {
        self.mine_with(block, |_| true)
            .expect("a never-cancelling observer cannot be interrupted")
    }

    /// Mine a block, consulting `observer` every [`OBSERVE_INTERVAL`]
    /// attempts. The observer returns `false` to stop the search, in which
    /// case the block's nonce and hash are restored to their pre-mining
    /// values and no result is produced.
    ///
    /// Expects the block's cached hash to be current on entry, which
    /// [`Block::new`] establishes.
    pub fn mine_with<F>(
        &self,
        block: &mut Block,
        mut observer: F,
    ) -> Result<MiningResult, MiningInterrupted>
    where
        F: FnMut(&MiningProgress) -> bool,
    {
        let start_time = Instant::now();
        let initial_nonce = block.nonce;
        let initial_hash = block.hash;
        let mut attempts = 0u64;

        loop {
            if meets_difficulty(&block.hash, self.difficulty) {
                let duration = start_time.elapsed();
                log::info!(
                    "Block mined: {} (nonce {}, {} attempts)",
                    block.hash,
                    block.nonce,
                    attempts
                );
                return Ok(MiningResult {
                    nonce: block.nonce,
                    hash: block.hash,
                    attempts,
                    duration,
                });
            }

            if attempts > 0 && attempts % OBSERVE_INTERVAL == 0 {
                let elapsed = start_time.elapsed();
                log::debug!(
                    "Mining attempts: {} ({:.1} KH/s)",
                    attempts,
                    attempts as f64 / elapsed.as_secs_f64() / 1000.0
                );

                let progress = MiningProgress {
                    attempts,
                    nonce: block.nonce,
                    elapsed,
                };
                if !observer(&progress) {
                    block.nonce = initial_nonce;
                    block.hash = initial_hash;
                    return Err(MiningInterrupted { attempts });
                }
            }

            block.nonce += 1;
            block.hash = block.compute_hash();
            attempts += 1;
        }
    }
}
