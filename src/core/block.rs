// Block data structures

use crate::core::{sha256, Hash256, Transaction};

/// Timestamp of the genesis block: 2000-01-01T00:00:00Z in Unix milliseconds
pub const GENESIS_TIMESTAMP_MS: u64 = 946_684_800_000;

/// Block - a batch of transactions chained to its parent by hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Creation time (Unix epoch milliseconds)
    pub timestamp: u64,
    /// Transactions in this block
    pub transactions: Vec<Transaction>,
    /// Hash of the previous block (all zeros for genesis)
    pub previous_hash: Hash256,
    /// Proof-of-work counter, starts at 0 and only moves while mining
    pub nonce: u64,
    /// Cached hash of the block contents, kept current by mining
    pub hash: Hash256,
}

impl Block {
    /// Create a new block with the cached hash already computed
    pub fn new(timestamp: u64, transactions: Vec<Transaction>, previous_hash: Hash256) -> Self {
        let mut block = Self {
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: Hash256::zero(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create the genesis block.
    ///
    /// Fixed timestamp, no transactions, zero previous hash, never mined.
    /// Every chain starts from an identical copy of this block.
    pub fn genesis() -> Self {
        Self::new(GENESIS_TIMESTAMP_MS, Vec::new(), Hash256::zero())
    }

    /// Recompute the block digest from the current field values.
    ///
    /// The preimage concatenates the decimal timestamp, the hex of
    /// `previous_hash`, the JSON encoding of the transaction list, and the
    /// decimal nonce, then takes a single SHA-256 over the bytes.
    pub fn compute_hash(&self) -> Hash256 {
        let transactions_json = serde_json::to_string(&self.transactions)
            .expect("transactions always serialize to JSON");
        let preimage = format!(
            "{}{}{}{}",
            self.timestamp, self.previous_hash, transactions_json, self.nonce
        );
        sha256(preimage.as_bytes())
    }

    /// Check the cached hash against a fresh recomputation.
    /// Any tampering with block contents after mining turns this false.
    pub fn hash_matches(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Check the chain of custody of every contained transaction.
    /// A transaction that fails verification for any reason counts as invalid.
    pub fn has_valid_transactions(&self) -> bool {
        self.transactions.iter().all(|tx| tx.verify().is_ok())
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.previous_hash == Hash256::zero()
    }
}
