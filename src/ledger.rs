// Ledger: chain state, pending pool, and mining entry points

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::consensus::pow::{Miner, MiningInterrupted, MiningProgress, MiningResult};
use crate::consensus::validation::{BlockValidator, ValidationError};
use crate::core::{Block, Transaction, TransactionError};
use crate::wallet::Address;

/// Chain parameters, fixed at ledger creation
#[derive(Debug, Clone, Copy)]
pub struct ChainConfig {
    /// Required leading zero hex digits on block hashes
    pub difficulty: usize,
    /// Amount minted to the miner per mined block
    pub mining_reward: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            mining_reward: 10,
        }
    }
}

/// Errors from submitting a transaction to the pending pool
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Structurally unacceptable submission: blank addresses, or a reward
    /// handed in from outside (rewards are only minted by mining)
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),
    /// The transaction failed its chain-of-custody check
    #[error("rejected transaction: {0}")]
    RejectedTransaction(#[from] TransactionError),
}

/// Single-node proof-of-work ledger.
///
/// Holds the block chain, the pool of pending transactions, and the chain
/// parameters. The chain always starts from the fixed genesis block, so
/// every ledger with the same config grows identically for the same inputs.
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    config: ChainConfig,
}

impl Ledger {
    /// Create a ledger holding only the genesis block
    pub fn new(config: ChainConfig) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            config,
        }
    }

    /// Chain parameters
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// All blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Number of blocks, counting genesis
    pub fn height(&self) -> usize {
        self.chain.len()
    }

    /// The most recently appended block
    pub fn latest_block(&self) -> &Block {
        self.chain.last().expect("chain always holds the genesis block")
    }

    /// Transactions waiting for the next mined block
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Queue a transfer for inclusion in the next mined block.
    ///
    /// The submission must be a transfer with non-blank sender and
    /// recipient, and must pass its chain-of-custody check. On failure the
    /// pool is left untouched.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        match &transaction {
            Transaction::Reward { .. } => {
                return Err(LedgerError::MalformedTransaction(
                    "rewards are minted by mining, not submitted".to_string(),
                ));
            }
            Transaction::Transfer {
                sender, recipient, ..
            } => {
                if sender.as_str().is_empty() {
                    return Err(LedgerError::MalformedTransaction(
                        "transfer must name a sender address".to_string(),
                    ));
                }
                if recipient.as_str().is_empty() {
                    return Err(LedgerError::MalformedTransaction(
                        "transfer must name a recipient address".to_string(),
                    ));
                }
            }
        }

        transaction.verify()?;

        log::debug!(
            "Transaction queued: {} -> {} (amount {})",
            transaction
                .sender()
                .map(|a| a.as_str())
                .unwrap_or_default(),
            transaction.recipient(),
            transaction.amount()
        );
        self.pending.push(transaction);
        Ok(())
    }

    /// Mine every pending transaction into a new block and append it.
    ///
    /// The new block snapshots the current pool and links to the latest
    /// block. Afterwards the pool is reset to a single reward paying
    /// `reward_address`, so the payout only becomes spendable once a
    /// further block is mined.
    pub fn mine_pending_transactions(&mut self, reward_address: &Address) -> MiningResult {
        self.mine_pending_transactions_with(reward_address, |_| true)
            .expect("a never-cancelling observer cannot be interrupted")
    }

    /// Like [`Ledger::mine_pending_transactions`], but consults `observer`
    /// periodically during the search. If the observer stops the search,
    /// the chain and the pending pool are left exactly as they were.
    pub fn mine_pending_transactions_with<F>(
        &mut self,
        reward_address: &Address,
        observer: F,
    ) -> Result<MiningResult, MiningInterrupted>
    where
        F: FnMut(&MiningProgress) -> bool,
    {
        let mut block = Block::new(now_millis(), self.pending.clone(), self.latest_block().hash);

        let miner = Miner::new(self.config.difficulty);
        let result = miner.mine_with(&mut block, observer)?;

        log::info!("Block {} appended at height {}", block.hash, self.chain.len());
        self.chain.push(block);
        self.pending = vec![Transaction::reward(
            reward_address.clone(),
            self.config.mining_reward,
        )];

        Ok(result)
    }

    /// Fold an account balance over every mined transaction.
    ///
    /// Outgoing amounts subtract, incoming amounts add, and pending
    /// transactions (including the queued mining reward) do not count.
    /// May go negative, since no balance check guards submission.
    pub fn balance_of(&self, address: &Address) -> i64 {
        let mut balance: i64 = 0;
        for block in &self.chain {
            for tx in &block.transactions {
                if tx.sender() == Some(address) {
                    balance -= tx.amount() as i64;
                }
                if tx.recipient() == address {
                    balance += tx.amount() as i64;
                }
            }
        }
        balance
    }

    /// Validate every non-genesis block against its parent, reporting the
    /// first failure
    pub fn validate(&self) -> Result<(), ValidationError> {
        let validator = BlockValidator::new(self.config.difficulty);
        for height in 1..self.chain.len() {
            validator.check(height, &self.chain[height], &self.chain[height - 1])?;
        }
        Ok(())
    }

    /// Whole-chain integrity as a single verdict
    pub fn is_chain_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is set after the Unix epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::KeyPair;

    fn test_config() -> ChainConfig {
        ChainConfig {
            difficulty: 1,
            mining_reward: 10,
        }
    }

    fn signed_transfer(from: &KeyPair, to: &Address, amount: u64) -> Transaction {
        let mut tx = Transaction::transfer(from.address.clone(), to.clone(), amount);
        tx.sign(from).unwrap();
        tx
    }

    #[test]
    fn test_new_ledger_holds_genesis_only() {
        let ledger = Ledger::new(test_config());

        assert_eq!(ledger.height(), 1);
        assert!(ledger.latest_block().is_genesis());
        assert!(ledger.pending_transactions().is_empty());
        assert!(ledger.is_chain_valid());
    }

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.mining_reward, 10);
    }

    #[test]
    fn test_identical_ledgers_share_genesis() {
        let a = Ledger::new(test_config());
        let b = Ledger::default();
        assert_eq!(a.latest_block().hash, b.latest_block().hash);
    }

    #[test]
    fn test_add_transaction_requires_signature() {
        let mut ledger = Ledger::new(test_config());
        let unsigned = Transaction::transfer(
            Address("aa".to_string()),
            Address("bb".to_string()),
            5,
        );

        let err = ledger.add_transaction(unsigned).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::RejectedTransaction(TransactionError::MissingSignature(_))
        ));
        assert!(ledger.pending_transactions().is_empty());
    }

    #[test]
    fn test_add_transaction_rejects_blank_addresses() {
        let mut ledger = Ledger::new(test_config());

        let no_sender = Transaction::transfer(
            Address(String::new()),
            Address("bb".to_string()),
            5,
        );
        assert!(matches!(
            ledger.add_transaction(no_sender),
            Err(LedgerError::MalformedTransaction(_))
        ));

        let no_recipient = Transaction::transfer(
            Address("aa".to_string()),
            Address(String::new()),
            5,
        );
        assert!(matches!(
            ledger.add_transaction(no_recipient),
            Err(LedgerError::MalformedTransaction(_))
        ));

        assert!(ledger.pending_transactions().is_empty());
    }

    #[test]
    fn test_add_transaction_rejects_outside_rewards() {
        let mut ledger = Ledger::new(test_config());
        let forged = Transaction::reward(Address("aa".to_string()), 1_000_000);

        assert!(matches!(
            ledger.add_transaction(forged),
            Err(LedgerError::MalformedTransaction(_))
        ));
        assert!(ledger.pending_transactions().is_empty());
    }

    #[test]
    fn test_tampered_signed_transfer_is_rejected() {
        let mut ledger = Ledger::new(test_config());
        let alice = KeyPair::generate();
        let mut tx = signed_transfer(&alice, &Address("bb".to_string()), 5);

        if let Transaction::Transfer { amount, .. } = &mut tx {
            *amount = 9_000;
        }

        assert!(matches!(
            ledger.add_transaction(tx),
            Err(LedgerError::RejectedTransaction(
                TransactionError::SignatureRejected(_)
            ))
        ));
    }

    #[test]
    fn test_mining_lifecycle_and_deferred_reward() {
        let mut ledger = Ledger::new(test_config());
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        ledger
            .add_transaction(signed_transfer(&alice, &bob.address, 10))
            .unwrap();

        ledger.mine_pending_transactions(&alice.address);

        // The transfer is mined; the reward is only queued
        assert_eq!(ledger.height(), 2);
        assert_eq!(ledger.latest_block().transactions.len(), 1);
        assert!(!ledger.latest_block().transactions[0].is_reward());
        assert_eq!(ledger.pending_transactions().len(), 1);
        assert!(ledger.pending_transactions()[0].is_reward());

        assert_eq!(ledger.balance_of(&alice.address), -10);
        assert_eq!(ledger.balance_of(&bob.address), 10);

        // Mining again pays out the queued reward
        ledger.mine_pending_transactions(&alice.address);
        assert_eq!(ledger.height(), 3);
        assert_eq!(ledger.balance_of(&alice.address), 0);
        assert_eq!(ledger.balance_of(&bob.address), 10);

        assert!(ledger.is_chain_valid());
    }

    #[test]
    fn test_mining_links_to_latest_block() {
        let mut ledger = Ledger::new(test_config());
        let miner = KeyPair::generate();

        ledger.mine_pending_transactions(&miner.address);
        ledger.mine_pending_transactions(&miner.address);

        let blocks = ledger.blocks();
        assert_eq!(blocks[1].previous_hash, blocks[0].hash);
        assert_eq!(blocks[2].previous_hash, blocks[1].hash);
    }

    #[test]
    fn test_balance_of_unknown_address_is_zero() {
        let ledger = Ledger::new(test_config());
        assert_eq!(ledger.balance_of(&Address("nobody".to_string())), 0);
    }

    #[test]
    fn test_self_transfer_nets_to_zero() {
        let mut ledger = Ledger::new(test_config());
        let alice = KeyPair::generate();

        ledger
            .add_transaction(signed_transfer(&alice, &alice.address, 5))
            .unwrap();
        ledger.mine_pending_transactions(&Address("miner".to_string()));

        assert_eq!(ledger.balance_of(&alice.address), 0);
    }

    #[test]
    fn test_tampering_with_mined_block_invalidates_chain() {
        let mut ledger = Ledger::new(test_config());
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        ledger
            .add_transaction(signed_transfer(&alice, &bob.address, 10))
            .unwrap();
        ledger.mine_pending_transactions(&alice.address);
        assert!(ledger.is_chain_valid());

        if let Transaction::Transfer { amount, .. } = &mut ledger.chain[1].transactions[0] {
            *amount = 1_000_000;
        }

        assert!(!ledger.is_chain_valid());
        assert_eq!(
            ledger.validate(),
            Err(ValidationError::HashMismatch { height: 1 })
        );
    }

    #[test]
    fn test_unsigned_transfer_inside_block_invalidates_chain() {
        let mut ledger = Ledger::new(test_config());

        // Slip an unsigned transfer straight into the pool, past submission
        // checks, to prove validation still catches it after mining
        ledger.pending.push(Transaction::transfer(
            Address("aa".to_string()),
            Address("bb".to_string()),
            5,
        ));
        ledger.mine_pending_transactions(&Address("miner".to_string()));

        assert!(!ledger.is_chain_valid());
        assert_eq!(
            ledger.validate(),
            Err(ValidationError::InvalidTransactions { height: 1 })
        );
    }

    #[test]
    fn test_cancelled_mining_leaves_ledger_untouched() {
        let mut ledger = Ledger::new(ChainConfig {
            difficulty: 64,
            mining_reward: 10,
        });
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        ledger
            .add_transaction(signed_transfer(&alice, &bob.address, 10))
            .unwrap();

        let result = ledger.mine_pending_transactions_with(&alice.address, |_| false);

        assert!(result.is_err());
        assert_eq!(ledger.height(), 1);
        assert_eq!(ledger.pending_transactions().len(), 1);
        assert!(!ledger.pending_transactions()[0].is_reward());
    }
}
