// Minicoin: a minimal single-node proof-of-work ledger

pub mod cli;
pub mod consensus;
pub mod core;
pub mod ledger;
pub mod wallet;

// Re-exports for convenience
pub use crate::core::{Block, Hash256, Transaction, TransactionError};
pub use crate::consensus::{BlockValidator, Miner, MiningInterrupted, MiningProgress, MiningResult, ValidationError};
pub use crate::ledger::{ChainConfig, Ledger, LedgerError};
pub use crate::wallet::{Address, KeyError, KeyPair};
