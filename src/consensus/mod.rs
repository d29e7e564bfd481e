// Consensus and validation logic

pub mod pow;
pub mod validation;

pub use pow::{meets_difficulty, Miner, MiningInterrupted, MiningProgress, MiningResult};
pub use validation::{BlockValidator, ValidationError};
