// CLI commands

use clap::{Parser, Subcommand};
use std::error::Error;

use crate::core::Transaction;
use crate::ledger::{ChainConfig, Ledger};
use crate::wallet::KeyPair;

#[derive(Parser)]
#[command(name = "minicoin")]
#[command(about = "Minimal single-node proof-of-work ledger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a key pair and print it
    Keygen,

    /// Run an end-to-end scenario: sign, submit, mine, and audit
    Demo {
        /// Required leading zero hex digits on block hashes
        #[arg(long, default_value_t = 2)]
        difficulty: usize,

        /// Mining reward per block
        #[arg(long, default_value_t = 10)]
        reward: u64,

        /// Amount transferred in the scenario
        #[arg(long, default_value_t = 10)]
        amount: u64,
    },
}

/// Dispatch a parsed command
pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Demo {
            difficulty,
            reward,
            amount,
        } => demo(difficulty, reward, amount),
    }
}

/// Generate and print a fresh key pair
fn keygen() -> Result<(), Box<dyn Error>> {
    let pair = KeyPair::generate();

    println!("Secret key: {}", pair.secret_hex());
    println!("Address:    {}", pair.address);

    Ok(())
}

/// Walk one payment through its full life cycle on a fresh ledger
fn demo(difficulty: usize, reward: u64, amount: u64) -> Result<(), Box<dyn Error>> {
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();

    println!("Participants:");
    println!("  alice: {}", alice.address);
    println!("  bob:   {}", bob.address);

    let mut ledger = Ledger::new(ChainConfig {
        difficulty,
        mining_reward: reward,
    });

    let mut tx = Transaction::transfer(alice.address.clone(), bob.address.clone(), amount);
    tx.sign(&alice)?;
    ledger.add_transaction(tx)?;
    println!("✓ Queued signed transfer: alice -> bob ({})", amount);

    println!("Mining pending transactions (difficulty {})...", difficulty);
    let result = ledger.mine_pending_transactions(&alice.address);
    print_mining_result(&result);
    print_balances(&ledger, &alice, &bob);

    // The first payout is still sitting in the pool; a second block frees it
    println!("Mining again to release the queued reward...");
    let result = ledger.mine_pending_transactions(&alice.address);
    print_mining_result(&result);
    print_balances(&ledger, &alice, &bob);

    println!("Chain ({} blocks):", ledger.height());
    for (height, block) in ledger.blocks().iter().enumerate() {
        println!(
            "  [{}] {} ({} tx, nonce {})",
            height,
            block.hash,
            block.transactions.len(),
            block.nonce
        );
    }
    println!("Chain valid: {}", ledger.is_chain_valid());

    Ok(())
}

fn print_mining_result(result: &crate::consensus::MiningResult) {
    println!("✓ Block mined: {}", result.hash);
    println!("  Nonce: {}", result.nonce);
    println!(
        "  Attempts: {} in {:?} ({:.1} KH/s)",
        result.attempts,
        result.duration,
        result.hash_rate() / 1000.0
    );
}

fn print_balances(ledger: &Ledger, alice: &KeyPair, bob: &KeyPair) {
    println!("Balances:");
    println!("  alice: {}", ledger.balance_of(&alice.address));
    println!("  bob:   {}", ledger.balance_of(&bob.address));
}
