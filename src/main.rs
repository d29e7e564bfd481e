// Minicoin - minimal proof-of-work ledger CLI

use clap::Parser;
use minicoin::cli::{run, Cli};

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
