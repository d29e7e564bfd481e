// Core ledger data structures

mod block;
mod hash;
mod transaction;

pub use block::*;
pub use hash::*;
pub use transaction::*;
