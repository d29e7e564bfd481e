// Key management and signing

mod keys;

pub use keys::{verify_signature, Address, KeyError, KeyPair};
