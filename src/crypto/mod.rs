//! Cryptographic operations for key and address generation.
//!
//! This module provides:
//! - Secure random private key candidates
//! - Address derivation using secp256k1 and Keccak-256
//! - EIP-55 checksum encoding

mod address;
mod candidate;
mod deriver;

pub use address::{Address, DerivedAddress};
pub use candidate::{Candidate, CandidateSource, OsCandidateSource};
pub use deriver::{address_from_public_key, AddressDeriver};
