//! Pattern matching for checksummed addresses.
//!
//! Supports two positions:
//! - Prefix: Match at the start of the address body
//! - Suffix: Match at the end of the address body
//!
//! Matching is either case-insensitive or exact against the EIP-55 checksum case.

mod pattern;

pub use pattern::{matches, Pattern, Position};
