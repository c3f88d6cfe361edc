//! # evm_vanity
//!
//! Multi-threaded EVM vanity address search.
//!
//! ## Architecture
//!
//! - `crypto`: Key candidates, address derivation and EIP-55 encoding
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Search workers, cancellation and coordination
//! - `config`: CLI and runtime configuration
//! - `error`: Error types

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod worker;

pub use config::{Cli, ConfigError, SearchConfig};
pub use crypto::{AddressDeriver, Candidate, CandidateSource, DerivedAddress, OsCandidateSource};
pub use error::{CryptoError, SearchError};
pub use matcher::{Pattern, Position};
pub use worker::{CancellationSignal, MatchResult, SearchCoordinator, SearchOutcome, SearchStats};
