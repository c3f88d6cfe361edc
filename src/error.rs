//! Error types for the vanity search.

use thiserror::Error;

use crate::config::ConfigError;

/// Failures of the key-generation and address-derivation primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The secure random source could not supply bytes.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// The candidate is not a valid secp256k1 scalar (zero or >= curve order).
    #[error("candidate is not a valid secp256k1 secret key")]
    InvalidCandidate,
}

/// Errors surfaced by the search coordinator.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("worker {id} failed: {source}")]
    Worker {
        id: usize,
        #[source]
        source: CryptoError,
    },

    /// Every worker terminated before a match was found.
    #[error("search unavailable: all workers exited without a match ({failed} failed)")]
    SearchUnavailable { failed: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
