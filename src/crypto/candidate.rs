//! Private key candidates and the sources that produce them.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// A 32-byte private key candidate.
#[derive(Clone, PartialEq, Eq)]
pub struct Candidate([u8; 32]);

impl Candidate {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

// Key material stays out of logs.
impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Candidate(..)")
    }
}

/// Produces one private key candidate per call.
pub trait CandidateSource {
    fn next_candidate(&mut self) -> Result<Candidate, CryptoError>;
}

/// Candidate source backed by the operating system's secure RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCandidateSource;

impl OsCandidateSource {
    pub fn new() -> Self {
        Self
    }
}

impl CandidateSource for OsCandidateSource {
    #[inline]
    fn next_candidate(&mut self) -> Result<Candidate, CryptoError> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
        Ok(Candidate(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_produces_distinct_candidates() {
        let mut source = OsCandidateSource::new();
        let a = source.next_candidate().unwrap();
        let b = source.next_candidate().unwrap();
        assert_ne!(a, b);
        assert_ne!(a.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_hex_and_debug() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let candidate = Candidate::from_bytes(bytes);
        assert_eq!(candidate.to_hex(), format!("{}01", "0".repeat(62)));
        assert_eq!(format!("{:?}", candidate), "Candidate(..)");
    }
}
