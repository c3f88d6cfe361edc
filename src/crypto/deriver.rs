//! Private key to checksummed address derivation.

use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};
use tiny_keccak::{Hasher, Keccak};

use super::{Address, Candidate, DerivedAddress};
use crate::error::CryptoError;

/// Derives checksummed addresses from private key candidates.
///
/// Holds a signing-only secp256k1 context so each worker builds it once
/// instead of once per key.
pub struct AddressDeriver {
    secp: Secp256k1<SignOnly>,
}

impl AddressDeriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
        }
    }

    /// Derives the EIP-55 address for `candidate`.
    ///
    /// Fails with [`CryptoError::InvalidCandidate`] when the bytes are zero or
    /// not below the curve order.
    #[inline]
    pub fn derive(&self, candidate: &Candidate) -> Result<DerivedAddress, CryptoError> {
        let secret_key =
            SecretKey::from_slice(candidate.as_bytes()).map_err(|_| CryptoError::InvalidCandidate)?;
        let public_key = PublicKey::from_secret_key(&self.secp, &secret_key);
        Ok(address_from_public_key(&public_key).to_checksum())
    }
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives an Ethereum address from a secp256k1 public key.
///
/// Process:
/// 1. Serialize the public key in uncompressed form (65 bytes)
/// 2. Remove the first byte (0x04 prefix)
/// 3. Hash the remaining 64 bytes with Keccak-256
/// 4. Take the last 20 bytes of the hash
#[inline]
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let public_key_bytes = public_key.serialize_uncompressed();

    let mut hasher = Keccak::v256();
    hasher.update(&public_key_bytes[1..]);

    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut address_bytes = [0u8; 20];
    address_bytes.copy_from_slice(&hash[12..]);

    Address::from_bytes(address_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CandidateSource, OsCandidateSource};

    // secp256k1 group order n
    const CURVE_ORDER: [u8; 32] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C,
        0xD0, 0x36, 0x41, 0x41,
    ];

    fn key(last: u8) -> Candidate {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        Candidate::from_bytes(bytes)
    }

    #[test]
    fn test_known_addresses() {
        let deriver = AddressDeriver::new();
        assert_eq!(
            deriver.derive(&key(1)).unwrap().as_str(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(
            deriver.derive(&key(2)).unwrap().as_str(),
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let deriver = AddressDeriver::new();
        let other = AddressDeriver::new();
        let mut source = OsCandidateSource::new();
        for _ in 0..16 {
            let candidate = source.next_candidate().unwrap();
            let first = deriver.derive(&candidate).unwrap();
            assert_eq!(first, deriver.derive(&candidate).unwrap());
            assert_eq!(first, other.derive(&candidate).unwrap());
            assert_eq!(first.as_str().len(), 42);
            assert!(first.body().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_invalid_scalars_rejected() {
        let deriver = AddressDeriver::new();
        assert_eq!(
            deriver.derive(&Candidate::from_bytes([0u8; 32])),
            Err(CryptoError::InvalidCandidate)
        );
        assert_eq!(
            deriver.derive(&Candidate::from_bytes(CURVE_ORDER)),
            Err(CryptoError::InvalidCandidate)
        );
        assert_eq!(
            deriver.derive(&Candidate::from_bytes([0xFF; 32])),
            Err(CryptoError::InvalidCandidate)
        );
    }
}
