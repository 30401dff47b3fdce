//! Domain-Separated Hashing
//!
//! Provides deterministic SHA-256 hashing for:
//! - Proof commitments (binding a proof to its statement)
//! - Contract identifiers
//! - Oracle attestation digests
//!
//! Also holds the Mersenne-31 encoding used for STWO public inputs.

use sha2::{Digest, Sha256};

/// SHA-256 output.
pub type Digest32 = [u8; 32];

/// Domain separator for proof commitments.
pub const PROOF_COMMITMENT_DOMAIN: &[u8] = b"STWO_DLC_PROOF_COMMIT_V1";

/// Domain separator for circuit identifiers in public inputs.
pub const CIRCUIT_ID_DOMAIN: &[u8] = b"STWO_DLC_CIRCUIT_V1";

/// Domain separator for contract identifiers.
pub const CONTRACT_ID_DOMAIN: &[u8] = b"STWO_DLC_CONTRACT_V1";

/// SHA-256 hasher that starts with a domain tag.
///
/// Callers feed fields in a fixed order; changing the order changes every
/// digest built with it.
pub struct DomainHasher {
    inner: Sha256,
}

impl DomainHasher {
    /// Start a hasher under `domain`.
    pub fn new(domain: &[u8]) -> Self {
        Self {
            inner: Sha256::new_with_prefix(domain),
        }
    }

    /// Hasher for proof commitments.
    pub fn for_proof_commitment() -> Self {
        Self::new(PROOF_COMMITMENT_DOMAIN)
    }

    /// Hasher for contract identifiers.
    pub fn for_contract_id() -> Self {
        Self::new(CONTRACT_ID_DOMAIN)
    }

    /// Feed raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Feed a u32, little-endian.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.inner.update(value.to_le_bytes());
    }

    /// Feed a u64, little-endian.
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.inner.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string.
    ///
    /// The prefix keeps `("ab", "c")` and `("a", "bc")` apart.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.inner.update(value.as_bytes());
    }

    /// Consume the hasher and return the digest.
    pub fn finalize(self) -> Digest32 {
        self.inner.finalize().into()
    }
}

/// Plain SHA-256, no domain tag.
pub fn hash_bytes(data: &[u8]) -> Digest32 {
    Sha256::digest(data).into()
}

/// SHA-256 of `data` under `domain`.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = DomainHasher::new(domain);
    hasher.update_bytes(data);
    hasher.finalize()
}

// =============================================================================
// M31 FIELD ENCODING (for STWO proofs)
// =============================================================================

/// Mersenne-31 prime: 2^31 - 1
pub const M31_PRIME: u32 = 2147483647;

/// M31 field element (u32 < 2^31 - 1).
pub type M31 = u32;

/// Encode a 32-byte digest to 8 M31 elements.
///
/// Splits the digest into 8 little-endian words and reduces each mod M31.
pub fn digest_to_m31(digest: &Digest32) -> [M31; 8] {
    let mut result = [0u32; 8];
    for (slot, chunk) in result.iter_mut().zip(digest.chunks_exact(4)) {
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        *slot = word % M31_PRIME;
    }
    result
}

// =============================================================================
// TESTS
// =============================================================================
