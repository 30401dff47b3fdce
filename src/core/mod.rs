//! Core primitives.
//!
//! Validated boundary types, domain-separated hashing, M31 encoding and
//! fixed-point payout amounts. Everything here is pure and deterministic.

pub mod amount;
pub mod hash;
pub mod hex_serde;
pub mod types;

// Re-export core types
pub use amount::{to_base_units, AmountError, BaseUnits, SATS_PER_BTC};
pub use hash::{digest_to_m31, hash_with_domain, Digest32, DomainHasher, M31, M31_PRIME};
pub use types::{CircuitRef, CommitmentHash, InputError, OracleRef, Outcome};
