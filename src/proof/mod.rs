//! STWO Proof System
//!
//! Proves that a named circuit maps a committed input to a committed output.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  public_inputs.rs - M31 field encoding for STWO proofs      │
//! │  engine.rs        - Prover seam, serializing wrapper,       │
//! │                     digest backend                          │
//! │  adapter.rs       - Validation, delegation, Proof artifact  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod engine;
pub mod public_inputs;

// Re-export key types
pub use adapter::{Proof, ProofAdapter, ProofError, ProofVerificationError, PROOF_VERSION};
pub use engine::{
    DigestProofEngine, EngineError, ExclusiveProofEngine, ProofEngine, ProofStatement, Serialized,
};
pub use public_inputs::{ProofPublicInputs, PUBLIC_INPUT_ELEMENT_COUNT};
