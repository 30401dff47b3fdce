//! Proof Engine Interface
//!
//! The STARK prover is an external collaborator. This module defines the
//! seam it plugs into, a serializing wrapper for engines that are not
//! thread-safe, and the default hash-commitment backend.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::DomainHasher;
use crate::core::types::{CircuitRef, CommitmentHash};
use crate::proof::public_inputs::ProofPublicInputs;

/// The triple a proof attests to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofStatement {
    /// Circuit that performed the computation.
    pub circuit: CircuitRef,

    /// Commitment to the input state.
    pub input_hash: CommitmentHash,

    /// Commitment to the output state.
    pub output_hash: CommitmentHash,
}

impl ProofStatement {
    /// Public inputs for this statement.
    pub fn public_inputs(&self) -> ProofPublicInputs {
        ProofPublicInputs::from_statement(self)
    }
}

/// Failures reported by a proof engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Engine has no circuit by this name.
    #[error("unknown circuit: {0}")]
    UnknownCircuit(String),

    /// Commitments cannot be satisfied by the circuit.
    #[error("unsatisfiable statement: {0}")]
    Unsatisfiable(String),

    /// Proof bytes are not in the engine's format.
    #[error("invalid proof format: {0}")]
    InvalidProofFormat(String),

    /// Engine is temporarily unavailable.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    /// Whether retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Interface for STWO proof generation and verification.
///
/// Implementations must be safe to call from several threads at once.
/// Wrap single-threaded backends in [`Serialized`].
pub trait ProofEngine: Send + Sync {
    /// Backend name recorded in every proof.
    fn name(&self) -> &str;

    /// Produce proof bytes for a statement.
    fn prove(&self, statement: &ProofStatement) -> Result<Vec<u8>, EngineError>;

    /// Check proof bytes against a statement.
    fn verify(&self, statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError>;
}

impl<E: ProofEngine + ?Sized> ProofEngine for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn prove(&self, statement: &ProofStatement) -> Result<Vec<u8>, EngineError> {
        (**self).prove(statement)
    }

    fn verify(&self, statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError> {
        (**self).verify(statement, proof)
    }
}

/// A backend that needs exclusive access for each call.
pub trait ExclusiveProofEngine: Send {
    /// Backend name.
    fn name(&self) -> &str;

    /// Produce proof bytes for a statement.
    fn prove(&mut self, statement: &ProofStatement) -> Result<Vec<u8>, EngineError>;

    /// Check proof bytes against a statement.
    fn verify(&mut self, statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError>;
}

/// Runs an [`ExclusiveProofEngine`] one call at a time behind a mutex.
pub struct Serialized<E> {
    name: String,
    inner: Mutex<E>,
}

impl<E: ExclusiveProofEngine> Serialized<E> {
    /// Wrap an engine.
    pub fn new(engine: E) -> Self {
        Self {
            name: engine.name().to_string(),
            inner: Mutex::new(engine),
        }
    }

    fn with_engine<T>(
        &self,
        f: impl FnOnce(&mut E) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut engine = self
            .inner
            .lock()
            .map_err(|_| EngineError::Unavailable("engine lock poisoned".into()))?;
        f(&mut engine)
    }
}

impl<E: ExclusiveProofEngine> ProofEngine for Serialized<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn prove(&self, statement: &ProofStatement) -> Result<Vec<u8>, EngineError> {
        self.with_engine(|engine| engine.prove(statement))
    }

    fn verify(&self, statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError> {
        self.with_engine(|engine| engine.verify(statement, proof))
    }
}

// =============================================================================
// DIGEST ENGINE (default backend)
// =============================================================================

/// Magic prefix of digest-engine proofs.
const DIGEST_PROOF_MAGIC: &[u8; 4] = b"SDP1";

/// Encoded digest proof length: magic + nonce + commitment.
pub const DIGEST_PROOF_LEN: usize = 4 + 32 + 32;

/// Hash-commitment stand-in for the STWO prover.
///
/// Binds the statement's public inputs and a fresh random nonce into a
/// SHA-256 commitment. Two proofs of the same statement differ in their
/// nonce but both verify.
#[derive(Clone, Debug)]
pub struct DigestProofEngine {
    circuits: BTreeSet<String>,
}

impl DigestProofEngine {
    /// Engine name recorded in proofs.
    pub const NAME: &'static str = "stwo-digest-v1";

    /// Create an engine that knows the given circuits.
    pub fn new<I, S>(circuits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            circuits: circuits.into_iter().map(Into::into).collect(),
        }
    }

    fn commitment(statement: &ProofStatement, nonce: &[u8]) -> [u8; 32] {
        let mut hasher = DomainHasher::for_proof_commitment();
        hasher.update_str(statement.circuit.as_str());
        hasher.update_bytes(statement.input_hash.as_bytes());
        hasher.update_bytes(statement.output_hash.as_bytes());
        for element in statement.public_inputs().to_m31_array() {
            hasher.update_u32(element);
        }
        hasher.update_bytes(nonce);
        hasher.finalize()
    }

    fn check_circuit(&self, statement: &ProofStatement) -> Result<(), EngineError> {
        if self.circuits.contains(statement.circuit.as_str()) {
            Ok(())
        } else {
            Err(EngineError::UnknownCircuit(statement.circuit.to_string()))
        }
    }
}

impl ProofEngine for DigestProofEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn prove(&self, statement: &ProofStatement) -> Result<Vec<u8>, EngineError> {
        self.check_circuit(statement)?;

        let mut nonce = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce);

        let commitment = Self::commitment(statement, &nonce);

        let mut proof = Vec::with_capacity(DIGEST_PROOF_LEN);
        proof.extend_from_slice(DIGEST_PROOF_MAGIC);
        proof.extend_from_slice(&nonce);
        proof.extend_from_slice(&commitment);
        Ok(proof)
    }

    fn verify(&self, statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError> {
        self.check_circuit(statement)?;

        if proof.len() != DIGEST_PROOF_LEN {
            return Err(EngineError::InvalidProofFormat(format!(
                "expected {} bytes, got {}",
                DIGEST_PROOF_LEN,
                proof.len()
            )));
        }
        if &proof[..4] != DIGEST_PROOF_MAGIC {
            return Err(EngineError::InvalidProofFormat("bad magic".into()));
        }

        let nonce = &proof[4..36];
        let expected = Self::commitment(statement, nonce);
        Ok(proof[36..] == expected)
    }
}
