//! Proof Engine Adapter
//!
//! Validates caller input, delegates to a [`ProofEngine`] and wraps the
//! result in a [`Proof`] that records exactly which statement it proves.
//! The adapter holds no state beyond its engine handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::hash::M31;
use crate::core::types::{CircuitRef, CommitmentHash, InputError};
use crate::proof::engine::{EngineError, ProofEngine, ProofStatement};
use crate::proof::public_inputs::ProofPublicInputs;

/// Current proof artifact version.
pub const PROOF_VERSION: u8 = 1;

/// A generated proof and the statement it is bound to.
///
/// Meaningful only for `statement`. Consumers re-verify with
/// [`Proof::verify_with`] before trusting it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Version for forward compatibility.
    #[serde(deserialize_with = "current_version")]
    pub version: u8,

    /// Unique id of this proof instance.
    pub proof_id: Uuid,

    /// Engine that produced the proof.
    pub backend: String,

    /// Circuit, input hash and output hash.
    pub statement: ProofStatement,

    /// Public inputs as M31 elements.
    pub public_inputs: Vec<M31>,

    /// Engine proof bytes.
    #[serde(with = "crate::core::hex_serde::bytes")]
    pub proof_bytes: Vec<u8>,

    /// Generation time.
    pub created_at: DateTime<Utc>,
}

fn current_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let version = u8::deserialize(deserializer)?;
    if version != PROOF_VERSION {
        return Err(de::Error::custom(format!("unsupported proof version {}", version)));
    }
    Ok(version)
}

impl Proof {
    /// Check whether this proof was produced for the given triple.
    pub fn is_bound_to(&self, statement: &ProofStatement) -> bool {
        self.statement == *statement
    }

    /// Re-verify this proof against a triple with an engine.
    ///
    /// Fails if the triple differs from the bound statement, if the public
    /// inputs were altered, or if the engine rejects the proof bytes.
    pub fn verify_with(
        &self,
        engine: &dyn ProofEngine,
        statement: &ProofStatement,
    ) -> Result<(), ProofVerificationError> {
        if !self.is_bound_to(statement) {
            return Err(ProofVerificationError::StatementMismatch);
        }
        if ProofPublicInputs::from_slice(&self.public_inputs) != Some(statement.public_inputs()) {
            return Err(ProofVerificationError::PublicInputMismatch);
        }
        if self.backend != engine.name() {
            return Err(ProofVerificationError::BackendMismatch {
                expected: engine.name().to_string(),
                got: self.backend.clone(),
            });
        }

        match engine.verify(statement, &self.proof_bytes)? {
            true => Ok(()),
            false => Err(ProofVerificationError::VerificationFailed),
        }
    }
}

/// Errors from [`ProofAdapter::generate_proof`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// Malformed input, rejected before reaching the engine.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InputError),

    /// Engine could not produce a proof.
    #[error("proof generation failed: {diagnostic}")]
    ProofGenerationFailed {
        /// Engine diagnostic.
        diagnostic: String,
        /// Whether a retry might succeed.
        retryable: bool,
    },
}

impl From<EngineError> for ProofError {
    fn from(err: EngineError) -> Self {
        Self::ProofGenerationFailed {
            retryable: err.is_transient(),
            diagnostic: err.to_string(),
        }
    }
}

/// Errors during proof re-verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofVerificationError {
    /// Triple to verify against is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(InputError),

    /// Proof was generated for a different triple.
    #[error("proof is bound to a different statement")]
    StatementMismatch,

    /// Public inputs don't match the statement.
    #[error("public input mismatch")]
    PublicInputMismatch,

    /// Proof came from another backend.
    #[error("backend mismatch: expected {expected}, got {got}")]
    BackendMismatch {
        /// Verifying engine.
        expected: String,
        /// Engine named in the proof.
        got: String,
    },

    /// Engine rejected the proof.
    #[error("verification failed")]
    VerificationFailed,

    /// Engine error while verifying.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Validates input and delegates proof generation to an engine.
#[derive(Clone)]
pub struct ProofAdapter {
    engine: Arc<dyn ProofEngine>,
}

impl ProofAdapter {
    /// Create an adapter over an engine.
    pub fn new(engine: Arc<dyn ProofEngine>) -> Self {
        Self { engine }
    }

    /// Underlying engine.
    pub fn engine(&self) -> &dyn ProofEngine {
        self.engine.as_ref()
    }

    /// Parse the raw triple into a statement.
    pub fn parse_statement(
        circuit: &str,
        input_hash: &str,
        output_hash: &str,
    ) -> Result<ProofStatement, InputError> {
        Ok(ProofStatement {
            circuit: CircuitRef::parse(circuit)?,
            input_hash: CommitmentHash::parse_field(input_hash, "input_hash")?,
            output_hash: CommitmentHash::parse_field(output_hash, "output_hash")?,
        })
    }

    /// Generate a proof that `circuit` maps `input_hash` to `output_hash`.
    ///
    /// Repeat calls with identical inputs may return different encodings;
    /// each one verifies.
    pub fn generate_proof(
        &self,
        circuit: &str,
        input_hash: &str,
        output_hash: &str,
    ) -> Result<Proof, ProofError> {
        let statement = Self::parse_statement(circuit, input_hash, output_hash)?;
        self.prove_statement(statement)
    }

    /// Generate a proof for an already validated statement.
    pub fn prove_statement(&self, statement: ProofStatement) -> Result<Proof, ProofError> {
        debug!(
            "Proving circuit {} for input {}",
            statement.circuit,
            &statement.input_hash.to_hex()[..8]
        );

        let proof_bytes = self.engine.prove(&statement).map_err(|e| {
            warn!("Engine {} failed: {}", self.engine.name(), e);
            ProofError::from(e)
        })?;

        if proof_bytes.is_empty() {
            return Err(ProofError::ProofGenerationFailed {
                diagnostic: "engine returned an empty proof".into(),
                retryable: false,
            });
        }

        Ok(Proof {
            version: PROOF_VERSION,
            proof_id: Uuid::new_v4(),
            backend: self.engine.name().to_string(),
            public_inputs: statement.public_inputs().to_m31_array().to_vec(),
            statement,
            proof_bytes,
            created_at: Utc::now(),
        })
    }

    /// Re-verify a proof against a raw triple.
    pub fn verify_proof(
        &self,
        proof: &Proof,
        circuit: &str,
        input_hash: &str,
        output_hash: &str,
    ) -> Result<(), ProofVerificationError> {
        let statement = Self::parse_statement(circuit, input_hash, output_hash)
            .map_err(ProofVerificationError::InvalidArgument)?;
        proof.verify_with(self.engine(), &statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::engine::DigestProofEngine;

    const INPUT: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const OUTPUT: &str = "2222222222222222222222222222222222222222222222222222222222222222";

    fn adapter() -> ProofAdapter {
        ProofAdapter::new(Arc::new(DigestProofEngine::new(["hash_integrity"])))
    }

    /// Engine that records whether it was reached and fails on demand.
    struct FakeEngine {
        result: Result<Vec<u8>, EngineError>,
        called: std::sync::atomic::AtomicBool,
    }

    impl FakeEngine {
        fn new(result: Result<Vec<u8>, EngineError>) -> Self {
            Self { result, called: std::sync::atomic::AtomicBool::new(false) }
        }

        fn was_called(&self) -> bool {
            self.called.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl ProofEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn prove(&self, _statement: &ProofStatement) -> Result<Vec<u8>, EngineError> {
            self.called.store(true, std::sync::atomic::Ordering::SeqCst);
            self.result.clone()
        }

        fn verify(&self, _statement: &ProofStatement, proof: &[u8]) -> Result<bool, EngineError> {
            Ok(self.result.as_deref() == Ok(proof))
        }
    }

    #[test]
    fn test_generate_proof() {
        let proof = adapter().generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();

        assert_eq!(proof.version, PROOF_VERSION);
        assert_eq!(proof.backend, DigestProofEngine::NAME);
        assert_eq!(proof.statement.circuit.as_str(), "hash_integrity");
        assert_eq!(proof.statement.input_hash.to_hex(), INPUT);
        assert_eq!(proof.statement.output_hash.to_hex(), OUTPUT);
        assert_eq!(proof.public_inputs.len(), 24);
    }

    #[test]
    fn test_invalid_input_never_reaches_engine() {
        let engine = Arc::new(FakeEngine::new(Ok(vec![1])));
        let adapter = ProofAdapter::new(engine.clone());

        for (circuit, input, output) in [
            ("", INPUT, OUTPUT),
            ("hash_integrity", "", OUTPUT),
            ("hash_integrity", INPUT, "not-hex"),
        ] {
            let err = adapter.generate_proof(circuit, input, output).unwrap_err();
            assert!(matches!(err, ProofError::InvalidArgument(_)));
        }

        assert!(!engine.was_called());
    }

    #[test]
    fn test_engine_failure_passes_through() {
        let engine = Arc::new(FakeEngine::new(Err(EngineError::Unsatisfiable("no witness".into()))));
        let adapter = ProofAdapter::new(engine.clone());

        let err = adapter.generate_proof("any", INPUT, OUTPUT).unwrap_err();
        assert_eq!(
            err,
            ProofError::ProofGenerationFailed {
                diagnostic: "unsatisfiable statement: no witness".into(),
                retryable: false,
            }
        );
        assert!(engine.was_called());
    }

    #[test]
    fn test_transient_failure_is_retryable() {
        let engine = Arc::new(FakeEngine::new(Err(EngineError::Unavailable("busy".into()))));
        let err = ProofAdapter::new(engine).generate_proof("any", INPUT, OUTPUT).unwrap_err();

        assert!(matches!(err, ProofError::ProofGenerationFailed { retryable: true, .. }));
    }

    #[test]
    fn test_empty_engine_output_rejected() {
        let engine = Arc::new(FakeEngine::new(Ok(Vec::new())));
        let err = ProofAdapter::new(engine).generate_proof("any", INPUT, OUTPUT).unwrap_err();

        assert!(matches!(err, ProofError::ProofGenerationFailed { retryable: false, .. }));
    }

    #[test]
    fn test_unknown_circuit_fails() {
        let err = adapter().generate_proof("unknown", INPUT, OUTPUT).unwrap_err();
        assert!(matches!(err, ProofError::ProofGenerationFailed { .. }));
    }

    #[test]
    fn test_verify_proof_against_triple() {
        let adapter = adapter();
        let proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();

        assert!(adapter.verify_proof(&proof, "hash_integrity", INPUT, OUTPUT).is_ok());

        // Reuse against a different triple is refused
        assert_eq!(
            adapter.verify_proof(&proof, "hash_integrity", OUTPUT, INPUT),
            Err(ProofVerificationError::StatementMismatch)
        );
    }

    #[test]
    fn test_malformed_triple_is_invalid_argument() {
        let adapter = adapter();
        let proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();

        assert_eq!(
            adapter.verify_proof(&proof, "hash_integrity", INPUT, "not-hex"),
            Err(ProofVerificationError::InvalidArgument(InputError::WrongLength {
                field: "output_hash",
                expected: 64,
                got: 7,
            }))
        );
        assert!(matches!(
            adapter.verify_proof(&proof, "", INPUT, OUTPUT),
            Err(ProofVerificationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_truncated_public_inputs_fail() {
        let adapter = adapter();
        let mut proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();
        proof.public_inputs.pop();

        assert_eq!(
            adapter.verify_proof(&proof, "hash_integrity", INPUT, OUTPUT),
            Err(ProofVerificationError::PublicInputMismatch)
        );
    }

    #[test]
    fn test_unknown_version_rejected() {
        let proof = adapter().generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        assert_eq!(serde_json::from_str::<Proof>(&json).unwrap(), proof);

        let future = json.replacen("\"version\":1", "\"version\":2", 1);
        let err = serde_json::from_str::<Proof>(&future).unwrap_err();
        assert!(err.to_string().contains("unsupported proof version 2"));
    }

    #[test]
    fn test_tampered_proof_fails() {
        let adapter = adapter();
        let mut proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();
        let last = proof.proof_bytes.len() - 1;
        proof.proof_bytes[last] ^= 0x01;

        assert_eq!(
            adapter.verify_proof(&proof, "hash_integrity", INPUT, OUTPUT),
            Err(ProofVerificationError::VerificationFailed)
        );
    }

    #[test]
    fn test_rebound_statement_fails() {
        let adapter = adapter();
        let mut proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();

        // Swap the bound statement without regenerating public inputs
        proof.statement.output_hash = CommitmentHash::parse(INPUT).unwrap();

        assert_eq!(
            adapter.verify_proof(&proof, "hash_integrity", INPUT, INPUT),
            Err(ProofVerificationError::PublicInputMismatch)
        );
    }
}
