//! Bridge Facade
//!
//! Single entry point for the three bridge operations. Each one parses its
//! arguments, delegates to the owning component and encodes the result into
//! a typed transfer buffer. The facade holds no mutable state and can be
//! shared across threads.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::bridge::buffer::{ContractBuffer, ProofBuffer, SignatureBuffer};
use crate::config::{BridgeConfig, OracleKeySource};
use crate::dlc::contract::build_contract;
use crate::dlc::oracle::{AttestationKey, Ed25519AttestationKey, OracleSigner};
use crate::error::BridgeError;
use crate::proof::adapter::ProofAdapter;
use crate::proof::engine::{DigestProofEngine, ProofEngine};

/// Proof and DLC bridge.
#[derive(Clone)]
pub struct Bridge {
    proofs: ProofAdapter,
    signer: OracleSigner,
}

impl Bridge {
    /// Create a bridge over an engine and an attestation key.
    pub fn new(engine: Arc<dyn ProofEngine>, key: Arc<dyn AttestationKey>) -> Self {
        Self {
            proofs: ProofAdapter::new(engine),
            signer: OracleSigner::new(key),
        }
    }

    /// Create a bridge with the default engine and key from configuration.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let engine = DigestProofEngine::new(config.circuits.iter().map(|c| c.as_str()));

        let key = match &config.oracle_key {
            OracleKeySource::Seed(seed) => Ed25519AttestationKey::from_seed(seed),
            OracleKeySource::Ephemeral => {
                warn!("No oracle key configured, using an ephemeral key");
                Ed25519AttestationKey::generate()
            }
        };

        let bridge = Self::new(Arc::new(engine), Arc::new(key));
        info!(
            "Bridge ready: engine={} circuits={} oracle={}",
            bridge.proofs.engine().name(),
            config.circuits.len(),
            short_hex(&bridge.oracle_public_key())
        );
        bridge
    }

    /// Proof adapter.
    pub fn proofs(&self) -> &ProofAdapter {
        &self.proofs
    }

    /// Oracle signer.
    pub fn signer(&self) -> &OracleSigner {
        &self.signer
    }

    /// Public key attestations verify against.
    pub fn oracle_public_key(&self) -> Vec<u8> {
        self.signer.public_key()
    }

    /// Prove that `circuit` maps `input_hash` to `output_hash`.
    #[instrument(skip(self), level = "debug")]
    pub fn generate_proof(
        &self,
        circuit: &str,
        input_hash: &str,
        output_hash: &str,
    ) -> Result<ProofBuffer, BridgeError> {
        let proof = self.proofs.generate_proof(circuit, input_hash, output_hash)?;
        debug!("Proof {} from {}", proof.proof_id, proof.backend);

        let buffer = ProofBuffer::encode(&proof)?;
        info!("Generated proof {} for circuit {}", proof.proof_id, proof.statement.circuit);
        Ok(buffer)
    }

    /// Validate contract terms and build the contract.
    #[instrument(skip(self, outcomes, payouts), fields(outcomes = outcomes.len()), level = "debug")]
    pub fn create_contract<S: AsRef<str>>(
        &self,
        outcomes: &[S],
        payouts: &[f64],
        oracle: &str,
    ) -> Result<ContractBuffer, BridgeError> {
        let contract = build_contract(outcomes, payouts, oracle).map_err(|e| {
            debug!("Contract rejected: {}", e);
            e
        })?;

        let buffer = ContractBuffer::encode(&contract)?;
        info!(
            "Created contract {} with {} outcomes",
            &contract.contract_id_hex()[..8],
            contract.outcomes().len()
        );
        Ok(buffer)
    }

    /// Sign an outcome as the oracle.
    #[instrument(skip(self, outcome), level = "debug")]
    pub fn sign_outcome(&self, outcome: &str) -> Result<SignatureBuffer, BridgeError> {
        let signature = self.signer.sign_outcome(outcome)?;

        let buffer = SignatureBuffer::encode(&signature)?;
        info!("Signed outcome with key {}", short_hex(&signature.oracle_public_key));
        Ok(buffer)
    }
}

/// First four bytes of an identifier, as hex.
fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}
