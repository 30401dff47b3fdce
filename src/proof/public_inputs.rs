//! Proof Public Inputs
//!
//! Converts a proof statement (circuit, input hash, output hash) into M31
//! field elements for STWO proofs.

use serde::{Deserialize, Serialize};

use crate::core::hash::{digest_to_m31, hash_with_domain, CIRCUIT_ID_DOMAIN, M31};
use crate::proof::engine::ProofStatement;

/// Total number of M31 field elements in public inputs.
pub const PUBLIC_INPUT_ELEMENT_COUNT: usize = 24;

/// Public inputs for STWO proof verification.
///
/// Every field is a 32-byte digest split into 8 M31 elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPublicInputs {
    /// Circuit identifier digest.
    pub circuit_id: [M31; 8],

    /// Input commitment.
    pub input_hash: [M31; 8],

    /// Output commitment.
    pub output_hash: [M31; 8],
}

impl ProofPublicInputs {
    /// Generate public inputs from a statement.
    pub fn from_statement(statement: &ProofStatement) -> Self {
        let circuit_digest =
            hash_with_domain(CIRCUIT_ID_DOMAIN, statement.circuit.as_str().as_bytes());

        Self {
            circuit_id: digest_to_m31(&circuit_digest),
            input_hash: digest_to_m31(statement.input_hash.as_bytes()),
            output_hash: digest_to_m31(statement.output_hash.as_bytes()),
        }
    }

    /// Encode to flat M31 array (for STWO).
    pub fn to_m31_array(&self) -> [M31; PUBLIC_INPUT_ELEMENT_COUNT] {
        let mut arr = [0u32; PUBLIC_INPUT_ELEMENT_COUNT];
        let fields = self.circuit_id.iter().chain(&self.input_hash).chain(&self.output_hash);
        for (slot, &v) in arr.iter_mut().zip(fields) {
            *slot = v;
        }
        arr
    }

    /// Decode from flat M31 array.
    pub fn from_m31_array(arr: &[M31; PUBLIC_INPUT_ELEMENT_COUNT]) -> Self {
        let mut inputs = Self::default();
        inputs.circuit_id.copy_from_slice(&arr[0..8]);
        inputs.input_hash.copy_from_slice(&arr[8..16]);
        inputs.output_hash.copy_from_slice(&arr[16..24]);
        inputs
    }

    /// Decode from a slice, if it has the right length.
    pub fn from_slice(elements: &[M31]) -> Option<Self> {
        let arr: &[M31; PUBLIC_INPUT_ELEMENT_COUNT] = elements.try_into().ok()?;
        Some(Self::from_m31_array(arr))
    }
}
