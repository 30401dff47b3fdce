//! Artifact Codec
//!
//! Wire format for artifacts handed across the boundary. Every artifact is
//! wrapped in a tagged JSON envelope so a buffer of one kind never decodes
//! as another.
//!
//! ```text
//! {"kind":"contract","version":1,"payload":{...}}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dlc::contract::DlcContract;
use crate::dlc::oracle::Signature;
use crate::proof::adapter::Proof;

/// Current envelope version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Artifact kinds that cross the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// STWO proof.
    Proof,
    /// DLC contract.
    Contract,
    /// Oracle attestation.
    Signature,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proof => write!(f, "proof"),
            Self::Contract => write!(f, "contract"),
            Self::Signature => write!(f, "signature"),
        }
    }
}

/// A domain object that can be encoded into a transfer buffer.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Envelope tag.
    const KIND: ArtifactKind;
}

impl Artifact for Proof {
    const KIND: ArtifactKind = ArtifactKind::Proof;
}

impl Artifact for DlcContract {
    const KIND: ArtifactKind = ArtifactKind::Contract;
}

impl Artifact for Signature {
    const KIND: ArtifactKind = ArtifactKind::Signature;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("failed to serialize {kind}: {reason}")]
    Serialize {
        /// Artifact kind.
        kind: ArtifactKind,
        /// serde_json diagnostic.
        reason: String,
    },

    /// Text is not a valid envelope or payload.
    #[error("failed to deserialize: {0}")]
    Deserialize(String),

    /// Envelope holds another artifact kind.
    #[error("expected {expected} artifact, found {found}")]
    KindMismatch {
        /// Requested kind.
        expected: ArtifactKind,
        /// Kind in the envelope.
        found: ArtifactKind,
    },

    /// Envelope version not understood.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// Encoded text contains a NUL byte.
    #[error("encoded text contains an interior NUL byte")]
    InteriorNul,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    kind: ArtifactKind,
    version: u8,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    payload: T,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    kind: ArtifactKind,
    version: u8,
}

/// Encode an artifact into envelope text.
pub fn encode<T: Artifact>(artifact: &T) -> Result<String, CodecError> {
    let envelope = EnvelopeRef {
        kind: T::KIND,
        version: ENVELOPE_VERSION,
        payload: artifact,
    };
    let text = serde_json::to_string(&envelope).map_err(|e| CodecError::Serialize {
        kind: T::KIND,
        reason: e.to_string(),
    })?;

    if text.contains('\0') {
        return Err(CodecError::InteriorNul);
    }
    Ok(text)
}

/// Read the kind tag of an envelope without decoding the payload.
pub fn peek_kind(text: &str) -> Result<ArtifactKind, CodecError> {
    let header: EnvelopeHeader =
        serde_json::from_str(text).map_err(|e| CodecError::Deserialize(e.to_string()))?;
    if header.version != ENVELOPE_VERSION {
        return Err(CodecError::UnsupportedVersion(header.version));
    }
    Ok(header.kind)
}

/// Decode envelope text into an artifact of the expected kind.
pub fn decode<T: Artifact>(text: &str) -> Result<T, CodecError> {
    let found = peek_kind(text)?;
    if found != T::KIND {
        return Err(CodecError::KindMismatch { expected: T::KIND, found });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(text).map_err(|e| CodecError::Deserialize(e.to_string()))?;
    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::dlc::contract::build_contract;
    use crate::dlc::oracle::{Ed25519AttestationKey, OracleSigner};
    use crate::proof::adapter::ProofAdapter;
    use crate::proof::engine::DigestProofEngine;
    use proptest::prelude::*;

    const INPUT: &str = "aa00000000000000000000000000000000000000000000000000000000000000";
    const OUTPUT: &str = "bb00000000000000000000000000000000000000000000000000000000000000";

    fn contract() -> DlcContract {
        build_contract(&["above_50k", "below_50k"], &[100.0, 0.0], "oracle_pub_abc").unwrap()
    }

    #[test]
    fn test_envelope_shape() {
        let text = encode(&contract()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["kind"], "contract");
        assert_eq!(value["version"], 1);
        assert_eq!(value["payload"]["oracle"], "oracle_pub_abc");
        assert_eq!(value["payload"]["outcomes"][0], "above_50k");
    }

    #[test]
    fn test_proof_roundtrip() {
        let adapter = ProofAdapter::new(Arc::new(DigestProofEngine::new(["hash_integrity"])));
        let proof = adapter.generate_proof("hash_integrity", INPUT, OUTPUT).unwrap();

        let decoded: Proof = decode(&encode(&proof).unwrap()).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_signature_roundtrip() {
        let signer = OracleSigner::new(Arc::new(Ed25519AttestationKey::from_seed(&[1; 32])));
        let signature = signer.sign_outcome("above_50k").unwrap();

        let decoded: Signature = decode(&encode(&signature).unwrap()).unwrap();
        assert_eq!(decoded, signature);
        assert!(decoded.verify().is_ok());
    }

    #[test]
    fn test_kind_mismatch() {
        let text = encode(&contract()).unwrap();

        assert_eq!(peek_kind(&text), Ok(ArtifactKind::Contract));
        assert_eq!(
            decode::<Proof>(&text).unwrap_err(),
            CodecError::KindMismatch {
                expected: ArtifactKind::Proof,
                found: ArtifactKind::Contract,
            }
        );
    }

    #[test]
    fn test_unsupported_version() {
        let text = encode(&contract()).unwrap().replace("\"version\":1,\"payload\"", "\"version\":9,\"payload\"");
        assert_eq!(peek_kind(&text), Err(CodecError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(decode::<DlcContract>("not json"), Err(CodecError::Deserialize(_))));
        assert!(matches!(peek_kind("{}"), Err(CodecError::Deserialize(_))));
    }

    #[test]
    fn test_payout_bits_survive_roundtrip() {
        // The first two decode one ULP off without exact float parsing
        for value in [971986.3718547629, 5.357830195732913e-76, 0.1, 1.0e-300, f64::MAX] {
            let contract = build_contract(&["a"], &[value], "oracle").unwrap();

            let decoded: DlcContract = decode(&encode(&contract).unwrap()).unwrap();
            assert_eq!(decoded.payouts().as_slice()[0].to_bits(), value.to_bits());
            assert_eq!(decoded.contract_id(), contract.contract_id());
        }
    }

    proptest! {
        #[test]
        fn prop_contract_roundtrip(
            payouts in prop::collection::vec(prop_oneof![0.0f64..1.0e12, prop::num::f64::POSITIVE | prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL], 1..8),
        ) {
            let outcomes: Vec<String> = (0..payouts.len()).map(|i| format!("outcome_{}", i)).collect();
            let contract = build_contract(&outcomes, &payouts, "oracle_pub_abc").unwrap();

            let decoded: DlcContract = decode(&encode(&contract).unwrap()).unwrap();
            prop_assert_eq!(decoded, contract);
        }
    }
}
