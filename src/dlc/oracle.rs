//! Oracle Outcome Attestation
//!
//! Builds the canonical message for an outcome and has an attestation key
//! sign it. The message is a pure function of the outcome, so any verifier
//! can rebuild it from the label alone.
//!
//! ```text
//! canonical message = UTF-8 bytes of the outcome label (unchanged)
//! signed payload    = ORACLE_ATTESTATION_DOMAIN
//!                     || u32 LE length of message
//!                     || message
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::types::{InputError, Outcome};

/// Domain separator for oracle attestations.
pub const ORACLE_ATTESTATION_DOMAIN: &[u8] = b"STWO_DLC_ORACLE_ATTEST_V1";

/// Current signature artifact version.
pub const SIGNATURE_VERSION: u8 = 1;

/// Scheme name for Ed25519 attestations.
pub const ED25519_SCHEME: &str = "ed25519";

/// Canonical message for an outcome.
pub fn canonical_message(outcome: &Outcome) -> &[u8] {
    outcome.as_str().as_bytes()
}

/// Bytes handed to the signature primitive for an outcome.
pub fn signing_payload(outcome: &Outcome) -> Vec<u8> {
    let message = canonical_message(outcome);
    let mut payload = Vec::with_capacity(ORACLE_ATTESTATION_DOMAIN.len() + 4 + message.len());
    payload.extend_from_slice(ORACLE_ATTESTATION_DOMAIN);
    payload.extend_from_slice(&(message.len() as u32).to_le_bytes());
    payload.extend_from_slice(message);
    payload
}

/// Failures reported by an attestation key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key material cannot be reached.
    #[error("key unavailable: {0}")]
    Unavailable(String),

    /// The primitive refused to sign.
    #[error("signature primitive failed: {0}")]
    Primitive(String),
}

/// External signature primitive used by the oracle signer.
pub trait AttestationKey: Send + Sync {
    /// Scheme name recorded in signatures.
    fn scheme(&self) -> &str;

    /// Public key bytes.
    fn public_key(&self) -> Vec<u8>;

    /// Sign a payload.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError>;
}

/// Ed25519 attestation key.
pub struct Ed25519AttestationKey {
    key: SigningKey,
}

impl Ed25519AttestationKey {
    /// Key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { key: SigningKey::from_bytes(seed) }
    }

    /// Fresh random key.
    pub fn generate() -> Self {
        Self { key: SigningKey::generate(&mut OsRng) }
    }

    /// Verifying half of the key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl AttestationKey for Ed25519AttestationKey {
    fn scheme(&self) -> &str {
        ED25519_SCHEME
    }

    fn public_key(&self) -> Vec<u8> {
        self.key.verifying_key().to_bytes().to_vec()
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError> {
        Ok(self.key.sign(payload).to_bytes().to_vec())
    }
}

/// Oracle attestation over one outcome.
///
/// Self-contained: carries everything needed to verify it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Version for forward compatibility.
    #[serde(deserialize_with = "current_version")]
    pub version: u8,

    /// Signature scheme.
    pub scheme: String,

    /// Attested outcome (the canonical message).
    pub outcome: Outcome,

    /// Oracle public key.
    #[serde(with = "crate::core::hex_serde::bytes")]
    pub oracle_public_key: Vec<u8>,

    /// Signature over the signing payload.
    #[serde(with = "crate::core::hex_serde::bytes")]
    pub signature: Vec<u8>,

    /// Signing time (not covered by the signature).
    pub signed_at: DateTime<Utc>,
}

fn current_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let version = u8::deserialize(deserializer)?;
    if version != SIGNATURE_VERSION {
        return Err(de::Error::custom(format!("unsupported signature version {}", version)));
    }
    Ok(version)
}

/// Errors verifying an attestation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestationError {
    /// Scheme is not supported by this verifier.
    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    /// Public key bytes are malformed.
    #[error("malformed public key")]
    MalformedPublicKey,

    /// Signature bytes are malformed.
    #[error("malformed signature")]
    MalformedSignature,

    /// Signature does not verify.
    #[error("signature does not verify")]
    InvalidSignature,
}

impl Signature {
    /// Canonical message this signature attests to.
    pub fn canonical_message(&self) -> &str {
        self.outcome.as_str()
    }

    /// Verify with the public key carried in the attestation.
    pub fn verify(&self) -> Result<(), AttestationError> {
        if self.scheme != ED25519_SCHEME {
            return Err(AttestationError::UnsupportedScheme(self.scheme.clone()));
        }

        let key_bytes: [u8; 32] = self
            .oracle_public_key
            .as_slice()
            .try_into()
            .map_err(|_| AttestationError::MalformedPublicKey)?;
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| AttestationError::MalformedPublicKey)?;
        let signature =
            Ed25519Signature::from_slice(&self.signature).map_err(|_| AttestationError::MalformedSignature)?;

        key.verify(&signing_payload(&self.outcome), &signature)
            .map_err(|_| AttestationError::InvalidSignature)
    }

    /// Verify and also require a specific oracle public key.
    pub fn verify_from(&self, oracle_public_key: &[u8]) -> Result<(), AttestationError> {
        if self.oracle_public_key != oracle_public_key {
            return Err(AttestationError::InvalidSignature);
        }
        self.verify()
    }
}

/// Errors from [`OracleSigner::sign_outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    /// Empty or malformed outcome, rejected before signing.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InputError),

    /// Signature primitive failed.
    #[error("signing failed: {diagnostic}")]
    SigningFailed {
        /// Primitive diagnostic.
        diagnostic: String,
        /// Whether a retry might succeed.
        retryable: bool,
    },
}

impl From<KeyError> for SignError {
    fn from(err: KeyError) -> Self {
        Self::SigningFailed {
            retryable: matches!(err, KeyError::Unavailable(_)),
            diagnostic: err.to_string(),
        }
    }
}

/// Signs outcomes on behalf of an oracle.
#[derive(Clone)]
pub struct OracleSigner {
    key: Arc<dyn AttestationKey>,
}

impl OracleSigner {
    /// Create a signer over an attestation key.
    pub fn new(key: Arc<dyn AttestationKey>) -> Self {
        Self { key }
    }

    /// Oracle public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.key.public_key()
    }

    /// Sign an outcome label.
    pub fn sign_outcome(&self, outcome: &str) -> Result<Signature, SignError> {
        let outcome = Outcome::parse(outcome)?;

        debug!("Signing outcome of {} bytes", outcome.as_str().len());

        let signature = self.key.sign(&signing_payload(&outcome)).map_err(|e| {
            warn!("Attestation key failed: {}", e);
            SignError::from(e)
        })?;

        Ok(Signature {
            version: SIGNATURE_VERSION,
            scheme: self.key.scheme().to_string(),
            outcome,
            oracle_public_key: self.key.public_key(),
            signature,
            signed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> OracleSigner {
        OracleSigner::new(Arc::new(Ed25519AttestationKey::from_seed(&[7; 32])))
    }

    struct LockedKey;

    impl AttestationKey for LockedKey {
        fn scheme(&self) -> &str {
            ED25519_SCHEME
        }

        fn public_key(&self) -> Vec<u8> {
            vec![0; 32]
        }

        fn sign(&self, _payload: &[u8]) -> Result<Vec<u8>, KeyError> {
            Err(KeyError::Unavailable("keychain locked".into()))
        }
    }

    #[test]
    fn test_canonical_message_is_label() {
        let signature = signer().sign_outcome("above_50k").unwrap();

        assert_eq!(signature.canonical_message(), "above_50k");
        assert_eq!(canonical_message(&signature.outcome), b"above_50k");
    }

    #[test]
    fn test_signing_payload_layout() {
        let outcome = Outcome::parse("above_50k").unwrap();
        let payload = signing_payload(&outcome);

        let (domain, rest) = payload.split_at(ORACLE_ATTESTATION_DOMAIN.len());
        assert_eq!(domain, ORACLE_ATTESTATION_DOMAIN);
        assert_eq!(&rest[..4], &9u32.to_le_bytes());
        assert_eq!(&rest[4..], b"above_50k");
    }

    #[test]
    fn test_signature_verifies() {
        let signer = signer();
        let signature = signer.sign_outcome("above_50k").unwrap();

        assert_eq!(signature.scheme, ED25519_SCHEME);
        assert!(signature.verify().is_ok());
        assert!(signature.verify_from(&signer.public_key()).is_ok());
    }

    #[test]
    fn test_signature_is_deterministic_for_outcome() {
        let a = signer().sign_outcome("above_50k").unwrap();
        let b = signer().sign_outcome("above_50k").unwrap();

        // Ed25519 is deterministic
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_swapped_outcome_fails() {
        let mut signature = signer().sign_outcome("above_50k").unwrap();
        signature.outcome = Outcome::parse("below_50k").unwrap();

        assert_eq!(signature.verify(), Err(AttestationError::InvalidSignature));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let signature = signer().sign_outcome("above_50k").unwrap();
        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(serde_json::from_str::<Signature>(&json).unwrap(), signature);

        let future = json.replacen("\"version\":1", "\"version\":7", 1);
        let err = serde_json::from_str::<Signature>(&future).unwrap_err();
        assert!(err.to_string().contains("unsupported signature version 7"));
    }

    #[test]
    fn test_wrong_oracle_fails() {
        let signature = signer().sign_outcome("above_50k").unwrap();
        let other = Ed25519AttestationKey::from_seed(&[8; 32]);

        assert_eq!(
            signature.verify_from(&other.public_key()),
            Err(AttestationError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_fields() {
        let mut signature = signer().sign_outcome("above_50k").unwrap();
        signature.signature.truncate(10);
        assert_eq!(signature.verify(), Err(AttestationError::MalformedSignature));

        signature.oracle_public_key.truncate(10);
        assert_eq!(signature.verify(), Err(AttestationError::MalformedPublicKey));

        signature.scheme = "schnorr".into();
        assert!(matches!(signature.verify(), Err(AttestationError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_empty_outcome_rejected() {
        assert_eq!(
            signer().sign_outcome(""),
            Err(SignError::InvalidArgument(InputError::Empty { field: "outcome" }))
        );
        assert!(matches!(signer().sign_outcome(" padded "), Err(SignError::InvalidArgument(_))));
    }

    #[test]
    fn test_key_failure_surfaces() {
        let signer = OracleSigner::new(Arc::new(LockedKey));

        assert_eq!(
            signer.sign_outcome("above_50k"),
            Err(SignError::SigningFailed {
                diagnostic: "key unavailable: keychain locked".into(),
                retryable: true,
            })
        );
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = Ed25519AttestationKey::generate();
        let b = Ed25519AttestationKey::generate();
        assert_ne!(a.public_key(), b.public_key());
        assert_eq!(a.verifying_key().to_bytes().to_vec(), a.public_key());
    }
}
