//! Bridge error taxonomy.
//!
//! Component errors convert into [`BridgeError`]; at the C boundary each
//! one collapses to an [`ErrorCode`] plus a message.

use thiserror::Error;

use crate::bridge::codec::CodecError;
use crate::core::types::InputError;
use crate::dlc::contract::ContractError;
use crate::dlc::oracle::SignError;
use crate::proof::adapter::ProofError;

/// Errors surfaced by the bridge facade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// Malformed or missing input, detected before delegation.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InputError),

    /// Proof engine could not produce a proof.
    #[error("proof generation failed: {diagnostic}")]
    ProofGenerationFailed {
        /// Engine diagnostic.
        diagnostic: String,
        /// Whether a retry might succeed.
        retryable: bool,
    },

    /// Contract inputs failed validation.
    #[error("contract validation failed: {0}")]
    ContractValidationFailed(#[from] ContractError),

    /// Signature primitive failed.
    #[error("signing failed: {diagnostic}")]
    SigningFailed {
        /// Primitive diagnostic.
        diagnostic: String,
        /// Whether a retry might succeed.
        retryable: bool,
    },

    /// Internal serialization fault. Indicates a bug in the bridge.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}

impl BridgeError {
    /// Stable code for the C error channel.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::ProofGenerationFailed { .. } => ErrorCode::ProofGenerationFailed,
            Self::ContractValidationFailed(_) => ErrorCode::ContractValidationFailed,
            Self::SigningFailed { .. } => ErrorCode::SigningFailed,
            Self::EncodingFailed(_) => ErrorCode::EncodingFailed,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProofGenerationFailed { retryable, .. } | Self::SigningFailed { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl From<ProofError> for BridgeError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::InvalidArgument(e) => Self::InvalidArgument(e),
            ProofError::ProofGenerationFailed { diagnostic, retryable } => {
                Self::ProofGenerationFailed { diagnostic, retryable }
            }
        }
    }
}

impl From<SignError> for BridgeError {
    fn from(err: SignError) -> Self {
        match err {
            SignError::InvalidArgument(e) => Self::InvalidArgument(e),
            SignError::SigningFailed { diagnostic, retryable } => Self::SigningFailed { diagnostic, retryable },
        }
    }
}

impl From<CodecError> for BridgeError {
    fn from(err: CodecError) -> Self {
        Self::EncodingFailed(err.to_string())
    }
}

/// Error codes reported through `stwo_dlc_last_error_code`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Last call succeeded.
    Ok = 0,
    /// Malformed or missing input.
    InvalidArgument = 1,
    /// Proof engine failure.
    ProofGenerationFailed = 2,
    /// Contract validation failure.
    ContractValidationFailed = 3,
    /// Signature primitive failure.
    SigningFailed = 4,
    /// Internal serialization fault.
    EncodingFailed = 5,
    /// Bridge could not start or panicked.
    Internal = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Ok as i32, 0);
        assert_eq!(ErrorCode::InvalidArgument as i32, 1);
        assert_eq!(ErrorCode::ProofGenerationFailed as i32, 2);
        assert_eq!(ErrorCode::ContractValidationFailed as i32, 3);
        assert_eq!(ErrorCode::SigningFailed as i32, 4);
        assert_eq!(ErrorCode::EncodingFailed as i32, 5);
        assert_eq!(ErrorCode::Internal as i32, 6);
    }

    #[test]
    fn test_component_errors_map() {
        let err = BridgeError::from(ProofError::InvalidArgument(InputError::Empty { field: "circuit" }));
        assert_eq!(err.code(), ErrorCode::InvalidArgument);

        let err = BridgeError::from(ProofError::ProofGenerationFailed {
            diagnostic: "busy".into(),
            retryable: true,
        });
        assert_eq!(err.code(), ErrorCode::ProofGenerationFailed);
        assert!(err.is_retryable());

        let err = BridgeError::from(ContractError::EmptyOutcomeSet);
        assert_eq!(err.code(), ErrorCode::ContractValidationFailed);
        assert!(!err.is_retryable());

        let err = BridgeError::from(SignError::SigningFailed {
            diagnostic: "locked".into(),
            retryable: false,
        });
        assert_eq!(err.code(), ErrorCode::SigningFailed);
        assert_eq!(err.to_string(), "signing failed: locked");
    }
}
