//! Validated Boundary Types
//!
//! Raw strings from the host are parsed into these types at the edge.
//! Everything past the parse step works on validated values only.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::Digest32;

/// Maximum length of a circuit identifier in bytes.
pub const MAX_CIRCUIT_LEN: usize = 128;

/// Maximum length of an outcome label in bytes.
pub const MAX_OUTCOME_LEN: usize = 256;

/// Maximum length of an oracle reference in bytes.
pub const MAX_ORACLE_LEN: usize = 256;

/// Hex length of a commitment hash (SHA-256).
pub const COMMITMENT_HEX_LEN: usize = 64;

/// Errors raised while parsing caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Argument was not supplied (null pointer at the C boundary).
    #[error("{field} is missing")]
    Missing {
        /// Argument name.
        field: &'static str,
    },
    /// Argument is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Argument name.
        field: &'static str,
    },
    /// Argument is empty.
    #[error("{field} is empty")]
    Empty {
        /// Argument name.
        field: &'static str,
    },
    /// Argument exceeds its length limit.
    #[error("{field} is {len} bytes, limit is {max}")]
    TooLong {
        /// Argument name.
        field: &'static str,
        /// Limit in bytes.
        max: usize,
        /// Actual length.
        len: usize,
    },
    /// Argument contains a control character.
    #[error("{field} contains a control character")]
    ControlCharacter {
        /// Argument name.
        field: &'static str,
    },
    /// Argument has leading or trailing whitespace.
    #[error("{field} has leading or trailing whitespace")]
    SurroundingWhitespace {
        /// Argument name.
        field: &'static str,
    },
    /// Argument is not hexadecimal.
    #[error("{field} is not hexadecimal")]
    InvalidHex {
        /// Argument name.
        field: &'static str,
    },
    /// Argument has the wrong length.
    #[error("{field} must be {expected} characters, got {got}")]
    WrongLength {
        /// Argument name.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// A list argument could not be parsed.
    #[error("{field} is not a valid list: {reason}")]
    MalformedList {
        /// Argument name.
        field: &'static str,
        /// Parser diagnostic.
        reason: String,
    },
    /// A count argument is negative or inconsistent with its buffer.
    #[error("{field} has invalid length {len}")]
    InvalidLength {
        /// Argument name.
        field: &'static str,
        /// Supplied length.
        len: i64,
    },
}

/// Shared label rules: non-empty, bounded, no control characters.
fn check_label(value: &str, field: &'static str, max: usize) -> Result<(), InputError> {
    if value.is_empty() {
        return Err(InputError::Empty { field });
    }
    if value.len() > max {
        return Err(InputError::TooLong { field, max, len: value.len() });
    }
    if value.chars().any(char::is_control) {
        return Err(InputError::ControlCharacter { field });
    }
    Ok(())
}

// =============================================================================
// CIRCUIT REFERENCE
// =============================================================================

/// Opaque name of a computation known to the proof engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CircuitRef(String);

impl CircuitRef {
    /// Parse a circuit identifier.
    pub fn parse(value: &str) -> Result<Self, InputError> {
        check_label(value, "circuit", MAX_CIRCUIT_LEN)?;
        Ok(Self(value.to_string()))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CircuitRef {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_label(&value, "circuit", MAX_CIRCUIT_LEN)?;
        Ok(Self(value))
    }
}

impl From<CircuitRef> for String {
    fn from(value: CircuitRef) -> Self {
        value.0
    }
}

impl fmt::Display for CircuitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// COMMITMENT HASH
// =============================================================================

/// Commitment to an input or output state: a SHA-256 digest.
///
/// Text form is 64 lowercase hex characters; uppercase input is accepted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentHash(Digest32);

impl CommitmentHash {
    /// Parse a hex commitment, naming `field` in errors.
    pub fn parse_field(value: &str, field: &'static str) -> Result<Self, InputError> {
        if value.is_empty() {
            return Err(InputError::Empty { field });
        }
        if value.len() != COMMITMENT_HEX_LEN {
            return Err(InputError::WrongLength {
                field,
                expected: COMMITMENT_HEX_LEN,
                got: value.len(),
            });
        }
        let mut digest = [0u8; 32];
        hex::decode_to_slice(value, &mut digest).map_err(|_| InputError::InvalidHex { field })?;
        Ok(Self(digest))
    }

    /// Parse a hex commitment.
    pub fn parse(value: &str) -> Result<Self, InputError> {
        Self::parse_field(value, "commitment hash")
    }

    /// Wrap raw digest bytes.
    pub fn from_digest(digest: Digest32) -> Self {
        Self(digest)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &Digest32 {
        &self.0
    }

    /// Canonical lowercase hex text.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<String> for CommitmentHash {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommitmentHash> for String {
    fn from(value: CommitmentHash) -> Self {
        value.to_hex()
    }
}

impl fmt::Debug for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentHash({})", self.to_hex())
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Label for one mutually exclusive future state.
///
/// The label text is kept byte-for-byte; no trimming or case folding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Outcome(String);

impl Outcome {
    /// Parse an outcome label.
    pub fn parse(value: &str) -> Result<Self, InputError> {
        Self::check(value)?;
        Ok(Self(value.to_string()))
    }

    fn check(value: &str) -> Result<(), InputError> {
        check_label(value, "outcome", MAX_OUTCOME_LEN)?;
        if value.trim() != value {
            return Err(InputError::SurroundingWhitespace { field: "outcome" });
        }
        Ok(())
    }

    /// Label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Outcome {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::check(&value)?;
        Ok(Self(value))
    }
}

impl From<Outcome> for String {
    fn from(value: Outcome) -> Self {
        value.0
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ORACLE REFERENCE
// =============================================================================

/// Identifier or public key of the attesting oracle.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OracleRef(String);

impl OracleRef {
    /// Parse an oracle reference.
    pub fn parse(value: &str) -> Result<Self, InputError> {
        check_label(value, "oracle", MAX_ORACLE_LEN)?;
        Ok(Self(value.to_string()))
    }

    /// Reference text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OracleRef {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_label(&value, "oracle", MAX_ORACLE_LEN)?;
        Ok(Self(value))
    }
}

impl From<OracleRef> for String {
    fn from(value: OracleRef) -> Self {
        value.0
    }
}

impl fmt::Display for OracleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
