//! Discreet Log Contracts
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DLC                                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  payout.rs   - Positional payout schedule, base units       │
//! │  contract.rs - Validation and immutable contract            │
//! │  oracle.rs   - Canonical outcome message and attestation    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod contract;
pub mod oracle;
pub mod payout;

pub use contract::{build_contract, ContractBuilder, ContractError, DlcContract, CONTRACT_VERSION};
pub use oracle::{
    canonical_message, signing_payload, AttestationError, AttestationKey, Ed25519AttestationKey,
    KeyError, OracleSigner, SignError, Signature, ORACLE_ATTESTATION_DOMAIN,
};
pub use payout::PayoutSchedule;
