//! # STWO DLC Bridge
//!
//! Generates STWO proofs, builds Discreet Log Contracts and signs oracle
//! outcomes, handing every result across a C ABI as an owned JSON buffer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STWO DLC BRIDGE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Pure primitives                        │
//! │  ├── types.rs      - Validated boundary strings             │
//! │  ├── hash.rs       - Domain-separated SHA-256, M31          │
//! │  ├── amount.rs     - Fixed-point payout amounts             │
//! │  └── hex_serde.rs  - Hex serde helpers                      │
//! │                                                             │
//! │  proof/            - STWO proofs                            │
//! │  ├── public_inputs.rs - M31 public input layout             │
//! │  ├── engine.rs     - Prover seam and digest backend         │
//! │  └── adapter.rs    - Validation and Proof artifact          │
//! │                                                             │
//! │  dlc/              - Discreet Log Contracts                 │
//! │  ├── payout.rs     - Payout schedule                        │
//! │  ├── contract.rs   - Contract builder                       │
//! │  └── oracle.rs     - Outcome attestation                    │
//! │                                                             │
//! │  bridge/           - Boundary                               │
//! │  ├── codec.rs      - Tagged JSON envelope                   │
//! │  ├── buffer.rs     - Owned transfer buffers                 │
//! │  ├── facade.rs     - Bridge operations                      │
//! │  └── ffi.rs        - extern "C" surface                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Every buffer handed out is owned by the caller until it goes back
//! through the release function of its kind. In Rust the kinds are
//! separate types; in C the envelope tag is checked on release.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod core;
pub mod dlc;
pub mod error;
pub mod logging;
pub mod proof;

// Re-export commonly used types
pub use bridge::{Bridge, ContractBuffer, ProofBuffer, SignatureBuffer};
pub use config::BridgeConfig;
pub use dlc::{build_contract, DlcContract, OracleSigner, Signature};
pub use error::{BridgeError, ErrorCode};
pub use proof::{Proof, ProofAdapter, ProofEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
