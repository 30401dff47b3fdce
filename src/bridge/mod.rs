//! Bridge Layer
//!
//! Turns component results into owned, kind-tagged buffers and exposes them
//! to Rust callers and to C.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BRIDGE                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  codec.rs  - Tagged JSON envelope per artifact kind         │
//! │  buffer.rs - Owned transfer buffers, release discipline     │
//! │  facade.rs - Parse, delegate, encode                        │
//! │  ffi.rs    - extern "C" surface and last-error channel      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod codec;
pub mod facade;
pub mod ffi;

pub use buffer::{
    BufferKind, ContractBuffer, ContractKind, ProofBuffer, ProofKind, ReleaseViolation, SignatureBuffer,
    SignatureKind, TransferBuffer,
};
pub use codec::{Artifact, ArtifactKind, CodecError, ENVELOPE_VERSION};
pub use facade::Bridge;
