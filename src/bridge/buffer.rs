//! Transfer Buffers
//!
//! Owned, NUL-terminated encoded artifacts. A [`TransferBuffer`] is typed by
//! its artifact kind, so in Rust a proof buffer cannot be released through
//! the contract path. The raw-pointer functions at the bottom are the only
//! way across the C boundary; they mirror creation one-to-one.
//!
//! ## Caller obligations (C)
//!
//! - Release every non-null pointer exactly once, through the release
//!   function of the same kind.
//! - Never release a pointer not produced by this library.
//! - Never use a pointer after releasing it.
//!
//! Double release and foreign pointers are undefined behaviour. A release
//! through the wrong kind is detected while the buffer is still live.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr, CString};
use std::marker::PhantomData;

use thiserror::Error;

use crate::bridge::codec::{self, Artifact, ArtifactKind, CodecError};
use crate::dlc::contract::DlcContract;
use crate::dlc::oracle::Signature;
use crate::proof::adapter::Proof;

mod sealed {
    pub trait Sealed {}
}

/// Marker for the artifact kind carried by a buffer.
pub trait BufferKind: sealed::Sealed {
    /// Artifact type.
    type Artifact: Artifact;
}

/// Proof buffers.
#[derive(Debug)]
pub enum ProofKind {}

/// Contract buffers.
#[derive(Debug)]
pub enum ContractKind {}

/// Signature buffers.
#[derive(Debug)]
pub enum SignatureKind {}

impl sealed::Sealed for ProofKind {}
impl sealed::Sealed for ContractKind {}
impl sealed::Sealed for SignatureKind {}

impl BufferKind for ProofKind {
    type Artifact = Proof;
}

impl BufferKind for ContractKind {
    type Artifact = DlcContract;
}

impl BufferKind for SignatureKind {
    type Artifact = Signature;
}

/// Owned encoded artifact of kind `K`.
#[derive(Debug)]
pub struct TransferBuffer<K: BufferKind> {
    text: CString,
    _kind: PhantomData<K>,
}

/// Buffer holding an encoded [`Proof`].
pub type ProofBuffer = TransferBuffer<ProofKind>;

/// Buffer holding an encoded [`DlcContract`].
pub type ContractBuffer = TransferBuffer<ContractKind>;

/// Buffer holding an encoded [`Signature`].
pub type SignatureBuffer = TransferBuffer<SignatureKind>;

impl<K: BufferKind> TransferBuffer<K> {
    /// Encode an artifact into a new buffer.
    pub fn encode(artifact: &K::Artifact) -> Result<Self, CodecError> {
        let text = codec::encode(artifact)?;
        let text = CString::new(text).map_err(|_| CodecError::InteriorNul)?;
        Ok(Self { text, _kind: PhantomData })
    }

    /// Artifact kind of this buffer.
    pub fn kind(&self) -> ArtifactKind {
        <K::Artifact as Artifact>::KIND
    }

    /// Encoded text.
    pub fn as_str(&self) -> &str {
        // Built from a Rust String, so always UTF-8.
        self.text.to_str().unwrap_or_default()
    }

    /// Decode the artifact back out of the buffer.
    pub fn decode(&self) -> Result<K::Artifact, CodecError> {
        codec::decode(self.as_str())
    }

    /// Hand ownership to a C caller.
    pub fn into_raw(self) -> *mut c_char {
        self.text.into_raw()
    }

    /// Take back ownership of a pointer from [`Self::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` on a buffer of the same kind and must
    /// not have been reclaimed before.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        Self {
            text: CString::from_raw(ptr),
            _kind: PhantomData,
        }
    }

    /// Release the buffer. Consuming `self` makes a second release impossible.
    pub fn release(self) {
        drop(self);
    }
}

/// A release call that breaks the ownership contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseViolation {
    /// Buffer belongs to another release function.
    #[error("{found} buffer released as {expected}")]
    WrongKind {
        /// Kind of the release function.
        expected: ArtifactKind,
        /// Kind in the buffer.
        found: ArtifactKind,
    },

    /// Pointer does not hold a buffer from this bridge.
    #[error("pointer is not a {expected} buffer from this bridge")]
    Foreign {
        /// Kind of the release function.
        expected: ArtifactKind,
    },
}

/// Check buffer text against the kind of a release function.
pub fn check_release_kind<K: BufferKind>(text: &str) -> Result<(), ReleaseViolation> {
    let expected = <K::Artifact as Artifact>::KIND;
    match codec::peek_kind(text) {
        Ok(found) if found == expected => Ok(()),
        Ok(found) => Err(ReleaseViolation::WrongKind { expected, found }),
        Err(_) => Err(ReleaseViolation::Foreign { expected }),
    }
}

/// Release a raw pointer through the kind-`K` path.
///
/// Null is the failure sentinel and is accepted as a no-op. On a detected
/// violation the pointer is left untouched and the violation returned.
///
/// # Safety
///
/// `ptr` must be null or a live pointer from `into_raw`.
pub unsafe fn release_raw<K: BufferKind>(ptr: *mut c_char) -> Result<(), ReleaseViolation> {
    if ptr.is_null() {
        return Ok(());
    }

    let text = CStr::from_ptr(ptr).to_string_lossy();
    check_release_kind::<K>(&text)?;

    TransferBuffer::<K>::from_raw(ptr).release();
    Ok(())
}
