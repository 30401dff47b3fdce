//! C Surface
//!
//! `extern "C"` entry points over one process-wide [`Bridge`]. The bridge is
//! built from the environment on first use and never changes afterwards.
//!
//! ```c
//! char *generate_stwo_proof(const char *circuit, const char *input_hash, const char *output_hash);
//! void  free_proof(char *ptr);
//! char *create_dlc_contract(const char *outcome, const double *payout, int payout_len, const char *oracle);
//! void  free_contract(char *ptr);
//! char *sign_dlc_outcome(const char *outcome);
//! void  free_signature(char *ptr);
//!
//! int         stwo_dlc_last_error_code(void);
//! const char *stwo_dlc_last_error_message(void);
//! ```
//!
//! Producers return an owned JSON envelope or null. After null, the error
//! code and message of the failed call are readable on the same thread
//! until the next bridge call there. Input strings are only borrowed for
//! the duration of the call.
//!
//! Releasing a buffer through the release function of another kind aborts
//! the process. See [`crate::bridge::buffer`] for the other obligations.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use tracing::error;

use crate::bridge::buffer::{release_raw, BufferKind, ContractKind, ProofKind, SignatureKind, TransferBuffer};
use crate::bridge::facade::Bridge;
use crate::config::BridgeConfig;
use crate::core::types::InputError;
use crate::error::{BridgeError, ErrorCode};
use crate::logging;

static BRIDGE: OnceLock<Result<Bridge, String>> = OnceLock::new();

thread_local! {
    static LAST_ERROR: RefCell<Option<(ErrorCode, CString)>> = RefCell::new(None);
}

/// Why a C call returned null.
struct CallFailure {
    code: ErrorCode,
    message: String,
}

impl From<BridgeError> for CallFailure {
    fn from(err: BridgeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<InputError> for CallFailure {
    fn from(err: InputError) -> Self {
        BridgeError::from(err).into()
    }
}

fn shared_bridge() -> Result<&'static Bridge, CallFailure> {
    BRIDGE
        .get_or_init(|| {
            let config = BridgeConfig::from_env();
            let filter = match &config {
                Ok(config) => config.log_filter.clone(),
                Err(_) => logging::default_filter().to_string(),
            };
            logging::init(&filter);

            match config {
                Ok(config) => Ok(Bridge::from_config(&config)),
                Err(e) => {
                    error!("Bridge configuration rejected: {}", e);
                    Err(e.to_string())
                }
            }
        })
        .as_ref()
        .map_err(|reason| CallFailure {
            code: ErrorCode::Internal,
            message: format!("bridge unavailable: {}", reason),
        })
}

fn set_last_error(code: ErrorCode, message: &str) {
    let message = CString::new(message.replace('\0', "\\0")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some((code, message)));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Run a producer and hand its buffer to the caller, or record the failure.
fn produce<K, F>(operation: &str, f: F) -> *mut c_char
where
    K: BufferKind,
    F: FnOnce(&Bridge) -> Result<TransferBuffer<K>, CallFailure>,
{
    let result = catch_unwind(AssertUnwindSafe(|| f(shared_bridge()?)));

    match result {
        Ok(Ok(buffer)) => {
            clear_last_error();
            buffer.into_raw()
        }
        Ok(Err(failure)) => {
            set_last_error(failure.code, &failure.message);
            ptr::null_mut()
        }
        Err(_) => {
            error!("{} panicked", operation);
            set_last_error(ErrorCode::Internal, &format!("{} panicked", operation));
            ptr::null_mut()
        }
    }
}

/// Release through the kind-`K` path, aborting on a kind violation.
unsafe fn release<K: BufferKind>(ptr: *mut c_char) {
    if let Err(violation) = release_raw::<K>(ptr) {
        error!("Buffer release violation: {}", violation);
        std::process::abort();
    }
}

unsafe fn borrow_str<'a>(ptr: *const c_char, field: &'static str) -> Result<&'a str, InputError> {
    if ptr.is_null() {
        return Err(InputError::Missing { field });
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| InputError::InvalidUtf8 { field })
}

unsafe fn borrow_payouts<'a>(ptr: *const f64, len: c_int) -> Result<&'a [f64], InputError> {
    let len = usize::try_from(len).map_err(|_| InputError::InvalidLength {
        field: "payout_len",
        len: i64::from(len),
    })?;

    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(InputError::Missing { field: "payout" });
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// Outcome argument: a JSON array of labels, or one bare label.
fn parse_outcome_list(text: &str) -> Result<Vec<String>, InputError> {
    if text.trim_start().starts_with('[') {
        serde_json::from_str(text).map_err(|e| InputError::MalformedList {
            field: "outcome",
            reason: e.to_string(),
        })
    } else {
        Ok(vec![text.to_string()])
    }
}

/// Generate a proof that `circuit` maps `input_hash` to `output_hash`.
///
/// Returns an owned proof envelope, or null on failure.
///
/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string. A non-null
/// result must be released with [`free_proof`].
#[no_mangle]
pub unsafe extern "C" fn generate_stwo_proof(
    circuit: *const c_char,
    input_hash: *const c_char,
    output_hash: *const c_char,
) -> *mut c_char {
    produce("generate_stwo_proof", |bridge| {
        let circuit = borrow_str(circuit, "circuit")?;
        let input_hash = borrow_str(input_hash, "input_hash")?;
        let output_hash = borrow_str(output_hash, "output_hash")?;
        Ok(bridge.generate_proof(circuit, input_hash, output_hash)?)
    })
}

/// Release a proof from [`generate_stwo_proof`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a proof not yet released.
#[no_mangle]
pub unsafe extern "C" fn free_proof(ptr: *mut c_char) {
    release::<ProofKind>(ptr);
}

/// Build a contract over `outcome` with one payout per outcome.
///
/// `outcome` is a JSON array of labels or a single label. Returns an owned
/// contract envelope, or null on failure.
///
/// # Safety
///
/// `outcome` and `oracle` must be null or valid NUL-terminated strings.
/// `payout` must point to `payout_len` doubles when `payout_len > 0`. A
/// non-null result must be released with [`free_contract`].
#[no_mangle]
pub unsafe extern "C" fn create_dlc_contract(
    outcome: *const c_char,
    payout: *const f64,
    payout_len: c_int,
    oracle: *const c_char,
) -> *mut c_char {
    produce("create_dlc_contract", |bridge| {
        let outcomes = parse_outcome_list(borrow_str(outcome, "outcome")?)?;
        let payouts = borrow_payouts(payout, payout_len)?;
        let oracle = borrow_str(oracle, "oracle")?;
        Ok(bridge.create_contract(&outcomes, payouts, oracle)?)
    })
}

/// Release a contract from [`create_dlc_contract`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a contract not yet released.
#[no_mangle]
pub unsafe extern "C" fn free_contract(ptr: *mut c_char) {
    release::<ContractKind>(ptr);
}

/// Sign `outcome` as the oracle.
///
/// Returns an owned signature envelope, or null on failure.
///
/// # Safety
///
/// `outcome` must be null or a valid NUL-terminated string. A non-null
/// result must be released with [`free_signature`].
#[no_mangle]
pub unsafe extern "C" fn sign_dlc_outcome(outcome: *const c_char) -> *mut c_char {
    produce("sign_dlc_outcome", |bridge| {
        let outcome = borrow_str(outcome, "outcome")?;
        Ok(bridge.sign_outcome(outcome)?)
    })
}

/// Release a signature from [`sign_dlc_outcome`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a signature not yet released.
#[no_mangle]
pub unsafe extern "C" fn free_signature(ptr: *mut c_char) {
    release::<SignatureKind>(ptr);
}

/// Error code of the last bridge call on this thread (0 on success).
#[no_mangle]
pub extern "C" fn stwo_dlc_last_error_code() -> c_int {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map_or(ErrorCode::Ok, |(code, _)| *code) as c_int)
}

/// Message of the last failed bridge call on this thread, or null.
///
/// The pointer stays valid until the next bridge call on this thread and
/// must not be freed.
#[no_mangle]
pub extern "C" fn stwo_dlc_last_error_message() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |(_, message)| message.as_ptr())
    })
}
