//! Fixed-Point Payout Amounts
//!
//! Payouts cross the boundary as `f64` monetary units. Settlement math must
//! not run on floats, so this module converts them into integer base units
//! with an explicit scale.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  value (f64, whole units)  ×  units_per_whole  →  u64        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  0.9 BTC × 100_000_000        →  90_000_000 sat              │
//! │  rounding: half to even (banker's rounding)                 │
//! │  rejected: NaN, ±∞, negative, ≥ 2^64 after scaling          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Integer amount in the smallest settlement unit.
pub type BaseUnits = u64;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// 2^64 as f64; the first scaled value that no longer fits a u64.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Errors converting a floating-point amount.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    /// NaN or infinite value.
    #[error("amount {0} is not finite")]
    NonFinite(f64),
    /// Negative value.
    #[error("amount {0} is negative")]
    Negative(f64),
    /// Scaled value does not fit in 64 bits.
    #[error("amount {value} overflows at scale {units_per_whole}")]
    Overflow {
        /// Original value.
        value: f64,
        /// Requested scale.
        units_per_whole: u64,
    },
    /// A scale of zero units per whole.
    #[error("scale must be at least one unit per whole")]
    ZeroScale,
}

/// Check that a payout value is finite and non-negative.
#[inline]
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Convert whole units to integer base units.
pub fn to_base_units(value: f64, units_per_whole: u64) -> Result<BaseUnits, AmountError> {
    if units_per_whole == 0 {
        return Err(AmountError::ZeroScale);
    }
    if !value.is_finite() {
        return Err(AmountError::NonFinite(value));
    }
    if value < 0.0 {
        return Err(AmountError::Negative(value));
    }

    let scaled = (value * units_per_whole as f64).round_ties_even();
    if scaled >= U64_LIMIT {
        return Err(AmountError::Overflow { value, units_per_whole });
    }

    Ok(scaled as BaseUnits)
}

/// Convert integer base units back to whole units.
///
/// Lossy above 2^53 base units.
pub fn from_base_units(units: BaseUnits, units_per_whole: u64) -> Result<f64, AmountError> {
    if units_per_whole == 0 {
        return Err(AmountError::ZeroScale);
    }
    Ok(units as f64 / units_per_whole as f64)
}
