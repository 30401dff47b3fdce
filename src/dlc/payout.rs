//! Payout Schedule
//!
//! Ordered payouts, one per outcome. Values are whole monetary units as
//! `f64`; [`PayoutSchedule::to_base_units`] moves them into fixed point for
//! settlement.

use serde::{Deserialize, Serialize};

use crate::core::amount::{is_valid_amount, to_base_units, AmountError, BaseUnits};

/// Positional payouts; every value finite and non-negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PayoutSchedule(Vec<f64>);

impl PayoutSchedule {
    /// Build a schedule, reporting the first invalid value.
    ///
    /// Negative zero is stored as zero.
    pub fn new(values: &[f64]) -> Result<Self, (usize, f64)> {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !is_valid_amount(**v)) {
            return Err((index, value));
        }
        Ok(Self(values.iter().map(|v| if *v == 0.0 { 0.0 } else { *v }).collect()))
    }

    /// Payout values in outcome order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of payouts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no payouts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payout at a position.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Sum of all payouts.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest single payout (zero for an empty schedule).
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Convert every payout to integer base units.
    pub fn to_base_units(&self, units_per_whole: u64) -> Result<Vec<BaseUnits>, AmountError> {
        self.0.iter().map(|v| to_base_units(*v, units_per_whole)).collect()
    }
}

impl TryFrom<Vec<f64>> for PayoutSchedule {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(&values).map_err(|(index, value)| format!("invalid payout {} at index {}", value, index))
    }
}

impl From<PayoutSchedule> for Vec<f64> {
    fn from(value: PayoutSchedule) -> Self {
        value.0
    }
}
