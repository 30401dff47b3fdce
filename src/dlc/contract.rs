//! DLC Contract Builder
//!
//! Validates an outcome set, its payout schedule and the oracle reference,
//! then assembles an immutable [`DlcContract`].
//!
//! ## Validation order
//!
//! ```text
//! 1. outcomes non-empty            → EmptyOutcomeSet
//! 2. len(outcomes) == len(payouts) → PayoutOutcomeLengthMismatch
//! 3. outcomes pairwise distinct    → DuplicateOutcome
//! 4. payouts finite and >= 0       → InvalidPayoutValue
//! 5. oracle well-formed            → InvalidOracleReference
//! 6. each outcome label well-formed→ InvalidOutcome
//! ```
//!
//! First failure wins. Economic soundness (funding conservation) is left to
//! the caller; see [`DlcContract::covers_collateral`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{Digest32, DomainHasher};
use crate::core::types::{InputError, OracleRef, Outcome};
use crate::dlc::payout::PayoutSchedule;

/// Current contract artifact version.
pub const CONTRACT_VERSION: u8 = 1;

/// Errors that can occur while building a contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    /// No outcomes were supplied.
    #[error("outcome set is empty")]
    EmptyOutcomeSet,

    /// Payout count differs from outcome count.
    #[error("{payouts} payouts for {outcomes} outcomes")]
    PayoutOutcomeLengthMismatch {
        /// Number of outcomes.
        outcomes: usize,
        /// Number of payouts.
        payouts: usize,
    },

    /// The same label appears twice.
    #[error("duplicate outcome {outcome:?} at positions {first} and {second}")]
    DuplicateOutcome {
        /// Repeated label.
        outcome: String,
        /// First position.
        first: usize,
        /// Second position.
        second: usize,
    },

    /// A payout is negative, NaN or infinite.
    #[error("invalid payout {value} at position {index}")]
    InvalidPayoutValue {
        /// Position in the schedule.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Oracle reference is empty or malformed.
    #[error("invalid oracle reference: {0}")]
    InvalidOracleReference(InputError),

    /// An outcome label is malformed.
    #[error("invalid outcome at position {index}: {source}")]
    InvalidOutcome {
        /// Position in the outcome set.
        index: usize,
        /// Label error.
        source: InputError,
    },

    /// Decoded contract id does not match its contents.
    #[error("contract id does not match contract contents")]
    ContractIdMismatch,

    /// Decoded contract carries a version this build does not understand.
    #[error("unsupported contract version {0}")]
    UnsupportedVersion(u8),

    /// Canonical contract bytes could not be produced.
    #[error("canonical encoding failed: {0}")]
    CanonicalEncoding(String),
}

/// Discreet Log Contract: outcomes, positional payouts and an oracle.
///
/// Immutable once built; renegotiation means building a new contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContract")]
pub struct DlcContract {
    version: u8,
    #[serde(with = "crate::core::hex_serde::digest")]
    contract_id: Digest32,
    outcomes: Vec<Outcome>,
    payouts: PayoutSchedule,
    oracle: OracleRef,
}

/// Wire shape of a contract before validation.
#[derive(Deserialize)]
struct RawContract {
    version: u8,
    #[serde(with = "crate::core::hex_serde::digest")]
    contract_id: Digest32,
    outcomes: Vec<String>,
    payouts: Vec<f64>,
    oracle: String,
}

impl TryFrom<RawContract> for DlcContract {
    type Error = ContractError;

    fn try_from(raw: RawContract) -> Result<Self, Self::Error> {
        if raw.version != CONTRACT_VERSION {
            return Err(ContractError::UnsupportedVersion(raw.version));
        }

        let contract = build_contract(&raw.outcomes, &raw.payouts, &raw.oracle)?;
        if contract.contract_id != raw.contract_id {
            return Err(ContractError::ContractIdMismatch);
        }
        Ok(contract)
    }
}

/// Validate inputs and build a contract.
///
/// On success the contract's outcomes and payouts are order-preserving
/// copies of the inputs.
pub fn build_contract<S: AsRef<str>>(
    outcomes: &[S],
    payouts: &[f64],
    oracle: &str,
) -> Result<DlcContract, ContractError> {
    // 1. Outcome set non-empty
    if outcomes.is_empty() {
        return Err(ContractError::EmptyOutcomeSet);
    }

    // 2. One payout per outcome
    if outcomes.len() != payouts.len() {
        return Err(ContractError::PayoutOutcomeLengthMismatch {
            outcomes: outcomes.len(),
            payouts: payouts.len(),
        });
    }

    // 3. Outcomes unique
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, label) in outcomes.iter().enumerate() {
        if let Some(&first) = seen.get(label.as_ref()) {
            return Err(ContractError::DuplicateOutcome {
                outcome: label.as_ref().to_string(),
                first,
                second: index,
            });
        }
        seen.insert(label.as_ref(), index);
    }

    // 4. Payouts finite and non-negative
    let payouts = PayoutSchedule::new(payouts)
        .map_err(|(index, value)| ContractError::InvalidPayoutValue { index, value })?;

    // 5. Oracle reference
    let oracle = OracleRef::parse(oracle).map_err(ContractError::InvalidOracleReference)?;

    // 6. Outcome labels
    let outcomes = outcomes
        .iter()
        .enumerate()
        .map(|(index, label)| {
            Outcome::parse(label.as_ref()).map_err(|source| ContractError::InvalidOutcome { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let contract_id = compute_contract_id(&outcomes, &payouts, &oracle)?;

    Ok(DlcContract {
        version: CONTRACT_VERSION,
        contract_id,
        outcomes,
        payouts,
        oracle,
    })
}

/// Compute contract id from contents.
///
/// Canonical bytes are the bincode encoding of (outcomes, payouts, oracle).
fn compute_contract_id(
    outcomes: &[Outcome],
    payouts: &PayoutSchedule,
    oracle: &OracleRef,
) -> Result<Digest32, ContractError> {
    let labels: Vec<&str> = outcomes.iter().map(Outcome::as_str).collect();
    let canonical = bincode::serialize(&(labels, payouts.as_slice(), oracle.as_str()))
        .map_err(|e| ContractError::CanonicalEncoding(e.to_string()))?;

    let mut hasher = DomainHasher::for_contract_id();
    hasher.update_bytes(&canonical);
    Ok(hasher.finalize())
}

impl DlcContract {
    /// Contract version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Deterministic id over the contract contents.
    pub fn contract_id(&self) -> &Digest32 {
        &self.contract_id
    }

    /// Contract id as hex.
    pub fn contract_id_hex(&self) -> String {
        hex::encode(self.contract_id)
    }

    /// Outcomes in the order given at construction.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Payout schedule, positional with [`Self::outcomes`].
    pub fn payouts(&self) -> &PayoutSchedule {
        &self.payouts
    }

    /// Attesting oracle.
    pub fn oracle(&self) -> &OracleRef {
        &self.oracle
    }

    /// Payout for a realized outcome.
    pub fn payout_for(&self, outcome: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .position(|o| o.as_str() == outcome)
            .and_then(|i| self.payouts.get(i))
    }

    /// Iterate (outcome, payout) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, f64)> {
        self.outcomes.iter().zip(self.payouts.as_slice().iter().copied())
    }

    /// Sum of all payouts.
    pub fn total_payout(&self) -> f64 {
        self.payouts.total()
    }

    /// Largest single payout.
    pub fn max_payout(&self) -> f64 {
        self.payouts.max()
    }

    /// Whether `collateral` funds every possible payout.
    ///
    /// Outcomes are mutually exclusive, so only the largest payout has to
    /// be covered.
    pub fn covers_collateral(&self, collateral: f64) -> bool {
        collateral.is_finite() && self.max_payout() <= collateral
    }
}

/// Builder for creating contracts one outcome at a time.
pub struct ContractBuilder {
    oracle: String,
    outcomes: Vec<String>,
    payouts: Vec<f64>,
}

impl ContractBuilder {
    /// Create a new builder for an oracle.
    pub fn new(oracle: impl Into<String>) -> Self {
        Self {
            oracle: oracle.into(),
            outcomes: Vec::new(),
            payouts: Vec::new(),
        }
    }

    /// Add an outcome with its payout.
    pub fn outcome(mut self, label: impl Into<String>, payout: f64) -> Self {
        self.outcomes.push(label.into());
        self.payouts.push(payout);
        self
    }

    /// Validate and build the contract.
    pub fn build(self) -> Result<DlcContract, ContractError> {
        build_contract(&self.outcomes, &self.payouts, &self.oracle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn example() -> DlcContract {
        build_contract(&["above_50k", "below_50k"], &[100.0, 0.0], "oracle_pub_abc").unwrap()
    }

    #[test]
    fn test_example_contract() {
        let contract = example();

        let labels: Vec<&str> = contract.outcomes().iter().map(Outcome::as_str).collect();
        assert_eq!(labels, vec!["above_50k", "below_50k"]);
        assert_eq!(contract.payouts().as_slice(), &[100.0, 0.0]);
        assert_eq!(contract.oracle().as_str(), "oracle_pub_abc");
        assert_eq!(contract.version(), CONTRACT_VERSION);
    }

    #[test]
    fn test_empty_outcome_set() {
        let outcomes: [&str; 0] = [];
        assert_eq!(build_contract(&outcomes, &[], "oracle"), Err(ContractError::EmptyOutcomeSet));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            build_contract(&["auth_verified"], &[0.9, 0.1], "oracle"),
            Err(ContractError::PayoutOutcomeLengthMismatch { outcomes: 1, payouts: 2 })
        );
    }

    #[test]
    fn test_duplicate_outcome() {
        assert_eq!(
            build_contract(&["a", "b", "a"], &[1.0, 2.0, 3.0], "oracle"),
            Err(ContractError::DuplicateOutcome { outcome: "a".into(), first: 0, second: 2 })
        );
    }

    #[test]
    fn test_invalid_payout() {
        for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = build_contract(&["a", "b"], &[1.0, bad], "oracle").unwrap_err();
            assert!(matches!(err, ContractError::InvalidPayoutValue { index: 1, .. }));
        }
    }

    #[test]
    fn test_invalid_oracle() {
        assert_eq!(
            build_contract(&["a"], &[1.0], ""),
            Err(ContractError::InvalidOracleReference(InputError::Empty { field: "oracle" }))
        );
    }

    #[test]
    fn test_invalid_outcome_label() {
        let err = build_contract(&["ok", ""], &[1.0, 2.0], "oracle").unwrap_err();
        assert!(matches!(err, ContractError::InvalidOutcome { index: 1, .. }));
    }

    #[test]
    fn test_first_failure_wins() {
        // Length mismatch is reported before duplicates and bad payouts
        assert!(matches!(
            build_contract(&["a", "a"], &[-1.0], ""),
            Err(ContractError::PayoutOutcomeLengthMismatch { .. })
        ));
        // Duplicate before payout
        assert!(matches!(
            build_contract(&["a", "a"], &[-1.0, 1.0], ""),
            Err(ContractError::DuplicateOutcome { .. })
        ));
        // Payout before oracle
        assert!(matches!(
            build_contract(&["a", "b"], &[-1.0, 1.0], ""),
            Err(ContractError::InvalidPayoutValue { .. })
        ));
        // Oracle before outcome labels
        assert!(matches!(
            build_contract(&["a", ""], &[1.0, 1.0], ""),
            Err(ContractError::InvalidOracleReference(_))
        ));
    }

    #[test]
    fn test_payout_lookup_and_totals() {
        let contract = example();

        assert_eq!(contract.payout_for("above_50k"), Some(100.0));
        assert_eq!(contract.payout_for("below_50k"), Some(0.0));
        assert_eq!(contract.payout_for("sideways"), None);
        assert_eq!(contract.total_payout(), 100.0);
        assert_eq!(contract.max_payout(), 100.0);
        assert!(contract.covers_collateral(100.0));
        assert!(!contract.covers_collateral(99.99));
        assert!(!contract.covers_collateral(f64::NAN));
    }

    #[test]
    fn test_contract_id_deterministic() {
        assert_eq!(example().contract_id(), example().contract_id());

        let other = build_contract(&["above_50k", "below_50k"], &[0.0, 100.0], "oracle_pub_abc").unwrap();
        assert_ne!(example().contract_id(), other.contract_id());
    }

    #[test]
    fn test_contract_id_covers_canonical_bytes() {
        let contract = example();

        let canonical = bincode::serialize(&(
            vec!["above_50k", "below_50k"],
            [100.0f64, 0.0].as_slice(),
            "oracle_pub_abc",
        ))
        .unwrap();
        assert!(!canonical.is_empty());

        let mut hasher = DomainHasher::for_contract_id();
        hasher.update_bytes(&canonical);
        assert_eq!(contract.contract_id(), &hasher.finalize());

        // Never the id of an empty encoding
        assert_ne!(contract.contract_id(), &DomainHasher::for_contract_id().finalize());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let json = serde_json::to_string(&example()).unwrap();

        let future = json.replacen("\"version\":1", "\"version\":200", 1);
        let err = serde_json::from_str::<DlcContract>(&future).unwrap_err();
        assert!(err.to_string().contains("unsupported contract version 200"));
    }

    #[test]
    fn test_builder() {
        let contract = ContractBuilder::new("oracle_pub_abc")
            .outcome("above_50k", 100.0)
            .outcome("below_50k", 0.0)
            .build()
            .unwrap();

        assert_eq!(contract, example());
    }

    #[test]
    fn test_json_roundtrip_revalidates() {
        let contract = example();
        let json = serde_json::to_string(&contract).unwrap();
        assert_eq!(serde_json::from_str::<DlcContract>(&json).unwrap(), contract);

        // Tampering with payouts breaks the id check
        let tampered = json.replace("100.0", "90.0");
        assert!(serde_json::from_str::<DlcContract>(&tampered).is_err());

        // Duplicates are rejected on decode too
        let duplicated = json.replace("below_50k", "above_50k");
        assert!(serde_json::from_str::<DlcContract>(&duplicated).is_err());
    }

    fn distinct_outcomes() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z][a-z0-9_]{0,15}", 1..12)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_well_formed_inputs_build(
            (outcomes, payouts) in distinct_outcomes().prop_flat_map(|outcomes| {
                let n = outcomes.len();
                (Just(outcomes), prop::collection::vec(0.0f64..1.0e9, n))
            })
        ) {
            let contract = build_contract(&outcomes, &payouts, "oracle_pub_abc").unwrap();

            let labels: Vec<String> = contract.outcomes().iter().map(|o| o.as_str().to_string()).collect();
            prop_assert_eq!(labels, outcomes.clone());
            prop_assert_eq!(contract.payouts().as_slice(), payouts.as_slice());

            // Same inputs, structurally equal contract
            let again = build_contract(&outcomes, &payouts, "oracle_pub_abc").unwrap();
            prop_assert_eq!(contract, again);
        }

        #[test]
        fn prop_length_mismatch_rejected(
            outcomes in distinct_outcomes(),
            payouts in prop::collection::vec(0.0f64..100.0, 0..12),
        ) {
            prop_assume!(outcomes.len() != payouts.len());
            prop_assert_eq!(
                build_contract(&outcomes, &payouts, "oracle"),
                Err(ContractError::PayoutOutcomeLengthMismatch {
                    outcomes: outcomes.len(),
                    payouts: payouts.len(),
                })
            );
        }

        #[test]
        fn prop_duplicate_rejected(
            outcomes in distinct_outcomes(),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut outcomes = outcomes;
            let dup = outcomes[pick.index(outcomes.len())].clone();
            outcomes.push(dup);
            let payouts = vec![1.0; outcomes.len()];

            let is_duplicate = matches!(
                build_contract(&outcomes, &payouts, "oracle"),
                Err(ContractError::DuplicateOutcome { .. })
            );
            prop_assert!(is_duplicate);
        }

        #[test]
        fn prop_bad_payout_rejected(
            outcomes in distinct_outcomes(),
            pick in any::<prop::sample::Index>(),
            bad in prop_oneof![
                Just(f64::NAN),
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY),
                -1.0e9f64..-1.0e-9,
            ],
        ) {
            let mut payouts = vec![1.0; outcomes.len()];
            let index = pick.index(payouts.len());
            payouts[index] = bad;

            let is_invalid = matches!(
                build_contract(&outcomes, &payouts, "oracle"),
                Err(ContractError::InvalidPayoutValue { index: i, .. }) if i == index
            );
            prop_assert!(is_invalid);
        }
    }
}
