//! Payment-time and debt-cut assignments.
//!
//! Both are keyed by name: a payment time belongs to a (receiving node,
//! contract) pair, a cut to a contract. Names survive graph copies, which
//! is what lets an assignment computed against one graph be applied to
//! another with the same shape.

use fxhash::FxHashMap;
use indexmap::IndexMap;
use thiserror::Error;

use crate::contract::Contract;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeAssignmentError {
    #[error("payment time must be finite (got {0})")]
    NonFiniteTime(f64),
}

/// Maps each (receiving node, contract) pair to the moment the contract's
/// cut is applied.
#[derive(Debug, Clone, Default)]
pub struct TimeAssignment {
    times: FxHashMap<String, FxHashMap<String, f64>>,
    maximum_time: f64,
}

impl TimeAssignment {
    pub fn new() -> Self {
        Self {
            times: FxHashMap::default(),
            maximum_time: f64::NEG_INFINITY,
        }
    }

    /// Records the payment time of `contract` as received by `node`.
    pub fn put(
        &mut self,
        node: impl Into<String>,
        contract: impl Into<String>,
        time: f64,
    ) -> Result<(), TimeAssignmentError> {
        if !time.is_finite() {
            return Err(TimeAssignmentError::NonFiniteTime(time));
        }
        self.times
            .entry(node.into())
            .or_default()
            .insert(contract.into(), time);
        self.maximum_time = self.maximum_time.max(time);
        Ok(())
    }

    /// Registers a node with no incoming contracts. Every node of the
    /// solved graph must appear, borrowers or not.
    pub fn ensure_node(&mut self, node: impl Into<String>) {
        self.times.entry(node.into()).or_default();
    }

    pub fn get(&self, node: &str, contract: &str) -> Option<f64> {
        self.times.get(node)?.get(contract).copied()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.times.contains_key(node)
    }

    /// Number of nodes mapped.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Largest recorded payment time; `-inf` when empty.
    pub fn maximum_time(&self) -> f64 {
        self.maximum_time
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DebtCutError {
    #[error("debt cut must be a non-negative finite number (got {0})")]
    InvalidCut(f64),
}

/// The solver's output: forgiven amount per contract, the equilibrium
/// time the cuts target, and the running total.
#[derive(Debug, Clone)]
pub struct DebtCutAssignment {
    cuts: IndexMap<String, f64>,
    equilibrium_time: f64,
    sum: f64,
}

impl DebtCutAssignment {
    pub fn new(equilibrium_time: f64) -> Self {
        Self {
            cuts: IndexMap::new(),
            equilibrium_time,
            sum: 0.0,
        }
    }

    /// The sentinel returned for an over-constrained equilibrium system:
    /// no contracts, equilibrium time `-inf`.
    pub fn no_solution() -> Self {
        Self::new(f64::NEG_INFINITY)
    }

    pub fn is_no_solution(&self) -> bool {
        self.equilibrium_time == f64::NEG_INFINITY && self.cuts.is_empty()
    }

    /// Records the forgiven amount for `contract`, replacing any earlier
    /// entry and keeping the running sum exact.
    pub fn put(&mut self, contract: &Contract, cut: f64) -> Result<(), DebtCutError> {
        self.put_named(contract.name(), cut)
    }

    pub fn put_named(&mut self, contract: impl Into<String>, cut: f64) -> Result<(), DebtCutError> {
        if !cut.is_finite() || cut < 0.0 {
            return Err(DebtCutError::InvalidCut(cut));
        }
        match self.cuts.insert(contract.into(), cut) {
            Some(previous) => self.sum += cut - previous,
            None => self.sum += cut,
        }
        Ok(())
    }

    pub fn get(&self, contract: &Contract) -> Option<f64> {
        self.get_named(contract.name())
    }

    pub fn get_named(&self, contract: &str) -> Option<f64> {
        self.cuts.get(contract).copied()
    }

    pub fn contains(&self, contract: &Contract) -> bool {
        self.cuts.contains_key(contract.name())
    }

    /// Total amount forgiven across all contracts.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn equilibrium_time(&self) -> f64 {
        self.equilibrium_time
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Cuts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.cuts.iter().map(|(name, &cut)| (name.as_str(), cut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_assignment_tracks_maximum() {
        let mut times = TimeAssignment::new();
        assert_eq!(times.maximum_time(), f64::NEG_INFINITY);
        times.put("v", "a", 1.5).unwrap();
        times.put("u", "b", 3.0).unwrap();
        times.put("v", "c", 2.0).unwrap();
        assert_eq!(times.maximum_time(), 3.0);
        assert_eq!(times.get("v", "a"), Some(1.5));
        assert_eq!(times.get("v", "b"), None);
        assert_eq!(times.len(), 2);
    }

    #[test]
    fn time_assignment_rejects_non_finite_times() {
        let mut times = TimeAssignment::new();
        assert!(times.put("v", "a", f64::NAN).is_err());
        assert!(times.put("v", "a", f64::INFINITY).is_err());
        assert!(times.is_empty());
    }

    #[test]
    fn dummy_nodes_count_as_present() {
        let mut times = TimeAssignment::new();
        times.ensure_node("lender-only");
        assert!(times.contains_node("lender-only"));
        assert_eq!(times.get("lender-only", "x"), None);
    }

    #[test]
    fn cut_sum_stays_exact_across_replacement() {
        let contract = Contract::continuous("a", 1.0, 0.1, 0.0).unwrap();
        let mut cuts = DebtCutAssignment::new(2.0);
        cuts.put(&contract, 0.5).unwrap();
        cuts.put_named("b", 1.25).unwrap();
        assert_eq!(cuts.sum(), 1.75);
        cuts.put(&contract, 0.25).unwrap();
        assert_eq!(cuts.sum(), 1.5);
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts.get(&contract), Some(0.25));
    }

    #[test]
    fn cuts_must_be_non_negative_and_finite() {
        let mut cuts = DebtCutAssignment::new(2.0);
        assert!(cuts.put_named("a", -0.1).is_err());
        assert!(cuts.put_named("a", f64::NAN).is_err());
        assert!(cuts.put_named("a", f64::INFINITY).is_err());
        assert!(cuts.is_empty());
    }

    #[test]
    fn sentinel_is_distinguishable() {
        let sentinel = DebtCutAssignment::no_solution();
        assert!(sentinel.is_no_solution());
        assert!(!DebtCutAssignment::new(2.0).is_no_solution());
    }
}
