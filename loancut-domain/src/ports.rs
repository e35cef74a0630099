//! The seam between the graph and the algorithms that cut it.

use std::time::Duration;

use thiserror::Error;

use crate::assignment::{DebtCutAssignment, DebtCutError, TimeAssignment};
use crate::contract::ContractError;
use crate::graph::Graph;

/// Failures of a debt-cut computation.
///
/// An over-constrained equilibrium system is *not* an error; finders
/// report it through the no-solution sentinel assignment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("graph node '{0}' is missing from the time assignment")]
    MissingNode(String),
    #[error("no payment time for contract '{contract}' received by '{node}'")]
    MissingPaymentTime { node: String, contract: String },
    #[error("payment time {payment_time} precedes the origin of contract '{contract}'")]
    PaymentBeforeContract { contract: String, payment_time: f64 },
    #[error(
        "equilibrium time {equilibrium_time} precedes the payment time \
         {payment_time} of contract '{contract}'"
    )]
    EquilibriumBeforePayment {
        contract: String,
        payment_time: f64,
        equilibrium_time: f64,
    },
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Cut(#[from] DebtCutError),
    #[error("the cut minimization program is infeasible")]
    Infeasible,
    #[error("the cut minimization program is unbounded")]
    Unbounded,
    #[error("the cut minimization did not converge within {0} iterations")]
    IterationLimit(usize),
    #[error("no debt cut finder installed on graph '{0}'")]
    FinderNotSet(String),
    #[error("internal solver failure: {0}")]
    Internal(String),
}

/// Per-run figures reported alongside the cuts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStats {
    /// Rank of the reduced equilibrium system.
    pub rank: usize,
    /// Number of unknowns (contracts).
    pub variables: usize,
    /// Wall-clock time of the matrix reduction phase.
    pub reduction: Duration,
    /// Wall-clock time of the cut minimization phase.
    pub minimization: Duration,
}

/// A finder's result: the cuts plus the run's statistics.
#[derive(Debug, Clone)]
pub struct CutSolution {
    pub cuts: DebtCutAssignment,
    pub stats: SolveStats,
}

impl CutSolution {
    pub fn is_no_solution(&self) -> bool {
        self.cuts.is_no_solution()
    }
}

/// An algorithm computing equilibrial debt cuts.
///
/// Implementations must be stateless across calls; all per-run state is
/// scoped to `compute` and the timings travel in the outcome.
pub trait DebtCutFinder {
    fn compute(
        &self,
        graph: &Graph,
        times: &TimeAssignment,
        equilibrium_time: f64,
    ) -> Result<CutSolution, SolveError>;
}
