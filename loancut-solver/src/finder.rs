//! The debt-cut finder implementations.

use std::time::Instant;

use loancut_calc::{SimplexError, SimplexOptions, minimize};
use loancut_domain::{
    CutSolution, DebtCutAssignment, DebtCutFinder, Graph, SolveError, SolveStats, TimeAssignment,
};

use crate::program::{build_program, extract_cuts, split_variables};
use crate::system::assemble;

/// The default finder: equilibrium system, RREF, simplex.
///
/// Stateless across runs — every table lives and dies inside `compute` —
/// so one instance may serve any number of graphs.
#[derive(Debug, Clone, Default)]
pub struct SimplexCutFinder {
    options: SimplexOptions,
}

impl SimplexCutFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SimplexOptions) -> Self {
        Self { options }
    }
}

impl DebtCutFinder for SimplexCutFinder {
    fn compute(
        &self,
        graph: &Graph,
        times: &TimeAssignment,
        equilibrium_time: f64,
    ) -> Result<CutSolution, SolveError> {
        let system = assemble(graph, times, equilibrium_time)?;
        let mut matrix = system.matrix;
        let variables = matrix.columns() - 1;

        let reduction_started = Instant::now();
        let rank = matrix.reduce();
        let reduction = reduction_started.elapsed();
        tracing::debug!(
            rows = matrix.rows(),
            variables,
            rank,
            reduction_us = reduction.as_micros() as u64,
            "equilibrium system reduced"
        );

        let solvable = matrix
            .has_solution()
            .map_err(|error| SolveError::Internal(error.to_string()))?;
        let mut stats = SolveStats {
            rank,
            variables,
            reduction,
            minimization: Default::default(),
        };
        if !solvable {
            tracing::debug!("equilibrium system is over-constrained, returning the sentinel");
            return Ok(CutSolution {
                cuts: DebtCutAssignment::no_solution(),
                stats,
            });
        }

        let split = split_variables(&matrix, rank);
        let (objective, constraints) = build_program(&matrix, &split, &system.columns);

        let minimization_started = Instant::now();
        let point = if objective.coefficients.is_empty() {
            // every cut is pinned by the system itself
            Vec::new()
        } else {
            let optimum = minimize(&objective, &constraints, true, &self.options)
                .map_err(map_simplex_error)?;
            tracing::debug!(
                free_variables = objective.coefficients.len(),
                constraints = constraints.len(),
                iterations = optimum.iterations,
                total_cut = optimum.value,
                "cut minimization finished"
            );
            optimum.point
        };
        stats.minimization = minimization_started.elapsed();

        let cuts = extract_cuts(
            &matrix,
            &split,
            &system.columns,
            &point,
            self.options.tolerance,
            equilibrium_time,
        )?;
        Ok(CutSolution { cuts, stats })
    }
}

fn map_simplex_error(error: SimplexError) -> SolveError {
    match error {
        SimplexError::Infeasible => SolveError::Infeasible,
        SimplexError::Unbounded => SolveError::Unbounded,
        SimplexError::IterationLimit(limit) => SolveError::IterationLimit(limit),
        other => SolveError::Internal(other.to_string()),
    }
}

/// The trivial baseline: forgive every contract its full accrued value at
/// payment time. Always equilibrial — a graph of zero-principal contracts
/// has zero equity everywhere — and maximally expensive.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullCutFinder;

impl FullCutFinder {
    pub fn new() -> Self {
        Self
    }
}

impl DebtCutFinder for FullCutFinder {
    fn compute(
        &self,
        graph: &Graph,
        times: &TimeAssignment,
        equilibrium_time: f64,
    ) -> Result<CutSolution, SolveError> {
        let mut cuts = DebtCutAssignment::new(equilibrium_time);
        for (_, node) in graph.nodes() {
            for (debtor, contract_id) in node.outgoing_with_debtors() {
                let contract = graph.contract(contract_id).ok_or_else(|| {
                    SolveError::Internal(format!("dangling contract id {contract_id:?}"))
                })?;
                let debtor_name = graph
                    .node(debtor)
                    .ok_or_else(|| SolveError::Internal(format!("dangling node id {debtor:?}")))?
                    .name();
                let payment_time = times.get(debtor_name, contract.name()).ok_or_else(|| {
                    SolveError::MissingPaymentTime {
                        node: debtor_name.to_string(),
                        contract: contract.name().to_string(),
                    }
                })?;
                let value = contract.value_at(payment_time - contract.timestamp())?;
                cuts.put(contract, value)?;
            }
        }
        Ok(CutSolution {
            cuts,
            stats: SolveStats {
                variables: graph.contract_count(),
                ..Default::default()
            },
        })
    }
}
