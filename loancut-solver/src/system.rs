//! Assembly of the equilibrium system.
//!
//! Rows are the graph's nodes in arena order; column `j` is the unknown
//! cut of the `j`-th contract, taken over nodes in order and each node's
//! outgoing contracts in adjacency order. The augmentation column holds
//! each node's pre-cut equity at the equilibrium time, so a solution of
//! the system is exactly a cut vector that zeroes every equity.

use fxhash::FxHashMap;

use loancut_calc::Matrix;
use loancut_domain::{Contract, ContractId, Graph, SolveError, TimeAssignment};

/// One contract column of the system.
pub(crate) struct Column {
    /// Solver-local clone with its origin moved onto the compounding grid
    /// of the payment moment (Step A). The caller's contract is never
    /// touched.
    pub contract: Contract,
    /// Accrued value at the payment moment — the cut's upper bound.
    pub precut_value: f64,
    /// Growth from the payment moment to the equilibrium time.
    pub growth: f64,
}

pub(crate) struct EquilibriumSystem {
    pub columns: Vec<Column>,
    pub matrix: Matrix,
}

/// Validates the time assignment against the graph and builds the
/// augmented matrix.
pub(crate) fn assemble(
    graph: &Graph,
    times: &TimeAssignment,
    equilibrium_time: f64,
) -> Result<EquilibriumSystem, SolveError> {
    for (_, node) in graph.nodes() {
        if !times.contains_node(node.name()) {
            return Err(SolveError::MissingNode(node.name().to_string()));
        }
    }

    let mut columns = Vec::with_capacity(graph.contract_count());
    let mut column_of: FxHashMap<ContractId, usize> = FxHashMap::default();

    for (_, node) in graph.nodes() {
        for (debtor, contract_id) in node.outgoing_with_debtors() {
            let contract = graph
                .contract(contract_id)
                .ok_or_else(|| SolveError::Internal(format!("dangling contract id {contract_id:?}")))?;
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
            if payment_time < contract.timestamp() {
                return Err(SolveError::PaymentBeforeContract {
                    contract: contract.name().to_string(),
                    payment_time,
                });
            }
            if equilibrium_time < payment_time {
                return Err(SolveError::EquilibriumBeforePayment {
                    contract: contract.name().to_string(),
                    payment_time,
                    equilibrium_time,
                });
            }

            // Step A: align a compounding tick with the payment moment.
            // The shift preserves the accrued value there, so the value is
            // read off the original grid where floor(n*d) is numerically
            // farthest from a step boundary.
            let shift = contract.tick_shift(payment_time - contract.timestamp())?;
            let mut aligned = contract.clone();
            aligned.set_timestamp(contract.timestamp() + shift)?;
            let precut_value = contract.value_at(payment_time - contract.timestamp())?;
            let growth = aligned.growth_factor(equilibrium_time - payment_time)?;

            column_of.insert(contract_id, columns.len());
            columns.push(Column {
                contract: aligned,
                precut_value,
                growth,
            });
        }
    }

    let mut matrix = Matrix::new(graph.len(), columns.len() + 1);
    matrix
        .set_tolerance(graph.epsilon().value())
        .map_err(|error| SolveError::Internal(error.to_string()))?;
    let augmentation = columns.len();

    for (row, (_, node)) in graph.nodes().enumerate() {
        let mut equity = 0.0;
        for contract_id in node.outgoing() {
            let j = column_of[&contract_id];
            let column = &columns[j];
            matrix.add(j, row, column.growth);
            equity += column.precut_value * column.growth;
        }
        for contract_id in node.incoming() {
            let j = column_of[&contract_id];
            let column = &columns[j];
            matrix.add(j, row, -column.growth);
            equity -= column.precut_value * column.growth;
        }
        matrix.set(augmentation, row, equity);
    }

    Ok(EquilibriumSystem { columns, matrix })
}
