//! From the reduced system to the cut-minimization program and back.
//!
//! After reduction, every pivot column is a dependent cut expressed
//! affinely in the free columns; the free columns become the program's
//! decision variables. The objective is the total amount forgiven, and
//! the constraints bound every cut — dependent or free — to the interval
//! `[0, accrued value at payment]`.

use fxhash::FxHashMap;

use loancut_calc::{Constraint, Matrix, Objective, Relation};
use loancut_domain::{DebtCutAssignment, SolveError};

use crate::system::Column;

/// The reduced system's variable split.
pub(crate) struct VariableSplit {
    /// Pivot column of each row `0..rank`.
    pub pivot_columns: Vec<usize>,
    /// Free columns in discovery order — LP index to matrix column.
    pub free_columns: Vec<usize>,
    /// Inverse of `free_columns`.
    pub lp_index: FxHashMap<usize, usize>,
}

/// Walks the reduced rows and classifies columns.
///
/// Within a row, every non-zero column after the leading 1 is free unless
/// an earlier row already claimed it (equivalently: some entry above is
/// non-zero). Discovery order assigns the program's variable indices.
pub(crate) fn split_variables(matrix: &Matrix, rank: usize) -> VariableSplit {
    let variables = matrix.columns() - 1;
    let tolerance = matrix.tolerance();
    let near_zero = |v: f64| v.abs() <= tolerance;

    let mut pivot_columns = Vec::with_capacity(rank);
    let mut free_columns = Vec::new();
    let mut lp_index = FxHashMap::default();

    for row in 0..rank {
        // in RREF every row below the last pivot row is zero, so a row
        // without a pivot ends the walk
        let pivot = (row..variables).find(|&c| !near_zero(matrix.get(c, row)));
        let Some(pivot) = pivot else {
            break;
        };
        debug_assert!((matrix.get(pivot, row) - 1.0).abs() <= tolerance);
        pivot_columns.push(pivot);

        for column in pivot + 1..variables {
            if near_zero(matrix.get(column, row)) {
                continue;
            }
            let claimed_above = (0..row).any(|above| !near_zero(matrix.get(column, above)));
            if !claimed_above && !lp_index.contains_key(&column) {
                lp_index.insert(column, free_columns.len());
                free_columns.push(column);
            }
        }
    }

    VariableSplit {
        pivot_columns,
        free_columns,
        lp_index,
    }
}

/// Builds the minimization program over the free cuts.
///
/// With `x_p = b_r - sum M[r][j] * y_j` for each pivot, minimizing the
/// total cut `sum x` becomes `sum b_r + sum (1 - sum_r M[r][j]) * y_j`;
/// the bounds `0 <= x_p <= V_p` translate to a pair of constraints per
/// row and each free cut is bounded by its own pre-cut value.
pub(crate) fn build_program(
    matrix: &Matrix,
    split: &VariableSplit,
    columns: &[Column],
) -> (Objective, Vec<Constraint>) {
    let variables = matrix.columns() - 1;
    let tolerance = matrix.tolerance();
    let near_zero = |v: f64| v.abs() <= tolerance;
    let free_count = split.free_columns.len();

    let mut costs = vec![0.0; free_count];
    let mut constant = 0.0;
    let mut constraints = Vec::with_capacity(2 * variables);

    for (row, &pivot) in split.pivot_columns.iter().enumerate() {
        let rhs = matrix.get(variables, row);
        constant += rhs;

        let mut coefficients = vec![0.0; free_count];
        for column in pivot + 1..variables {
            let entry = matrix.get(column, row);
            if near_zero(entry) {
                continue;
            }
            // every non-zero past the pivot sits in a free column
            let Some(&index) = split.lp_index.get(&column) else {
                debug_assert!(false, "non-free column {column} past the pivot of row {row}");
                continue;
            };
            costs[index] -= entry;
            coefficients[index] = -entry;
        }

        // 0 <= x_p
        constraints.push(Constraint::new(
            coefficients.clone(),
            Relation::GreaterOrEqual,
            -rhs,
        ));
        // x_p <= V_p
        constraints.push(Constraint::new(
            coefficients,
            Relation::LessOrEqual,
            columns[pivot].precut_value - rhs,
        ));
    }

    for (index, &column) in split.free_columns.iter().enumerate() {
        let mut coefficients = vec![0.0; free_count];
        coefficients[index] = 1.0;
        constraints.push(Constraint::new(
            coefficients,
            Relation::LessOrEqual,
            columns[column].precut_value,
        ));
        costs[index] += 1.0;
    }

    (Objective::new(costs, constant), constraints)
}

/// Reads the cuts off the optimum: free cuts directly from the point,
/// dependent cuts recomputed from their rows and snapped to zero below
/// the solver tolerance.
pub(crate) fn extract_cuts(
    matrix: &Matrix,
    split: &VariableSplit,
    columns: &[Column],
    point: &[f64],
    snap_tolerance: f64,
    equilibrium_time: f64,
) -> Result<DebtCutAssignment, SolveError> {
    let variables = matrix.columns() - 1;
    let near_zero = |v: f64| v.abs() <= matrix.tolerance();
    let mut cuts = DebtCutAssignment::new(equilibrium_time);

    for (index, &column) in split.free_columns.iter().enumerate() {
        let mut cut = point[index];
        if cut < 0.0 && cut >= -snap_tolerance {
            cut = 0.0;
        }
        cuts.put(&columns[column].contract, cut)?;
    }

    for (row, &pivot) in split.pivot_columns.iter().enumerate() {
        let rhs = matrix.get(variables, row);
        let mut cut = rhs;
        for column in pivot + 1..variables {
            let entry = matrix.get(column, row);
            if near_zero(entry) {
                continue;
            }
            if let Some(&index) = split.lp_index.get(&column) {
                cut -= point[index] * entry;
            }
        }
        // the snap scales with the row so pivoting noise on large systems
        // still lands on an exact zero
        if cut.abs() <= snap_tolerance * (1.0 + rhs.abs()) {
            cut = 0.0;
        }
        cuts.put(&columns[pivot].contract, cut)?;
    }

    Ok(cuts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loancut_domain::Contract;

    fn column(name: &str, precut_value: f64) -> Column {
        Column {
            contract: Contract::continuous(name, 1.0, 0.0, 0.0).unwrap(),
            precut_value,
            growth: 1.0,
        }
    }

    /// x0 - x1 = 1 reduced: pivot {0}, free {1}.
    fn reduced_single_row() -> Matrix {
        let mut matrix = Matrix::from_rows(vec![vec![1.0, -1.0, 1.0], vec![0.0, 0.0, 0.0]]);
        matrix.reduce();
        matrix
    }

    #[test]
    fn splits_pivots_from_free_columns() {
        let matrix = reduced_single_row();
        let split = split_variables(&matrix, 1);
        assert_eq!(split.pivot_columns, vec![0]);
        assert_eq!(split.free_columns, vec![1]);
        assert_eq!(split.lp_index.get(&1), Some(&0));
    }

    #[test]
    fn free_count_is_variables_minus_rank() {
        // two rows, four variables, rank 2
        let mut matrix = Matrix::from_rows(vec![
            vec![1.0, 0.0, 2.0, -1.0, 3.0],
            vec![0.0, 1.0, -1.0, 2.0, 1.0],
        ]);
        let rank = matrix.reduce();
        assert_eq!(rank, 2);
        let split = split_variables(&matrix, rank);
        assert_eq!(split.free_columns.len(), 4 - rank);
        assert_eq!(split.pivot_columns, vec![0, 1]);
        assert_eq!(split.free_columns, vec![2, 3]);
    }

    #[test]
    fn program_encodes_totals_and_bounds() {
        let matrix = reduced_single_row();
        let split = split_variables(&matrix, 1);
        let cols = vec![column("a", 2.0), column("b", 3.0)];
        let (objective, constraints) = build_program(&matrix, &split, &cols);

        // total = b_0 + (1 - (-1)) * y = 1 + 2y
        assert_eq!(objective.constant, 1.0);
        assert_eq!(objective.coefficients, vec![2.0]);

        // x0 >= 0, x0 <= 2, y <= 3
        assert_eq!(constraints.len(), 3);
        assert_eq!(constraints[0].relation, Relation::GreaterOrEqual);
        assert_eq!(constraints[0].coefficients, vec![1.0]);
        assert_eq!(constraints[0].rhs, -1.0);
        assert_eq!(constraints[1].relation, Relation::LessOrEqual);
        assert_eq!(constraints[1].rhs, 2.0 - 1.0);
        assert_eq!(constraints[2].relation, Relation::LessOrEqual);
        assert_eq!(constraints[2].rhs, 3.0);
    }

    #[test]
    fn extraction_recomputes_dependent_cuts() {
        let matrix = reduced_single_row();
        let split = split_variables(&matrix, 1);
        let cols = vec![column("a", 2.0), column("b", 3.0)];
        let cuts = extract_cuts(&matrix, &split, &cols, &[0.5], 1e-9, 4.0).unwrap();
        assert_eq!(cuts.equilibrium_time(), 4.0);
        assert_eq!(cuts.get_named("b"), Some(0.5));
        // x0 = 1 - (-1) * 0.5
        assert_eq!(cuts.get_named("a"), Some(1.5));
        assert!((cuts.sum() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn extraction_snaps_noise_to_zero() {
        // x0 + x1 = 1: at y = 1 the dependent cut is zero up to noise
        let mut matrix = Matrix::from_rows(vec![vec![1.0, 1.0, 1.0]]);
        let rank = matrix.reduce();
        let split = split_variables(&matrix, rank);
        let cols = vec![column("a", 2.0), column("b", 3.0)];
        let cuts = extract_cuts(&matrix, &split, &cols, &[1.0 + 1e-12], 1e-9, 4.0).unwrap();
        assert_eq!(cuts.get_named("a"), Some(0.0));
        assert_eq!(cuts.get_named("b"), Some(1.0 + 1e-12));
    }
}
