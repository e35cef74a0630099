//! Big-M simplex minimization.
//!
//! Minimize `c . x + k` subject to a list of linear constraints and, by
//! default, `x >= 0`. Free variables are supported through the usual
//! difference-of-two-non-negatives split.

// Indexed loops are clearer for tableau operations.
#![allow(clippy::needless_range_loop)]

use std::cmp::Ordering;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimplexError {
    #[error("the program has no feasible point")]
    Infeasible,
    #[error("the objective is unbounded below on the feasible region")]
    Unbounded,
    #[error("no optimum found within {0} iterations")]
    IterationLimit(usize),
    #[error("constraint {index} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("the objective has no coefficients")]
    EmptyObjective,
}

/// Relation of a constraint's left-hand side to its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    fn flipped(self) -> Self {
        match self {
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::GreaterOrEqual => Self::LessOrEqual,
            Self::Equal => Self::Equal,
        }
    }
}

/// `coefficients . x <relation> rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            coefficients,
            relation,
            rhs,
        }
    }
}

/// `coefficients . x + constant`, to be minimized.
#[derive(Debug, Clone)]
pub struct Objective {
    pub coefficients: Vec<f64>,
    pub constant: f64,
}

impl Objective {
    pub fn new(coefficients: Vec<f64>, constant: f64) -> Self {
        Self {
            coefficients,
            constant,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Tolerance for reduced costs, ratio tests and feasibility checks.
    pub tolerance: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

/// An optimum: the point attaining it, the objective value there and the
/// number of pivots performed.
#[derive(Debug, Clone, PartialEq)]
pub struct PointValue {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Minimizes `objective` subject to `constraints`.
///
/// With `non_negative` set every variable is constrained to `x >= 0`;
/// otherwise variables are free and internally split as `x = u - v`.
pub fn minimize(
    objective: &Objective,
    constraints: &[Constraint],
    non_negative: bool,
    options: &SimplexOptions,
) -> Result<PointValue, SimplexError> {
    let n = objective.coefficients.len();
    if n == 0 {
        return Err(SimplexError::EmptyObjective);
    }
    for (index, constraint) in constraints.iter().enumerate() {
        if constraint.coefficients.len() != n {
            return Err(SimplexError::DimensionMismatch {
                index,
                expected: n,
                found: constraint.coefficients.len(),
            });
        }
    }

    if non_negative {
        return solve_non_negative(
            &objective.coefficients,
            objective.constant,
            constraints,
            options,
        );
    }

    // x = u - v with u, v >= 0
    let mut split_costs = Vec::with_capacity(2 * n);
    split_costs.extend_from_slice(&objective.coefficients);
    split_costs.extend(objective.coefficients.iter().map(|&c| -c));
    let split_constraints: Vec<Constraint> = constraints
        .iter()
        .map(|constraint| {
            let mut coefficients = Vec::with_capacity(2 * n);
            coefficients.extend_from_slice(&constraint.coefficients);
            coefficients.extend(constraint.coefficients.iter().map(|&c| -c));
            Constraint::new(coefficients, constraint.relation, constraint.rhs)
        })
        .collect();
    let split = solve_non_negative(
        &split_costs,
        objective.constant,
        &split_constraints,
        options,
    )?;
    let point: Vec<f64> = (0..n).map(|i| split.point[i] - split.point[n + i]).collect();
    Ok(PointValue {
        point,
        value: split.value,
        iterations: split.iterations,
    })
}

struct NormalizedRow {
    coefficients: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

fn solve_non_negative(
    costs: &[f64],
    constant: f64,
    constraints: &[Constraint],
    options: &SimplexOptions,
) -> Result<PointValue, SimplexError> {
    let n = costs.len();
    let m = constraints.len();
    let tol = options.tolerance;

    if m == 0 {
        // with x >= 0 and nothing else, any negative cost escapes to infinity
        if costs.iter().any(|&c| c < -tol) {
            return Err(SimplexError::Unbounded);
        }
        return Ok(PointValue {
            point: vec![0.0; n],
            value: constant,
            iterations: 0,
        });
    }

    // Normalize to non-negative right-hand sides.
    let rows: Vec<NormalizedRow> = constraints
        .iter()
        .map(|constraint| {
            if constraint.rhs < 0.0 {
                NormalizedRow {
                    coefficients: constraint.coefficients.iter().map(|&c| -c).collect(),
                    relation: constraint.relation.flipped(),
                    rhs: -constraint.rhs,
                }
            } else {
                NormalizedRow {
                    coefficients: constraint.coefficients.clone(),
                    relation: constraint.relation,
                    rhs: constraint.rhs,
                }
            }
        })
        .collect();

    let n_slack = rows
        .iter()
        .filter(|r| r.relation == Relation::LessOrEqual)
        .count();
    let n_surplus = rows
        .iter()
        .filter(|r| r.relation == Relation::GreaterOrEqual)
        .count();
    // one artificial per >= or = row
    let n_artificial = m - n_slack;
    let art_start = n + n_slack + n_surplus;
    let total = art_start + n_artificial;
    let rhs_col = total;

    // The penalty must dominate every cost and right-hand side, but not
    // by so much that it drowns genuine reduced costs in rounding noise.
    let data_scale = rows
        .iter()
        .map(|r| r.rhs.abs())
        .chain(costs.iter().map(|&c| c.abs()))
        .fold(1.0f64, f64::max);
    let big_m = 1e5 * data_scale;

    let mut tableau = vec![vec![0.0; total + 1]; m + 1];
    let mut basis = vec![0usize; m];
    let mut slack_index = n;
    let mut surplus_index = n + n_slack;
    let mut artificial_index = art_start;

    for (i, row) in rows.iter().enumerate() {
        tableau[i][..n].copy_from_slice(&row.coefficients);
        tableau[i][rhs_col] = row.rhs;
        match row.relation {
            Relation::LessOrEqual => {
                tableau[i][slack_index] = 1.0;
                basis[i] = slack_index;
                slack_index += 1;
            }
            Relation::GreaterOrEqual => {
                tableau[i][surplus_index] = -1.0;
                surplus_index += 1;
                tableau[i][artificial_index] = 1.0;
                basis[i] = artificial_index;
                artificial_index += 1;
            }
            Relation::Equal => {
                tableau[i][artificial_index] = 1.0;
                basis[i] = artificial_index;
                artificial_index += 1;
            }
        }
    }

    for j in 0..n {
        tableau[m][j] = costs[j];
    }
    for j in art_start..total {
        tableau[m][j] = big_m;
    }
    // Canonicalize the objective row over the artificial basis.
    for i in 0..m {
        if basis[i] >= art_start {
            for j in 0..=total {
                let correction = big_m * tableau[i][j];
                tableau[m][j] -= correction;
            }
        }
    }

    let mut iterations = 0usize;
    loop {
        if iterations >= options.max_iterations {
            return Err(SimplexError::IterationLimit(options.max_iterations));
        }

        // Dantzig's rule normally; Bland's rule once the iteration count
        // suggests cycling on a degenerate vertex.
        let use_bland = iterations * 2 >= options.max_iterations;
        let entering = if use_bland {
            (0..total).find(|&j| tableau[m][j] < -tol)
        } else {
            (0..total)
                .filter(|&j| tableau[m][j] < -tol)
                .min_by(|&a, &b| {
                    tableau[m][a]
                        .partial_cmp(&tableau[m][b])
                        .unwrap_or(Ordering::Equal)
                })
        };
        let Some(pivot_col) = entering else {
            break;
        };

        let mut pivot_row: Option<usize> = None;
        let mut best_ratio = f64::INFINITY;
        for i in 0..m {
            let coefficient = tableau[i][pivot_col];
            if coefficient <= tol {
                continue;
            }
            let ratio = tableau[i][rhs_col] / coefficient;
            let take = match pivot_row {
                None => true,
                Some(current) => {
                    if (ratio - best_ratio).abs() <= tol {
                        // tie-break on the basis variable to dodge cycling
                        basis[i] < basis[current]
                    } else {
                        ratio < best_ratio
                    }
                }
            };
            if take {
                best_ratio = ratio;
                pivot_row = Some(i);
            }
        }
        let Some(pivot_row) = pivot_row else {
            let artificial_active = basis
                .iter()
                .enumerate()
                .any(|(i, &b)| b >= art_start && tableau[i][rhs_col] > tol);
            return Err(if artificial_active {
                SimplexError::Infeasible
            } else {
                SimplexError::Unbounded
            });
        };

        let pivot_value = tableau[pivot_row][pivot_col];
        for j in 0..=total {
            tableau[pivot_row][j] /= pivot_value;
        }
        for i in 0..=m {
            if i != pivot_row {
                let factor = tableau[i][pivot_col];
                if factor != 0.0 {
                    for j in 0..=total {
                        tableau[i][j] -= factor * tableau[pivot_row][j];
                    }
                }
            }
        }
        basis[pivot_row] = pivot_col;
        iterations += 1;
    }

    // An artificial variable surviving at a positive level means the
    // original constraints cannot be met.
    for (i, &b) in basis.iter().enumerate() {
        if b >= art_start && tableau[i][rhs_col] > tol {
            return Err(SimplexError::Infeasible);
        }
    }

    let mut point = vec![0.0; n];
    for (i, &b) in basis.iter().enumerate() {
        if b < n {
            point[b] = tableau[i][rhs_col].max(0.0);
        }
    }
    let value = constant
        + point
            .iter()
            .zip(costs)
            .map(|(&x, &c)| x * c)
            .sum::<f64>();

    Ok(PointValue {
        point,
        value,
        iterations,
    })
}
