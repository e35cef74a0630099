//! Dense augmented matrices and Gauss-Jordan reduction.
//!
//! The last column is always the augmentation. Entries are addressed as
//! `(column, row)`; storage is row-major.

// Indexed loops are clearer for elimination over flat storage.
#![allow(clippy::needless_range_loop)]

use thiserror::Error;

pub const DEFAULT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    #[error("row factor must be finite (got {0})")]
    NonFiniteFactor(f64),
    #[error("the consistency probe requires a freshly reduced matrix")]
    NotReduced,
    #[error("tolerance must be in (0, 1] (got {0})")]
    InvalidTolerance(f64),
}

/// A `rows x columns` matrix of reals, the last column being the
/// augmentation of a linear system.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
    tolerance: f64,
    reduced: bool,
}

impl Matrix {
    /// A zero matrix. `columns` includes the augmentation column.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
            tolerance: DEFAULT_TOLERANCE,
            reduced: false,
        }
    }

    /// Builds a matrix from equally long rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let row_count = rows.len();
        let columns = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|r| r.len() == columns));
        let mut data = Vec::with_capacity(row_count * columns);
        for row in rows {
            data.extend(row);
        }
        Self {
            rows: row_count,
            columns,
            data,
            tolerance: DEFAULT_TOLERANCE,
            reduced: false,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count, augmentation included.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), MatrixError> {
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance > 1.0 {
            return Err(MatrixError::InvalidTolerance(tolerance));
        }
        self.tolerance = tolerance;
        Ok(())
    }

    #[inline]
    fn index(&self, column: usize, row: usize) -> usize {
        debug_assert!(column < self.columns && row < self.rows);
        row * self.columns + column
    }

    pub fn get(&self, column: usize, row: usize) -> f64 {
        self.data[self.index(column, row)]
    }

    pub fn set(&mut self, column: usize, row: usize, value: f64) {
        self.reduced = false;
        let index = self.index(column, row);
        self.data[index] = value;
    }

    /// Adds `delta` to the entry at `(column, row)`.
    pub fn add(&mut self, column: usize, row: usize, delta: f64) {
        self.reduced = false;
        let index = self.index(column, row);
        self.data[index] += delta;
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.reduced = false;
        self.raw_swap_rows(a, b);
    }

    pub fn scale_row(&mut self, row: usize, factor: f64) -> Result<(), MatrixError> {
        check_factor(factor)?;
        self.reduced = false;
        self.raw_scale_row(row, factor);
        Ok(())
    }

    /// `target += factor * source`, element-wise.
    pub fn add_row_multiple(
        &mut self,
        target: usize,
        source: usize,
        factor: f64,
    ) -> Result<(), MatrixError> {
        check_factor(factor)?;
        self.reduced = false;
        self.raw_add_row_multiple(target, source, factor);
        Ok(())
    }

    fn raw_swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for k in 0..self.columns {
            self.data.swap(a * self.columns + k, b * self.columns + k);
        }
    }

    fn raw_scale_row(&mut self, row: usize, factor: f64) {
        let start = row * self.columns;
        for value in &mut self.data[start..start + self.columns] {
            *value *= factor;
        }
    }

    fn raw_add_row_multiple(&mut self, target: usize, source: usize, factor: f64) {
        for k in 0..self.columns {
            let contribution = self.data[source * self.columns + k] * factor;
            self.data[target * self.columns + k] += contribution;
        }
    }

    #[inline]
    fn near_zero(&self, value: f64) -> bool {
        value.abs() <= self.tolerance
    }

    /// Gauss-Jordan elimination to reduced row echelon form.
    ///
    /// Walks the coefficient columns left to right, promoting the topmost
    /// unprocessed row with a pivot above the tolerance, normalizing it
    /// and eliminating the column everywhere else. Returns the rank — the
    /// number of pivot rows, equivalently of dependent variables.
    pub fn reduce(&mut self) -> usize {
        let mut processed = 0;
        for k in 0..self.columns.saturating_sub(1) {
            if processed == self.rows {
                break;
            }
            let Some(pivot_row) =
                (processed..self.rows).find(|&r| !self.near_zero(self.get(k, r)))
            else {
                continue;
            };
            self.raw_swap_rows(pivot_row, processed);
            let pivot = self.get(k, processed);
            self.raw_scale_row(processed, 1.0 / pivot);
            for r in 0..self.rows {
                if r != processed {
                    let factor = -self.get(k, r);
                    if factor != 0.0 {
                        self.raw_add_row_multiple(r, processed, factor);
                    }
                }
            }
            processed += 1;
        }
        self.reduced = true;
        processed
    }

    /// Whether the reduced system is consistent: no row may be zero in
    /// every coefficient while carrying a non-zero augmentation entry.
    ///
    /// Only valid directly after [`reduce`](Self::reduce); any mutation in
    /// between invalidates the probe.
    pub fn has_solution(&self) -> Result<bool, MatrixError> {
        if !self.reduced {
            return Err(MatrixError::NotReduced);
        }
        'rows: for row in 0..self.rows {
            for column in 0..self.columns - 1 {
                if !self.near_zero(self.get(column, row)) {
                    continue 'rows;
                }
            }
            if !self.near_zero(self.get(self.columns - 1, row)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn check_factor(factor: f64) -> Result<(), MatrixError> {
    if factor.is_finite() {
        Ok(())
    } else {
        Err(MatrixError::NonFiniteFactor(factor))
    }
}
