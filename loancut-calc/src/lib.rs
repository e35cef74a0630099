#![warn(clippy::uninlined_format_args)]

pub mod matrix;
pub mod simplex;

pub use matrix::{Matrix, MatrixError};
pub use simplex::{
    Constraint, Objective, PointValue, Relation, SimplexError, SimplexOptions, minimize,
};
