#![warn(clippy::uninlined_format_args)]

//! Debt-cut finders over the financial graph.
//!
//! [`SimplexCutFinder`] is the real thing: it expresses the equilibrium
//! condition as an augmented linear system over the unknown cuts, reduces
//! it to reduced row echelon form, rewrites the affine solution variety as
//! a bounded linear program minimizing the total cut, and reads the cuts
//! off the simplex optimum. [`FullCutFinder`] is the blunt baseline that
//! forgives every contract entirely.

mod finder;
mod program;
mod system;

pub use finder::{FullCutFinder, SimplexCutFinder};
