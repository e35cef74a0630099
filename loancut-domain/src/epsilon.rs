//! The comparison tolerance shared by equity checks, matrix pivoting and
//! cut extraction.
//!
//! A process-wide default can be adjusted through [`set_epsilon`]; values
//! outside `(0, 1]` are ignored, keeping the previous setting. Components
//! capture an [`Epsilon`] once (a `Graph` does so at construction) and
//! thread it explicitly, so the global is a convenience knob rather than a
//! hidden dependency.

use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_EPSILON: f64 = 1e-3;
const MAX_EPSILON: f64 = 1.0;

static EPSILON_BITS: AtomicU64 = AtomicU64::new(DEFAULT_EPSILON.to_bits());

/// Sets the process-wide default tolerance.
///
/// NaN, infinite, non-positive or greater-than-one values are silently
/// ignored. Configure before building graphs; a `Graph` captures the value
/// current at its construction.
pub fn set_epsilon(value: f64) {
    if !value.is_finite() || value <= 0.0 || value > MAX_EPSILON {
        return;
    }
    EPSILON_BITS.store(value.to_bits(), Ordering::Relaxed);
}

/// Reads the process-wide default tolerance.
pub fn current_epsilon() -> f64 {
    f64::from_bits(EPSILON_BITS.load(Ordering::Relaxed))
}

/// An absolute comparison tolerance in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epsilon(f64);

impl Epsilon {
    /// Wraps a tolerance, rejecting values outside `(0, 1]`.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 && value <= MAX_EPSILON {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Captures the process-wide default.
    pub fn current() -> Self {
        Self(current_epsilon())
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `|a - b| <= epsilon`.
    pub fn eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.0
    }

    /// `|value| <= epsilon`.
    pub fn is_zero(self, value: f64) -> bool {
        value.abs() <= self.0
    }
}

impl Default for Epsilon {
    fn default() -> Self {
        Self::current()
    }
}
