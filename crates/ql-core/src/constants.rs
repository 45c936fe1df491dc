//! Process-wide numeric constants.

use crate::Real;

/// Machine epsilon for `Real` (2⁻⁵²).
pub const QL_EPSILON: Real = f64::EPSILON;

/// Smallest positive normalised `Real`.
pub const QL_MIN_POSITIVE_REAL: Real = f64::MIN_POSITIVE;

/// Threshold below which SVD treats an off-diagonal or singular value as
/// negligible regardless of scale (2⁻⁹⁶⁶).
pub const QL_TINY_REAL: Real = 1.603_334_688_007_178_2e-291;
