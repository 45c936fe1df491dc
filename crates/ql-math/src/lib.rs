//! # ql-math
//!
//! Dense linear algebra and quadrature: [`Array`] and [`Matrix`] views over
//! shared storage, QR and singular value decompositions, and numerical
//! integration of scalar functions.
//!
//! Arrays and matrices own a reference-counted buffer. Range, row, column
//! and index-mapped views share that buffer with their parent, so writes
//! through a view are visible in the parent and vice versa. Views may use
//! zero-based or Fortran (one-based) indexing.
//!
//! ```
//! use ql_math::Matrix;
//!
//! let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
//! let mut col = m.range_col(1, 0, 2).unwrap();
//! // a column of a row-major matrix is strided
//! assert!(col.fill(0.0).is_err());
//! col.set(0, 9.0).unwrap();
//! assert_eq!(m.get(0, 1).unwrap(), 9.0);
//! assert_eq!(m.transpose().get(1, 0).unwrap(), 9.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Index translation for strided, ranged and mapped views.
pub mod address;

/// One-dimensional arrays.
pub mod array;

/// Numerical integration.
pub mod integrals;

/// Two-dimensional matrices.
pub mod matrix;

/// QR and singular value decompositions.
pub mod matrix_utilities;

mod storage;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use address::{Address, Indexing};
pub use array::Array;
pub use integrals::{
    Estimate, GaussKronrodAdaptive, GaussKronrodNonAdaptive, Integrator, SegmentIntegral,
    SimpsonIntegral, TrapezoidIntegral,
};
pub use matrix::Matrix;
pub use matrix_utilities::{QRDecomposition, SVD};
