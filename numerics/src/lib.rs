//! # numerics
//!
//! Numerical core of the quantitative finance library.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! quantlib-numerics = "0.1"
//! ```
//!
//! ```rust
//! use numerics::math::{GaussKronrodAdaptive, Integrator, Matrix};
//!
//! let gk = GaussKronrodAdaptive::new(1e-10, 1000).unwrap();
//! let area = gk.integrate(|x| x * x, 0.0, 3.0).unwrap();
//! assert!((area - 9.0).abs() < 1e-10);
//!
//! let a = Matrix::from_rows(&[&[4.0, 0.0], &[3.0, -5.0]]).unwrap();
//! let svd = a.svd().unwrap();
//! assert!((svd.cond() - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, matrices, decompositions and integrators.
pub use ql_math as math;

