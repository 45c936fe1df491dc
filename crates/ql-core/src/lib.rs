//! # ql-core
//!
//! Core types and error definitions for the numerical crates.
//!
//! This crate provides the foundational building blocks shared across the
//! workspace – primitive type aliases, process-wide numeric constants and
//! the error hierarchy with its `ensure!` macro.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Machine-precision constants.
pub mod constants;

/// Error types and the `ensure!` macro.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use constants::{QL_EPSILON, QL_MIN_POSITIVE_REAL, QL_TINY_REAL};
pub use errors::{Error, Result};
