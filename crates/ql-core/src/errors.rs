//! Error types for the numerical core.
//!
//! Every fallible operation returns [`Result`]. The variants fall into three
//! families: precondition violations (bad shapes, indices, arguments),
//! numerical non-convergence, and unsupported operations. The
//! `ensure!` macro covers the common early-return pattern.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Precondition violated (raised by `ensure!`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range, as supplied.
        index: usize,
        /// The extent of the indexed dimension.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand shapes do not agree.
    #[error("incompatible shape: {0}")]
    IncompatibleShape(String),

    /// A bulk operation was requested on a strided or index-mapped view.
    #[error("operation not supported on non-contiguous data")]
    NonContiguous,

    /// The adaptive integrator ran out of function evaluations.
    #[error("failed to converge: maximum number of function evaluations exceeded ({evaluations} of {max})")]
    EvaluationBudgetExceeded {
        /// Evaluations performed so far.
        evaluations: usize,
        /// Configured budget.
        max: usize,
    },

    /// An iterative algorithm hit its iteration cap.
    #[error("failed to converge: {0}")]
    NotConverged(String),

    /// The operation is not allowed on this object (e.g. a read-only view).
    #[error("operation not supported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Whether the error reports a numerical failure to converge rather
    /// than a misuse of the API.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            Error::EvaluationBudgetExceeded { .. } | Error::NotConverged(_)
        )
    }
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}
