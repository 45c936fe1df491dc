//! Matrix decompositions built on [`Matrix`](crate::matrix::Matrix).
//!
//! Both decompositions copy their input into a private working matrix and
//! hand back freshly allocated factors; the caller's matrix and any views
//! over it are never touched.

pub mod qr;
pub mod svd;

pub use qr::QRDecomposition;
pub use svd::SVD;

use ql_core::{
    errors::{Error, Result},
    Real, Size,
};

use crate::address::Address;
use crate::matrix::Matrix;

/// Reject matrices holding NaN or infinite entries.
pub(crate) fn ensure_finite(a: &Matrix, what: &str) -> Result<()> {
    let data = a.storage().borrow();
    match a.address().iter().find(|&o| !data[o].is_finite()) {
        Some(o) => Err(Error::InvalidArgument(format!(
            "{what} of a matrix with a non-finite entry ({})",
            data[o]
        ))),
        None => Ok(()),
    }
}

/// Apply the plane rotation `(cs, sn)` to columns `j` and `k` of the
/// `rows`-row matrix stored in `buf` under `addr`:
/// `x_j ← cs·x_j + sn·x_k`, `x_k ← cs·x_k − sn·x_j`.
pub(crate) fn rotate_columns(
    buf: &mut [Real],
    addr: &Address,
    rows: Size,
    j: Size,
    k: Size,
    cs: Real,
    sn: Real,
) {
    for i in 0..rows {
        let (oj, ok) = (addr.at(i, j), addr.at(i, k));
        let t = cs * buf[oj] + sn * buf[ok];
        buf[ok] = -sn * buf[oj] + cs * buf[ok];
        buf[oj] = t;
    }
}

/// Exchange columns `j` and `k` of the `rows`-row matrix in `buf`.
pub(crate) fn swap_columns(buf: &mut [Real], addr: &Address, rows: Size, j: Size, k: Size) {
    for i in 0..rows {
        buf.swap(addr.at(i, j), addr.at(i, k));
    }
}

/// Euclidean norm of `x` computed without intermediate overflow.
pub(crate) fn enorm(x: impl IntoIterator<Item = Real>) -> Real {
    x.into_iter().fold(0.0, Real::hypot)
}
