//! Householder QR decomposition with optional column pivoting.
//!
//! For an `m × n` matrix `A` the decomposition produces `Q` (`m × n`,
//! orthonormal columns when `m ≥ n`), `R` (`n × n`, upper triangular) and
//! a permutation `P` (`n × n`) with
//!
//! ```text
//! A · P = Q · R
//! ```
//!
//! The factorisation follows MINPACK's `qrfac`: each step reflects the
//! remaining part of column `j` onto a multiple of the unit vector, and with
//! pivoting enabled the remaining column of largest norm is brought forward
//! first. [`QRDecomposition::solve`] follows MINPACK's `qrsolv`.

use log::debug;
use ql_core::{
    errors::{Error, Result},
    QL_EPSILON, Real, Size,
};

use super::{enorm, ensure_finite};
use crate::array::Array;
use crate::matrix::Matrix;

/// QR factors of a matrix.
#[derive(Debug, Clone)]
pub struct QRDecomposition {
    q: Matrix,
    r: Matrix,
    p: Matrix,
    ipvt: Vec<Size>,
    rdiag: Vec<Real>,
}

impl QRDecomposition {
    /// Factorise `a`. With `pivot` set, columns are processed in order of
    /// decreasing remaining norm.
    pub fn new(a: &Matrix, pivot: bool) -> Result<Self> {
        let (m, n) = (a.rows(), a.cols());
        ql_core::ensure!(m > 0 && n > 0, "QR decomposition of an empty {m}x{n} matrix");
        ensure_finite(a, "QR decomposition")?;
        let indexing = a.indexing();
        let minmn = m.min(n);

        let work = a.clone();
        let addr = work.address();
        let at = |i: Size, j: Size| addr.at(i, j);
        let mut guard = work.storage().borrow_mut();
        let w: &mut [Real] = &mut guard;

        let column_norm = |w: &[Real], j: Size, from: Size| enorm((from..m).map(|i| w[at(i, j)]));

        let mut ipvt: Vec<Size> = (0..n).collect();
        let mut rdiag: Vec<Real> = (0..n).map(|j| column_norm(w, j, 0)).collect();
        let mut norms = rdiag.clone();

        for j in 0..minmn {
            if pivot {
                let kmax = (j..n).fold(j, |best, k| if rdiag[k] > rdiag[best] { k } else { best });
                if kmax != j {
                    for i in 0..m {
                        w.swap(at(i, j), at(i, kmax));
                    }
                    rdiag[kmax] = rdiag[j];
                    norms[kmax] = norms[j];
                    ipvt.swap(j, kmax);
                }
            }

            // Householder vector for the trailing part of column j
            let mut ajnorm = column_norm(w, j, j);
            if ajnorm != 0.0 {
                if w[at(j, j)] < 0.0 {
                    ajnorm = -ajnorm;
                }
                for i in j..m {
                    w[at(i, j)] /= ajnorm;
                }
                w[at(j, j)] += 1.0;

                for k in j + 1..n {
                    let sum: Real = (j..m).map(|i| w[at(i, j)] * w[at(i, k)]).sum();
                    let temp = sum / w[at(j, j)];
                    for i in j..m {
                        let vij = w[at(i, j)];
                        w[at(i, k)] -= temp * vij;
                    }
                    if pivot && rdiag[k] != 0.0 {
                        let temp = w[at(j, k)] / rdiag[k];
                        rdiag[k] *= (1.0 - temp * temp).max(0.0).sqrt();
                        if 0.05 * (rdiag[k] / norms[k]).powi(2) <= QL_EPSILON {
                            // downdated norm lost too much precision
                            rdiag[k] = column_norm(w, k, j + 1);
                            norms[k] = rdiag[k];
                        }
                    }
                }
            }
            rdiag[j] = -ajnorm;
        }

        let mut r = vec![0.0; n * n];
        for i in 0..n {
            r[i * n + i] = rdiag[i];
            if i < m {
                for k in i + 1..n {
                    r[i * n + k] = w[at(i, k)];
                }
            }
        }

        let mut q = vec![0.0; m * n];
        let mut e = vec![0.0; m];
        for k in 0..m {
            e.fill(0.0);
            e[k] = 1.0;
            for j in 0..minmn {
                let t3 = w[at(j, j)];
                if t3 != 0.0 {
                    let t = (j..m).map(|i| w[at(i, j)] * e[i]).sum::<Real>() / t3;
                    for i in j..m {
                        e[i] -= w[at(i, j)] * t;
                    }
                }
                q[k * n + j] = e[j];
            }
        }

        let mut p = vec![0.0; n * n];
        for (i, &target) in ipvt.iter().enumerate() {
            p[target * n + i] = 1.0;
        }

        debug!("QR decomposition of {m}x{n} matrix (pivoting: {pivot})");
        Ok(Self {
            q: Matrix::root(m, n, q, indexing),
            r: Matrix::root(n, n, r, indexing),
            p: Matrix::root(n, n, p, indexing),
            ipvt,
            rdiag,
        })
    }

    /// The `m × n` factor with orthonormal columns.
    pub fn q(&self) -> &Matrix {
        &self.q
    }

    /// The `n × n` upper triangular factor.
    pub fn r(&self) -> &Matrix {
        &self.r
    }

    /// The `n × n` column permutation.
    pub fn p(&self) -> &Matrix {
        &self.p
    }

    /// Column `i` of `A · P` is column `ipvt()[i]` of `A`.
    pub fn ipvt(&self) -> &[Size] {
        &self.ipvt
    }

    /// `true` iff no diagonal element of `R` is exactly zero.
    pub fn is_non_singular(&self) -> bool {
        self.rdiag.iter().all(|&d| d != 0.0)
    }

    /// Least-squares solution of `A·x = b`, optionally regularised as
    /// `[A; D]·x = [b; 0]` with the diagonal matrix `D = diag(d)`.
    ///
    /// Rank-deficient systems get the solution whose components along the
    /// singular directions are zero.
    pub fn solve(&self, b: &Array, d: Option<&Array>) -> Result<Array> {
        let (m, n) = (self.q.rows(), self.r.cols());
        if b.size() != m {
            return Err(Error::IncompatibleShape(format!(
                "right-hand side of size {} for a system with {m} rows",
                b.size()
            )));
        }
        let diag = match d {
            Some(d) if d.size() != n => {
                return Err(Error::IncompatibleShape(format!(
                    "regularisation diagonal of size {} for {n} unknowns",
                    d.size()
                )))
            }
            Some(d) => d.to_vec(),
            None => vec![0.0; n],
        };

        let qtb = self.q.transpose().mul_array(b)?.to_vec();
        let mut s = self.r.to_vec();
        let x = qr_solve(n, &mut s, &self.ipvt, &diag, &qtb);
        Ok(Array::root(x, b.indexing()))
    }
}

/// Solve `R·z = Qᵀb` after eliminating the diagonal `diag` with Givens
/// rotations, then undo the column permutation. `s` holds `R` row-major on
/// entry and is used as scratch.
fn qr_solve(n: Size, s: &mut [Real], ipvt: &[Size], diag: &[Real], qtb: &[Real]) -> Vec<Real> {
    let mut rdiag: Vec<Real> = vec![0.0; n];
    let mut z = qtb.to_vec();
    let mut sdiag: Vec<Real> = vec![0.0; n];

    // copy R's upper triangle into the lower one, keep the diagonal aside
    for j in 0..n {
        for i in j..n {
            s[i * n + j] = s[j * n + i];
        }
        rdiag[j] = s[j * n + j];
    }

    for j in 0..n {
        let l = ipvt[j];
        if diag[l] != 0.0 {
            sdiag[j..].fill(0.0);
            sdiag[j] = diag[l];
            let mut qtbpj = 0.0;
            for k in j..n {
                if sdiag[k] == 0.0 {
                    continue;
                }
                let skk = s[k * n + k];
                let (cos, sin) = if skk.abs() < sdiag[k].abs() {
                    let cotan = skk / sdiag[k];
                    let sin = 0.5 / (0.25 + 0.25 * cotan * cotan).sqrt();
                    (sin * cotan, sin)
                } else {
                    let tan = sdiag[k] / skk;
                    let cos = 0.5 / (0.25 + 0.25 * tan * tan).sqrt();
                    (cos, cos * tan)
                };
                s[k * n + k] = cos * skk + sin * sdiag[k];
                let temp = cos * z[k] + sin * qtbpj;
                qtbpj = -sin * z[k] + cos * qtbpj;
                z[k] = temp;
                for i in k + 1..n {
                    let sik = s[i * n + k];
                    s[i * n + k] = cos * sik + sin * sdiag[i];
                    sdiag[i] = -sin * sik + cos * sdiag[i];
                }
            }
        }
        sdiag[j] = s[j * n + j];
        s[j * n + j] = rdiag[j];
    }

    let nsing = sdiag.iter().position(|&v| v == 0.0).unwrap_or(n);
    z[nsing..].fill(0.0);
    for j in (0..nsing).rev() {
        let sum: Real = (j + 1..nsing).map(|i| s[i * n + j] * z[i]).sum();
        z[j] = (z[j] - sum) / sdiag[j];
    }

    let mut x = vec![0.0; n];
    for (j, &target) in ipvt.iter().enumerate() {
        x[target] = z[j];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_matrix_eq(a: &Matrix, b: &Matrix, tol: Real) {
        assert_eq!((a.rows(), a.cols()), (b.rows(), b.cols()));
        for (x, y) in a.to_vec().iter().zip(b.to_vec()) {
            assert_abs_diff_eq!(*x, y, epsilon = tol);
        }
    }

    fn sample() -> Matrix {
        Matrix::from_rows(&[
            &[1.0, 2.0, 3.0],
            &[4.0, 5.0, 6.0],
            &[7.0, 8.0, 10.0],
            &[2.0, -1.0, 0.5],
        ])
        .unwrap()
    }

    #[test]
    fn reconstructs_with_and_without_pivoting() {
        let a = sample();
        for pivot in [false, true] {
            let qr = a.qr(pivot).unwrap();
            let ap = a.mul(qr.p()).unwrap();
            let product = qr.q().mul(qr.r()).unwrap();
            assert_matrix_eq(&ap, &product, 1e-12);
            assert!(qr.is_non_singular());
            let qtq = qr.q().transpose().mul(qr.q()).unwrap();
            assert_matrix_eq(&qtq, &Matrix::identity(3), 1e-12);
        }
    }

    #[test]
    fn r_is_upper_triangular() {
        let qr = sample().qr(true).unwrap();
        for i in 0..3 {
            for j in 0..i {
                assert_eq!(qr.r().get(i, j).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn pivoting_brings_largest_column_first() {
        let a = Matrix::from_rows(&[&[1.0, 10.0], &[0.0, 10.0]]).unwrap();
        let qr = a.qr(true).unwrap();
        assert_eq!(qr.ipvt(), &[1, 0]);
        assert_eq!(qr.p().get(1, 0).unwrap(), 1.0);
        assert_eq!(qr.p().get(0, 1).unwrap(), 1.0);
        assert_eq!(a.qr(false).unwrap().ipvt(), &[0, 1]);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let a = Matrix::from_rows(&[&[1.0, 0.0], &[2.0, 0.0]]).unwrap();
        assert!(!a.qr(false).unwrap().is_non_singular());
    }

    #[test]
    fn solves_square_system() {
        let a = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        let b = Array::from_slice(&[5.0, 6.0]);
        for pivot in [false, true] {
            let x = a.qr(pivot).unwrap().solve(&b, None).unwrap();
            assert_abs_diff_eq!(x.get(0).unwrap(), -4.0, epsilon = 1e-12);
            assert_abs_diff_eq!(x.get(1).unwrap(), 4.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn solves_least_squares_line_fit() {
        let a = Matrix::from_rows(&[&[1.0, 0.0], &[1.0, 1.0], &[1.0, 2.0], &[1.0, 3.0]]).unwrap();
        let b = Array::from_slice(&[1.0, 3.0, 5.0, 7.0]);
        let x = a.qr(true).unwrap().solve(&b, None).unwrap();
        assert_abs_diff_eq!(x.get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(1).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn regularised_solve_shrinks_solution() {
        let a = Matrix::identity(2);
        let b = Array::from_slice(&[1.0, 1.0]);
        let d = Array::from_slice(&[1.0, 1.0]);
        let x = a.qr(false).unwrap().solve(&b, Some(&d)).unwrap();
        assert_abs_diff_eq!(x.get(0).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(1).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn solve_checks_sizes() {
        let qr = Matrix::identity(2).qr(false).unwrap();
        assert!(matches!(
            qr.solve(&Array::new(3), None),
            Err(Error::IncompatibleShape(_))
        ));
        assert!(qr.solve(&Array::new(2), Some(&Array::new(1))).is_err());
    }

    #[test]
    fn input_is_untouched_and_indexing_kept() {
        let a = sample().to_fortran();
        let before = a.to_vec();
        let qr = a.qr(true).unwrap();
        assert_eq!(a.to_vec(), before);
        assert!(qr.q().is_fortran());
        assert!(qr.r().get(1, 1).is_ok());
        assert!(qr.r().get(0, 0).is_err());
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert!(Matrix::new(0, 2).qr(false).is_err());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        for bad in [Real::NAN, Real::INFINITY] {
            let mut a = sample();
            a.set(2, 1, bad).unwrap();
            for pivot in [false, true] {
                assert!(matches!(a.qr(pivot), Err(Error::InvalidArgument(_))));
            }
        }
    }
}
