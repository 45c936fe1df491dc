//! Singular value decomposition.
//!
//! Golub-Kahan bidiagonalisation followed by implicit-shift QR sweeps on
//! the bidiagonal (the classical JAMA formulation). For an `m × n` matrix
//! `A` with `k = min(m, n)`:
//!
//! ```text
//! A = U · S · Vᵀ,   U: m × k,   S = diag(σ₁ ≥ … ≥ σₖ ≥ 0),   V: n × k
//! ```
//!
//! Wide matrices (`m < n`) are handled by decomposing `Aᵀ` and swapping
//! the roles of `U` and `V`. Input with NaN or infinite entries is
//! rejected up front; for finite input every pass either deflates, splits,
//! or performs a QR sweep that drives an off-diagonal element towards zero.

use log::{debug, trace};
use ql_core::{
    constants::{QL_EPSILON, QL_TINY_REAL},
    ensure,
    errors::Result,
    Real, Size,
};

use super::{ensure_finite, rotate_columns, swap_columns};
use crate::address::Indexing;
use crate::array::Array;
use crate::matrix::Matrix;

/// Singular value decomposition of a matrix.
#[derive(Debug, Clone)]
pub struct SVD {
    u: Matrix,
    v: Matrix,
    s: Vec<Real>,
    m: Size,
    n: Size,
    indexing: Indexing,
}

impl SVD {
    /// Decompose `a`. The input is copied; `a` is left unchanged.
    pub fn new(a: &Matrix) -> Result<Self> {
        let (m, n) = (a.rows(), a.cols());
        ensure!(m > 0 && n > 0, "SVD of an empty {m}x{n} matrix");
        ensure_finite(a, "SVD")?;
        let (u, s, v) = if m >= n {
            decompose(a)
        } else {
            let (u, s, v) = decompose(&a.transpose());
            (v, s, u)
        };
        Ok(Self {
            u,
            v,
            s,
            m,
            n,
            indexing: a.indexing(),
        })
    }

    /// Left singular vectors (`m × k`).
    pub fn u(&self) -> &Matrix {
        &self.u
    }

    /// Right singular vectors (`n × k`).
    pub fn v(&self) -> &Matrix {
        &self.v
    }

    /// Singular values in non-increasing order.
    pub fn singular_values(&self) -> Array {
        Array::root(self.s.clone(), self.indexing)
    }

    /// `k × k` diagonal matrix of the singular values.
    pub fn s(&self) -> Matrix {
        let k = self.s.len();
        let mut data = vec![0.0; k * k];
        for (i, &sigma) in self.s.iter().enumerate() {
            data[i * k + i] = sigma;
        }
        Matrix::root(k, k, data, self.indexing)
    }

    /// Two-norm of the matrix (largest singular value).
    pub fn norm2(&self) -> Real {
        self.s[0]
    }

    /// Ratio of the largest to the smallest singular value.
    pub fn cond(&self) -> Real {
        self.s[0] / self.s[self.s.len() - 1]
    }

    /// Number of singular values above `max(m, n) · σ₁ · ε`.
    pub fn rank(&self) -> Size {
        let tol = self.m.max(self.n) as Real * self.s[0] * QL_EPSILON;
        self.s.iter().filter(|&&sigma| sigma > tol).count()
    }
}

/// Decompose a tall (`m ≥ n`) matrix into `(U, σ, V)`.
fn decompose(a: &Matrix) -> (Matrix, Vec<Real>, Matrix) {
    let (m, n) = (a.rows(), a.cols());
    debug_assert!(m >= n && n > 0);
    let nu = n;
    let indexing = a.indexing();

    let work = a.clone();
    let u_mat = Matrix::with_indexing(m, nu, indexing);
    let v_mat = Matrix::with_indexing(n, n, indexing);
    let mut s: Vec<Real> = vec![0.0; n];
    let mut e: Vec<Real> = vec![0.0; n];
    let mut col: Vec<Real> = vec![0.0; m];
    let mut sweeps = 0usize;

    {
        let (wa, ua, va) = (work.address(), u_mat.address(), v_mat.address());
        let mut a_guard = work.storage().borrow_mut();
        let mut u_guard = u_mat.storage().borrow_mut();
        let mut v_guard = v_mat.storage().borrow_mut();
        let ad: &mut [Real] = &mut a_guard;
        let ud: &mut [Real] = &mut u_guard;
        let vd: &mut [Real] = &mut v_guard;
        let ia = |i: Size, j: Size| wa.at(i, j);
        let iu = |i: Size, j: Size| ua.at(i, j);
        let iv = |i: Size, j: Size| va.at(i, j);

        // ── Bidiagonalisation ────────────────────────────────────────────────
        let nct = (m - 1).min(n);
        let nrt = n.saturating_sub(2).min(m);
        for k in 0..nct.max(nrt) {
            if k < nct {
                // column transformation: zero A[k+1.., k]
                s[k] = 0.0;
                for i in k..m {
                    s[k] = s[k].hypot(ad[ia(i, k)]);
                }
                if s[k] != 0.0 {
                    if ad[ia(k, k)] < 0.0 {
                        s[k] = -s[k];
                    }
                    for i in k..m {
                        ad[ia(i, k)] /= s[k];
                    }
                    ad[ia(k, k)] += 1.0;
                }
                s[k] = -s[k];
            }
            for j in k + 1..n {
                if k < nct && s[k] != 0.0 {
                    let mut t: Real = (k..m).map(|i| ad[ia(i, k)] * ad[ia(i, j)]).sum();
                    t = -t / ad[ia(k, k)];
                    for i in k..m {
                        let aik = ad[ia(i, k)];
                        ad[ia(i, j)] += t * aik;
                    }
                }
                // row k of A feeds the row transformation below
                e[j] = ad[ia(k, j)];
            }
            if k < nct {
                for i in k..m {
                    ud[iu(i, k)] = ad[ia(i, k)];
                }
            }
            if k < nrt {
                // row transformation: zero e[k+2..]
                e[k] = 0.0;
                for i in k + 1..n {
                    e[k] = e[k].hypot(e[i]);
                }
                if e[k] != 0.0 {
                    if e[k + 1] < 0.0 {
                        e[k] = -e[k];
                    }
                    for i in k + 1..n {
                        e[i] /= e[k];
                    }
                    e[k + 1] += 1.0;
                }
                e[k] = -e[k];
                if k + 1 < m && e[k] != 0.0 {
                    col[k + 1..m].fill(0.0);
                    for j in k + 1..n {
                        for i in k + 1..m {
                            col[i] += e[j] * ad[ia(i, j)];
                        }
                    }
                    for j in k + 1..n {
                        let t = -e[j] / e[k + 1];
                        for i in k + 1..m {
                            ad[ia(i, j)] += t * col[i];
                        }
                    }
                }
                for i in k + 1..n {
                    vd[iv(i, k)] = e[i];
                }
            }
        }

        // bidiagonal of order p
        let mut p = n;
        if nct < n {
            s[nct] = ad[ia(nct, nct)];
        }
        if nrt + 1 < p {
            e[nrt] = ad[ia(nrt, p - 1)];
        }
        e[p - 1] = 0.0;

        // ── Accumulate U ─────────────────────────────────────────────────────
        for j in nct..nu {
            for i in 0..m {
                ud[iu(i, j)] = 0.0;
            }
            ud[iu(j, j)] = 1.0;
        }
        for k in (0..nct).rev() {
            if s[k] != 0.0 {
                for j in k + 1..nu {
                    let mut t: Real = (k..m).map(|i| ud[iu(i, k)] * ud[iu(i, j)]).sum();
                    t = -t / ud[iu(k, k)];
                    for i in k..m {
                        let uik = ud[iu(i, k)];
                        ud[iu(i, j)] += t * uik;
                    }
                }
                for i in k..m {
                    ud[iu(i, k)] = -ud[iu(i, k)];
                }
                ud[iu(k, k)] += 1.0;
                for i in 0..k {
                    ud[iu(i, k)] = 0.0;
                }
            } else {
                for i in 0..m {
                    ud[iu(i, k)] = 0.0;
                }
                ud[iu(k, k)] = 1.0;
            }
        }

        // ── Accumulate V ─────────────────────────────────────────────────────
        for k in (0..n).rev() {
            if k < nrt && e[k] != 0.0 {
                for j in k + 1..n {
                    let mut t: Real = (k + 1..n).map(|i| vd[iv(i, k)] * vd[iv(i, j)]).sum();
                    t = -t / vd[iv(k + 1, k)];
                    for i in k + 1..n {
                        let vik = vd[iv(i, k)];
                        vd[iv(i, j)] += t * vik;
                    }
                }
            }
            for i in 0..n {
                vd[iv(i, k)] = 0.0;
            }
            vd[iv(k, k)] = 1.0;
        }

        // ── Diagonalisation ──────────────────────────────────────────────────
        let pp = p - 1;
        while p > 0 {
            // largest k < p-1 with negligible e[k], or -1
            let mut k = p as isize - 2;
            while k >= 0 {
                let ku = k as usize;
                if e[ku].abs() <= QL_TINY_REAL + QL_EPSILON * (s[ku].abs() + s[ku + 1].abs()) {
                    e[ku] = 0.0;
                    break;
                }
                k -= 1;
            }

            let kase;
            if k == p as isize - 2 {
                // s[p-1] has converged
                kase = 4;
            } else {
                let mut ks = p as isize - 1;
                while ks > k {
                    let ksu = ks as usize;
                    let t = e[ksu].abs() + if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 };
                    if s[ksu].abs() <= QL_TINY_REAL + QL_EPSILON * t {
                        s[ksu] = 0.0;
                        break;
                    }
                    ks -= 1;
                }
                if ks == k {
                    kase = 3;
                } else if ks == p as isize - 1 {
                    kase = 1;
                } else {
                    kase = 2;
                    k = ks;
                }
            }
            let k = (k + 1) as usize;

            match kase {
                // deflate negligible s[p-1]
                1 => {
                    let mut f = e[p - 2];
                    e[p - 2] = 0.0;
                    for j in (k..=p - 2).rev() {
                        let t = s[j].hypot(f);
                        let (cs, sn) = (s[j] / t, f / t);
                        s[j] = t;
                        if j != k {
                            f = -sn * e[j - 1];
                            e[j - 1] *= cs;
                        }
                        rotate_columns(vd, va, n, j, p - 1, cs, sn);
                    }
                }
                // split at negligible s[k-1]
                2 => {
                    let mut f = e[k - 1];
                    e[k - 1] = 0.0;
                    for j in k..p {
                        let t = s[j].hypot(f);
                        let (cs, sn) = (s[j] / t, f / t);
                        s[j] = t;
                        f = -sn * e[j];
                        e[j] *= cs;
                        rotate_columns(ud, ua, m, j, k - 1, cs, sn);
                    }
                }
                // one implicit-shift QR sweep
                3 => {
                    let scale = s[p - 1]
                        .abs()
                        .max(s[p - 2].abs())
                        .max(e[p - 2].abs())
                        .max(s[k].abs())
                        .max(e[k].abs());
                    let sp = s[p - 1] / scale;
                    let spm1 = s[p - 2] / scale;
                    let epm1 = e[p - 2] / scale;
                    let sk = s[k] / scale;
                    let ek = e[k] / scale;
                    let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                    let c = (sp * epm1) * (sp * epm1);
                    let mut shift = 0.0;
                    if b != 0.0 || c != 0.0 {
                        shift = (b * b + c).sqrt();
                        if b < 0.0 {
                            shift = -shift;
                        }
                        shift = c / (b + shift);
                    }
                    let mut f = (sk + sp) * (sk - sp) + shift;
                    let mut g = sk * ek;

                    // chase zeros
                    for j in k..p - 1 {
                        let t = f.hypot(g);
                        let (cs, sn) = (f / t, g / t);
                        if j != k {
                            e[j - 1] = t;
                        }
                        f = cs * s[j] + sn * e[j];
                        e[j] = cs * e[j] - sn * s[j];
                        g = sn * s[j + 1];
                        s[j + 1] *= cs;
                        rotate_columns(vd, va, n, j, j + 1, cs, sn);

                        let t = f.hypot(g);
                        let (cs, sn) = (f / t, g / t);
                        s[j] = t;
                        f = cs * e[j] + sn * s[j + 1];
                        s[j + 1] = -sn * e[j] + cs * s[j + 1];
                        g = sn * e[j + 1];
                        e[j + 1] *= cs;
                        if j < m - 1 {
                            rotate_columns(ud, ua, m, j, j + 1, cs, sn);
                        }
                    }
                    e[p - 2] = f;
                    sweeps += 1;
                    trace!("SVD sweep {sweeps}: trailing block [{k}, {p})");
                }
                // convergence of s[k]
                _ => {
                    if s[k] <= 0.0 {
                        s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                        for i in 0..=pp {
                            vd[iv(i, k)] = -vd[iv(i, k)];
                        }
                    }
                    let mut k = k;
                    while k < pp && s[k] < s[k + 1] {
                        s.swap(k, k + 1);
                        if k < n - 1 {
                            swap_columns(vd, va, n, k, k + 1);
                        }
                        if k < m - 1 {
                            swap_columns(ud, ua, m, k, k + 1);
                        }
                        k += 1;
                    }
                    p -= 1;
                }
            }
        }
    }

    debug!("SVD of {m}x{n} matrix converged after {sweeps} QR sweeps");
    (u_mat, s, v_mat)
}
