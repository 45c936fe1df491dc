//! `Matrix`: a dense two-dimensional matrix of reals, or a view into one.
//!
//! Like [`Array`], a matrix is an [`Address`] over a shared [`Storage`].
//! Rows, columns, rectangular blocks and arbitrary row/column selections are
//! zero-copy views; [`Matrix::transpose`] is a view as well. Every element
//! access goes through the address, so the same algorithms run unchanged on
//! roots and on views.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::DMatrix;
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Size,
};

use crate::address::{Address, Indexing, Selection};
use crate::array::Array;
use crate::matrix_utilities::{QRDecomposition, SVD};
use crate::storage::Storage;

/// A dynamically-sized matrix of `Real` values.
pub struct Matrix {
    storage: Storage,
    addr: Address,
    read_only: bool,
}

impl Matrix {
    // ── Construction ─────────────────────────────────────────────────────────

    /// Create a zero-filled `rows × cols` matrix.
    pub fn new(rows: Size, cols: Size) -> Self {
        Self::with_indexing(rows, cols, Indexing::ZeroBased)
    }

    /// Create a zero-filled matrix using the given indexing convention.
    pub fn with_indexing(rows: Size, cols: Size, indexing: Indexing) -> Self {
        Self::root(rows, cols, vec![0.0; rows * cols], indexing)
    }

    /// Create a matrix filled with `value`.
    pub fn from_element(rows: Size, cols: Size, value: Real) -> Self {
        Self::root(rows, cols, vec![value; rows * cols], Indexing::ZeroBased)
    }

    /// Create an `n × n` identity matrix.
    pub fn identity(n: Size) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self::root(n, n, data, Indexing::ZeroBased)
    }

    /// Create a matrix from row-major data.
    pub fn from_row_slice(rows: Size, cols: Size, data: &[Real]) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::IncompatibleShape(format!(
                "{} values for a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self::root(rows, cols, data.to_vec(), Indexing::ZeroBased))
    }

    /// Create a matrix from a slice of equally long rows.
    pub fn from_rows(rows: &[&[Real]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(Error::IncompatibleShape(format!(
                "ragged rows: expected {cols} columns, found {}",
                bad.len()
            )));
        }
        Ok(Self::root(
            rows.len(),
            cols,
            rows.concat(),
            Indexing::ZeroBased,
        ))
    }

    pub(crate) fn root(rows: Size, cols: Size, data: Vec<Real>, indexing: Indexing) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self {
            storage: Storage::from_vec(data),
            addr: Address::dense(rows, cols, indexing),
            read_only: false,
        }
    }

    fn view(&self, addr: Address, read_only: bool) -> Self {
        debug_assert!(addr.last() <= self.storage.len());
        Self {
            storage: self.storage.clone(),
            addr,
            read_only: read_only || self.read_only,
        }
    }

    fn array_view(&self, addr: Address, read_only: bool) -> Array {
        Array::view(self.storage.clone(), addr, read_only || self.read_only)
    }

    // ── Shape ────────────────────────────────────────────────────────────────

    /// Number of rows.
    pub fn rows(&self) -> Size {
        self.addr.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> Size {
        self.addr.cols()
    }

    /// Number of elements.
    pub fn size(&self) -> Size {
        self.addr.size()
    }

    /// Return `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Return `true` if square.
    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// The addressing descriptor of this matrix.
    pub fn address(&self) -> &Address {
        &self.addr
    }

    /// Indexing convention of this matrix.
    pub fn indexing(&self) -> Indexing {
        self.addr.indexing()
    }

    /// Whether indices start at 1.
    pub fn is_fortran(&self) -> bool {
        self.addr.is_fortran()
    }

    /// Whether the elements form one unbroken row-major run in the buffer.
    pub fn is_contiguous(&self) -> bool {
        self.addr.is_contiguous()
    }

    /// Whether this is a read-only view.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    // ── Element access ───────────────────────────────────────────────────────

    /// Element at `(row, col)`.
    pub fn get(&self, row: Size, col: Size) -> Result<Real> {
        let o = self.addr.op(row, col)?;
        Ok(self.storage.borrow()[o])
    }

    /// Overwrite the element at `(row, col)`.
    pub fn set(&mut self, row: Size, col: Size, value: Real) -> Result<()> {
        self.ensure_writable()?;
        let o = self.addr.op(row, col)?;
        self.storage.borrow_mut()[o] = value;
        Ok(())
    }

    /// Elements in row-major order.
    pub fn to_vec(&self) -> Vec<Real> {
        self.storage.gather(&self.addr)
    }

    /// Convert to a `nalgebra` matrix.
    pub fn to_dmatrix(&self) -> DMatrix<Real> {
        DMatrix::from_row_slice(self.rows(), self.cols(), &self.to_vec())
    }

    // ── Scalar arithmetic ────────────────────────────────────────────────────

    /// `self + scalar`, elementwise.
    pub fn add_scalar(&self, scalar: Real) -> Matrix {
        self.map(|x| x + scalar)
    }

    /// `self - scalar`, elementwise.
    pub fn sub_scalar(&self, scalar: Real) -> Matrix {
        self.map(|x| x - scalar)
    }

    /// `self * scalar`, elementwise.
    pub fn mul_scalar(&self, scalar: Real) -> Matrix {
        self.map(|x| x * scalar)
    }

    /// `self / scalar`, elementwise.
    pub fn div_scalar(&self, scalar: Real) -> Matrix {
        self.map(|x| x / scalar)
    }

    /// `-self`.
    pub fn negative(&self) -> Matrix {
        self.map(|x| -x)
    }

    /// Add `scalar` to every element in place.
    pub fn add_assign_scalar(&mut self, scalar: Real) -> Result<&mut Self> {
        self.update(|x| x + scalar)
    }

    /// Subtract `scalar` from every element in place.
    pub fn sub_assign_scalar(&mut self, scalar: Real) -> Result<&mut Self> {
        self.update(|x| x - scalar)
    }

    /// Multiply every element by `scalar` in place.
    pub fn mul_assign_scalar(&mut self, scalar: Real) -> Result<&mut Self> {
        self.update(|x| x * scalar)
    }

    /// Divide every element by `scalar` in place.
    pub fn div_assign_scalar(&mut self, scalar: Real) -> Result<&mut Self> {
        self.update(|x| x / scalar)
    }

    // ── Elementwise arithmetic ───────────────────────────────────────────────

    /// Elementwise sum.
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip(other, |x, y| x + y)
    }

    /// Elementwise difference.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip(other, |x, y| x - y)
    }

    /// Elementwise (Hadamard) product.
    pub fn mul_elementwise(&self, other: &Matrix) -> Result<Matrix> {
        self.zip(other, |x, y| x * y)
    }

    /// Elementwise quotient.
    pub fn div_elementwise(&self, other: &Matrix) -> Result<Matrix> {
        self.zip(other, |x, y| x / y)
    }

    /// In-place elementwise sum.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x + y)
    }

    /// In-place elementwise difference.
    pub fn sub_assign(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x - y)
    }

    /// In-place elementwise product.
    pub fn mul_assign_elementwise(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x * y)
    }

    /// In-place elementwise quotient.
    pub fn div_assign_elementwise(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x / y)
    }

    // ── Products ─────────────────────────────────────────────────────────────

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols() != other.rows() {
            return Err(Error::IncompatibleShape(format!(
                "{}x{} times {}x{}",
                self.rows(),
                self.cols(),
                other.rows(),
                other.cols()
            )));
        }
        let (m, n, p) = (self.rows(), self.cols(), other.cols());
        let lhs = self.storage.borrow();
        let rhs = other.storage.borrow();
        let mut out = Vec::with_capacity(m * p);
        for i in 0..m {
            for j in 0..p {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += lhs[self.addr.at(i, k)] * rhs[other.addr.at(k, j)];
                }
                out.push(sum);
            }
        }
        Ok(Matrix::root(m, p, out, self.indexing()))
    }

    /// Matrix-vector product `self · v`.
    pub fn mul_array(&self, v: &Array) -> Result<Array> {
        if self.cols() != v.size() {
            return Err(Error::IncompatibleShape(format!(
                "{}x{} matrix times array of size {}",
                self.rows(),
                self.cols(),
                v.size()
            )));
        }
        let x = v.to_vec();
        let data = self.storage.borrow();
        let out = (0..self.rows())
            .map(|i| {
                x.iter()
                    .enumerate()
                    .fold(0.0, |sum, (j, xj)| sum + data[self.addr.at(i, j)] * xj)
            })
            .collect();
        Ok(Array::root(out, self.indexing()))
    }

    // ── Views ────────────────────────────────────────────────────────────────

    /// Transposed view; no data is moved.
    pub fn transpose(&self) -> Matrix {
        self.view(self.addr.transposed(), false)
    }

    /// Copy of the main diagonal (square matrices only).
    pub fn diagonal(&self) -> Result<Array> {
        ensure!(
            self.is_square(),
            "diagonal of a non-square {}x{} matrix",
            self.rows(),
            self.cols()
        );
        let data = self.storage.borrow();
        let diag = (0..self.rows()).map(|i| data[self.addr.at(i, i)]).collect();
        Ok(Array::root(diag, self.indexing()))
    }

    /// Sum of the diagonal (square matrices only).
    pub fn trace(&self) -> Result<Real> {
        Ok(self.diagonal()?.accumulate())
    }

    /// Writable view of row `row`.
    pub fn row(&self, row: Size) -> Result<Array> {
        let addr = self.addr.select(Selection::Single(row), Selection::All)?;
        Ok(self.array_view(addr, false))
    }

    /// Writable view of column `col`.
    pub fn col(&self, col: Size) -> Result<Array> {
        let addr = self.addr.select(Selection::All, Selection::Single(col))?;
        Ok(self.array_view(addr, false))
    }

    /// Writable view of `row`, columns `[col0, col1)`.
    pub fn range_row(&self, row: Size, col0: Size, col1: Size) -> Result<Array> {
        self.carve_row(row, col0, col1, false)
    }

    /// Read-only view of `row`, columns `[col0, col1)`.
    pub fn const_range_row(&self, row: Size, col0: Size, col1: Size) -> Result<Array> {
        self.carve_row(row, col0, col1, true)
    }

    /// Writable view of `col`, rows `[row0, row1)`.
    pub fn range_col(&self, col: Size, row0: Size, row1: Size) -> Result<Array> {
        self.carve_col(col, row0, row1, false)
    }

    /// Read-only view of `col`, rows `[row0, row1)`.
    pub fn const_range_col(&self, col: Size, row0: Size, row1: Size) -> Result<Array> {
        self.carve_col(col, row0, row1, true)
    }

    /// Writable view of rows `[row0, row1)` and columns `[col0, col1)`.
    pub fn range(&self, row0: Size, row1: Size, col0: Size, col1: Size) -> Result<Matrix> {
        self.carve(Selection::Range(row0, row1), Selection::Range(col0, col1), false)
    }

    /// Read-only view of rows `[row0, row1)` and columns `[col0, col1)`.
    pub fn const_range(&self, row0: Size, row1: Size, col0: Size, col1: Size) -> Result<Matrix> {
        self.carve(Selection::Range(row0, row1), Selection::Range(col0, col1), true)
    }

    /// Writable view of the listed rows and columns, in the listed order.
    pub fn range_mapped(&self, rows: &[Size], cols: &[Size]) -> Result<Matrix> {
        self.carve(Selection::Indices(rows), Selection::Indices(cols), false)
    }

    /// Read-only view of the listed rows and columns.
    pub fn const_range_mapped(&self, rows: &[Size], cols: &[Size]) -> Result<Matrix> {
        self.carve(Selection::Indices(rows), Selection::Indices(cols), true)
    }

    /// Writable view of the listed rows restricted to columns `[col0, col1)`.
    pub fn range_rows_mapped(&self, rows: &[Size], col0: Size, col1: Size) -> Result<Matrix> {
        self.carve(Selection::Indices(rows), Selection::Range(col0, col1), false)
    }

    /// Read-only view of the listed rows restricted to columns `[col0, col1)`.
    pub fn const_range_rows_mapped(&self, rows: &[Size], col0: Size, col1: Size) -> Result<Matrix> {
        self.carve(Selection::Indices(rows), Selection::Range(col0, col1), true)
    }

    /// Writable view of rows `[row0, row1)` restricted to the listed columns.
    pub fn range_cols_mapped(&self, row0: Size, row1: Size, cols: &[Size]) -> Result<Matrix> {
        self.carve(Selection::Range(row0, row1), Selection::Indices(cols), false)
    }

    /// Read-only view of rows `[row0, row1)` restricted to the listed columns.
    pub fn const_range_cols_mapped(&self, row0: Size, row1: Size, cols: &[Size]) -> Result<Matrix> {
        self.carve(Selection::Range(row0, row1), Selection::Indices(cols), true)
    }

    /// The same elements addressed with 1-based indices.
    pub fn to_fortran(&self) -> Matrix {
        self.view(self.addr.to_fortran(), false)
    }

    /// The same elements addressed with 0-based indices.
    pub fn to_zero_based(&self) -> Matrix {
        self.view(self.addr.to_zero_based(), false)
    }

    // ── Bulk operations ──────────────────────────────────────────────────────

    /// Set every element to `value` (contiguous data only).
    pub fn fill(&mut self, value: Real) -> Result<&mut Self> {
        self.ensure_bulk()?;
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + self.size()].fill(value);
        Ok(self)
    }

    /// Copy all elements of an equally-shaped matrix (contiguous data only).
    pub fn fill_from(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.ensure_bulk()?;
        self.ensure_same_shape(other)?;
        let values = other.to_vec();
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + values.len()].copy_from_slice(&values);
        Ok(self)
    }

    /// Overwrite row `row` with `values`.
    pub fn fill_row(&mut self, row: Size, values: &Array) -> Result<&mut Self> {
        self.ensure_writable()?;
        let addr = self.addr.select(Selection::Single(row), Selection::All)?;
        self.scatter_line(&addr, values)?;
        Ok(self)
    }

    /// Overwrite column `col` with `values`.
    pub fn fill_col(&mut self, col: Size, values: &Array) -> Result<&mut Self> {
        self.ensure_writable()?;
        let addr = self.addr.select(Selection::All, Selection::Single(col))?;
        self.scatter_line(&addr, values)?;
        Ok(self)
    }

    /// Exchange contents with an equally-shaped matrix (contiguous data only).
    pub fn swap(&mut self, other: &mut Matrix) -> Result<&mut Self> {
        self.ensure_bulk()?;
        other.ensure_bulk()?;
        self.ensure_same_shape(other)?;
        let mine = self.to_vec();
        let theirs = other.to_vec();
        self.storage.scatter(&self.addr, &theirs);
        other.storage.scatter(&other.addr, &mine);
        Ok(self)
    }

    /// Sort all elements ascending in row-major order (contiguous data only).
    pub fn sort(&mut self) -> Result<&mut Self> {
        self.ensure_bulk()?;
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + self.size()].sort_by(Real::total_cmp);
        Ok(self)
    }

    // ── Decompositions ───────────────────────────────────────────────────────

    /// Householder QR decomposition, optionally with column pivoting.
    pub fn qr(&self, pivot: bool) -> Result<QRDecomposition> {
        QRDecomposition::new(self, pivot)
    }

    /// Singular value decomposition.
    pub fn svd(&self) -> Result<SVD> {
        SVD::new(self)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::Unsupported("mutation through a read-only view".into()));
        }
        Ok(())
    }

    fn ensure_bulk(&self) -> Result<()> {
        self.ensure_writable()?;
        if !self.is_contiguous() {
            return Err(Error::NonContiguous);
        }
        Ok(())
    }

    fn ensure_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.rows() != other.rows() || self.cols() != other.cols() {
            return Err(Error::IncompatibleShape(format!(
                "{}x{} and {}x{}",
                self.rows(),
                self.cols(),
                other.rows(),
                other.cols()
            )));
        }
        Ok(())
    }

    fn carve(&self, rows: Selection<'_>, cols: Selection<'_>, read_only: bool) -> Result<Matrix> {
        let addr = self.addr.select(rows, cols)?;
        Ok(self.view(addr, read_only))
    }

    fn carve_row(&self, row: Size, col0: Size, col1: Size, read_only: bool) -> Result<Array> {
        let addr = self
            .addr
            .select(Selection::Single(row), Selection::Range(col0, col1))?;
        Ok(self.array_view(addr, read_only))
    }

    fn carve_col(&self, col: Size, row0: Size, row1: Size, read_only: bool) -> Result<Array> {
        let addr = self
            .addr
            .select(Selection::Range(row0, row1), Selection::Single(col))?;
        Ok(self.array_view(addr, read_only))
    }

    fn scatter_line(&self, addr: &Address, values: &Array) -> Result<()> {
        if addr.size() != values.size() {
            return Err(Error::IncompatibleShape(format!(
                "line of length {} filled from array of size {}",
                addr.size(),
                values.size()
            )));
        }
        self.storage.scatter(addr, &values.to_vec());
        Ok(())
    }

    fn map<F: Fn(Real) -> Real>(&self, f: F) -> Matrix {
        let values = self.to_vec().into_iter().map(f).collect();
        Matrix::root(self.rows(), self.cols(), values, self.indexing())
    }

    fn update<F: FnMut(Real) -> Real>(&mut self, f: F) -> Result<&mut Self> {
        self.ensure_writable()?;
        self.storage.map_in_place(&self.addr, f);
        Ok(self)
    }

    fn zip<F: Fn(Real, Real) -> Real>(&self, other: &Matrix, f: F) -> Result<Matrix> {
        self.ensure_same_shape(other)?;
        let values = self
            .to_vec()
            .into_iter()
            .zip(other.to_vec())
            .map(|(x, y)| f(x, y))
            .collect();
        Ok(Matrix::root(self.rows(), self.cols(), values, self.indexing()))
    }

    fn zip_assign<F: Fn(Real, Real) -> Real>(&mut self, other: &Matrix, f: F) -> Result<&mut Self> {
        self.ensure_writable()?;
        self.ensure_same_shape(other)?;
        self.storage
            .zip_in_place(&self.addr, &other.storage, &other.addr, f);
        Ok(self)
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl Clone for Matrix {
    /// Deep copy into a fresh contiguous buffer.
    fn clone(&self) -> Self {
        Matrix::root(self.rows(), self.cols(), self.to_vec(), self.indexing())
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("values", &self.to_vec())
            .field("indexing", &self.indexing())
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows() == other.rows() && self.cols() == other.cols() && self.to_vec() == other.to_vec()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl From<DMatrix<Real>> for Matrix {
    fn from(m: DMatrix<Real>) -> Self {
        let (rows, cols) = m.shape();
        let data = (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .map(|ij| m[ij])
            .collect();
        Matrix::root(rows, cols, data, Indexing::ZeroBased)
    }
}

impl Add<Real> for &Matrix {
    type Output = Matrix;
    fn add(self, rhs: Real) -> Matrix {
        self.add_scalar(rhs)
    }
}

impl Sub<Real> for &Matrix {
    type Output = Matrix;
    fn sub(self, rhs: Real) -> Matrix {
        self.sub_scalar(rhs)
    }
}

impl Mul<Real> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Real) -> Matrix {
        self.mul_scalar(rhs)
    }
}

impl Div<Real> for &Matrix {
    type Output = Matrix;
    fn div(self, rhs: Real) -> Matrix {
        self.div_scalar(rhs)
    }
}

impl Neg for &Matrix {
    type Output = Matrix;
    fn neg(self) -> Matrix {
        self.negative()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_vec();
        for i in 0..self.rows() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for j in 0..self.cols() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", values[i * self.cols() + j])?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
