//! `Array`: a one-dimensional vector of reals, or a view into one.
//!
//! An array is a 1×N (row) or N×1 (column) [`Address`] over a shared
//! [`Storage`]. Roots own a fresh buffer; views created with
//! [`Array::range`] or carved out of a [`Matrix`] share their parent's
//! buffer, so writes through either side are visible on the other.
//! Read-only views (`const_*`) reject every mutating call with
//! [`Error::Unsupported`].
//!
//! All index and range arguments honour the array's [`Indexing`]: a Fortran
//! array accepts `1..=size()`.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::DVector;
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Size,
};

use crate::address::{Address, Indexing, Selection};
use crate::matrix::Matrix;
use crate::storage::Storage;

/// A dynamically-sized vector of `Real` values.
pub struct Array {
    storage: Storage,
    addr: Address,
    read_only: bool,
}

impl Array {
    // ── Construction ─────────────────────────────────────────────────────────

    /// Create a zero-filled array of length `size`.
    pub fn new(size: Size) -> Self {
        Self::with_indexing(size, Indexing::ZeroBased)
    }

    /// Create a zero-filled array using the given indexing convention.
    pub fn with_indexing(size: Size, indexing: Indexing) -> Self {
        Self::root(vec![0.0; size], indexing)
    }

    /// Create an array filled with `value`.
    pub fn from_element(size: Size, value: Real) -> Self {
        Self::root(vec![value; size], Indexing::ZeroBased)
    }

    /// Create an array from a slice.
    pub fn from_slice(data: &[Real]) -> Self {
        Self::root(data.to_vec(), Indexing::ZeroBased)
    }

    /// Create an array from a `Vec`.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Self::root(data, Indexing::ZeroBased)
    }

    pub(crate) fn root(data: Vec<Real>, indexing: Indexing) -> Self {
        let addr = Address::dense(1, data.len(), indexing);
        Self {
            storage: Storage::from_vec(data),
            addr,
            read_only: false,
        }
    }

    pub(crate) fn view(storage: Storage, addr: Address, read_only: bool) -> Self {
        debug_assert!(addr.rows() <= 1 || addr.cols() <= 1);
        debug_assert!(addr.last() <= storage.len());
        Self {
            storage,
            addr,
            read_only,
        }
    }

    // ── Shape ────────────────────────────────────────────────────────────────

    /// Number of elements.
    pub fn size(&self) -> Size {
        self.addr.size()
    }

    /// Return `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Logical rows (1 for a row vector).
    pub fn rows(&self) -> Size {
        self.addr.rows()
    }

    /// Logical columns (1 for a column vector).
    pub fn cols(&self) -> Size {
        self.addr.cols()
    }

    /// The addressing descriptor of this array.
    pub fn address(&self) -> &Address {
        &self.addr
    }

    /// Indexing convention of this array.
    pub fn indexing(&self) -> Indexing {
        self.addr.indexing()
    }

    /// Whether indices start at 1.
    pub fn is_fortran(&self) -> bool {
        self.addr.is_fortran()
    }

    /// Whether the elements form one unbroken run in the buffer.
    pub fn is_contiguous(&self) -> bool {
        self.addr.is_contiguous()
    }

    /// Whether this is a read-only view.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// First valid index.
    pub fn begin(&self) -> Size {
        self.indexing().first()
    }

    /// One past the last valid index.
    pub fn end(&self) -> Size {
        self.begin() + self.size()
    }

    // ── Element access ───────────────────────────────────────────────────────

    /// Element at `index`.
    pub fn get(&self, index: Size) -> Result<Real> {
        let o = self.addr.op_index(index)?;
        Ok(self.storage.borrow()[o])
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: Size, value: Real) -> Result<()> {
        self.ensure_writable()?;
        let o = self.addr.op_index(index)?;
        self.storage.borrow_mut()[o] = value;
        Ok(())
    }

    /// First element.
    pub fn first(&self) -> Result<Real> {
        self.get(self.begin())
    }

    /// Last element.
    pub fn last(&self) -> Result<Real> {
        ensure!(!self.is_empty(), "empty array has no last element");
        self.get(self.end() - 1)
    }

    /// Elements in logical order.
    pub fn to_vec(&self) -> Vec<Real> {
        self.storage.gather(&self.addr)
    }

    /// Convert to a `nalgebra` column vector.
    pub fn to_dvector(&self) -> DVector<Real> {
        DVector::from_vec(self.to_vec())
    }

    // ── Scalar arithmetic ────────────────────────────────────────────────────

    /// `self + scalar`, elementwise.
    pub fn add_scalar(&self, scalar: Real) -> Array {
        self.map(|x| x + scalar)
    }

    /// `self - scalar`, elementwise.
    pub fn sub_scalar(&self, scalar: Real) -> Array {
        self.map(|x| x - scalar)
    }

    /// `self * scalar`, elementwise.
    pub fn mul_scalar(&self, scalar: Real) -> Array {
        self.map(|x| x * scalar)
    }

    /// `self / scalar`, elementwise.
    pub fn div_scalar(&self, scalar: Real) -> Array {
        self.map(|x| x / scalar)
    }

    /// `-self`.
    pub fn negative(&self) -> Array {
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
    pub fn add(&self, other: &Array) -> Result<Array> {
        self.zip(other, |x, y| x + y)
    }

    /// Elementwise difference.
    pub fn sub(&self, other: &Array) -> Result<Array> {
        self.zip(other, |x, y| x - y)
    }

    /// Elementwise product.
    pub fn mul(&self, other: &Array) -> Result<Array> {
        self.zip(other, |x, y| x * y)
    }

    /// Elementwise quotient.
    pub fn div(&self, other: &Array) -> Result<Array> {
        self.zip(other, |x, y| x / y)
    }

    /// In-place elementwise sum.
    pub fn add_assign(&mut self, other: &Array) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x + y)
    }

    /// In-place elementwise difference.
    pub fn sub_assign(&mut self, other: &Array) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x - y)
    }

    /// In-place elementwise product.
    pub fn mul_assign(&mut self, other: &Array) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x * y)
    }

    /// In-place elementwise quotient.
    pub fn div_assign(&mut self, other: &Array) -> Result<&mut Self> {
        self.zip_assign(other, |x, y| x / y)
    }

    /// Row vector times matrix: `result[j] = Σᵢ self[i]·m[i][j]`.
    pub fn mul_matrix(&self, m: &Matrix) -> Result<Array> {
        if self.size() != m.rows() {
            return Err(Error::IncompatibleShape(format!(
                "array of size {} times {}x{} matrix",
                self.size(),
                m.rows(),
                m.cols()
            )));
        }
        let v = self.to_vec();
        let data = m.storage().borrow();
        let addr = m.address();
        let result = (0..m.cols())
            .map(|j| {
                v.iter()
                    .enumerate()
                    .fold(0.0, |sum, (i, x)| sum + x * data[addr.at(i, j)])
            })
            .collect();
        Ok(Array::root(result, self.indexing()))
    }

    // ── Elementwise functions ────────────────────────────────────────────────

    /// Absolute values.
    pub fn abs(&self) -> Array {
        self.map(Real::abs)
    }

    /// Squares.
    pub fn sqr(&self) -> Array {
        self.map(|x| x * x)
    }

    /// Square roots.
    pub fn sqrt(&self) -> Array {
        self.map(Real::sqrt)
    }

    /// Natural logarithms.
    pub fn log(&self) -> Array {
        self.map(Real::ln)
    }

    /// Exponentials.
    pub fn exp(&self) -> Array {
        self.map(Real::exp)
    }

    // ── Reductions ───────────────────────────────────────────────────────────

    /// Smallest element.
    pub fn min(&self) -> Result<Real> {
        self.min_range(self.begin(), self.end())
    }

    /// Smallest element in `[from, to)`.
    pub fn min_range(&self, from: Size, to: Size) -> Result<Real> {
        let values = self.non_empty_range(from, to)?;
        Ok(values.into_iter().fold(Real::INFINITY, Real::min))
    }

    /// Largest element.
    pub fn max(&self) -> Result<Real> {
        self.max_range(self.begin(), self.end())
    }

    /// Largest element in `[from, to)`.
    pub fn max_range(&self, from: Size, to: Size) -> Result<Real> {
        let values = self.non_empty_range(from, to)?;
        Ok(values.into_iter().fold(Real::NEG_INFINITY, Real::max))
    }

    /// Sum of all elements, left to right.
    pub fn accumulate(&self) -> Real {
        self.accumulate_from(0.0)
    }

    /// `init` plus all elements, left to right.
    pub fn accumulate_from(&self, init: Real) -> Real {
        self.to_vec().into_iter().fold(init, |acc, x| acc + x)
    }

    /// `init` plus the elements in `[from, to)`, left to right.
    pub fn accumulate_range(&self, from: Size, to: Size, init: Real) -> Result<Real> {
        Ok(self
            .values_in(from, to)?
            .into_iter()
            .fold(init, |acc, x| acc + x))
    }

    // ── Products ─────────────────────────────────────────────────────────────

    /// Dot product with an array of the same size.
    pub fn dot_product(&self, other: &Array) -> Result<Real> {
        self.ensure_same_size(other)?;
        Ok(self
            .to_vec()
            .into_iter()
            .zip(other.to_vec())
            .fold(0.0, |sum, (x, y)| sum + x * y))
    }

    /// Dot product of the leading `to - from` elements of `self` with
    /// `other[from..to)`.
    pub fn dot_product_range(&self, other: &Array, from: Size, to: Size) -> Result<Real> {
        let rhs = other.values_in(from, to)?;
        ensure!(
            rhs.len() <= self.size(),
            "range of length {} exceeds array of size {}",
            rhs.len(),
            self.size()
        );
        Ok(self
            .to_vec()
            .into_iter()
            .zip(rhs)
            .fold(0.0, |sum, (x, y)| sum + x * y))
    }

    /// Same as [`Array::dot_product`] for real vectors.
    pub fn inner_product(&self, other: &Array) -> Result<Real> {
        self.dot_product(other)
    }

    /// Same as [`Array::dot_product_range`] for real vectors.
    pub fn inner_product_range(&self, other: &Array, from: Size, to: Size) -> Result<Real> {
        self.dot_product_range(other, from, to)
    }

    /// `size() × other.size()` matrix with entries `self[i]·other[j]`.
    pub fn outer_product(&self, other: &Array) -> Matrix {
        Self::outer(&self.to_vec(), &other.to_vec(), self.indexing())
    }

    /// `size() × (to - from)` matrix with entries `self[i]·other[from + j]`.
    pub fn outer_product_range(&self, other: &Array, from: Size, to: Size) -> Result<Matrix> {
        let rhs = other.values_in(from, to)?;
        Ok(Self::outer(&self.to_vec(), &rhs, self.indexing()))
    }

    fn outer(lhs: &[Real], rhs: &[Real], indexing: Indexing) -> Matrix {
        let data = lhs
            .iter()
            .flat_map(|x| rhs.iter().map(move |y| x * y))
            .collect();
        Matrix::root(lhs.len(), rhs.len(), data, indexing)
    }

    // ── Sequence algorithms ──────────────────────────────────────────────────

    /// Apply `f` to every element in place.
    pub fn transform<F: FnMut(Real) -> Real>(&mut self, f: F) -> Result<&mut Self> {
        self.update(f)
    }

    /// Apply `f` to the elements in `[from, to)` in place.
    pub fn transform_range<F: FnMut(Real) -> Real>(
        &mut self,
        from: Size,
        to: Size,
        f: F,
    ) -> Result<&mut Self> {
        self.ensure_writable()?;
        let window = self.carve(from, to)?;
        self.storage.map_in_place(&window, f);
        Ok(self)
    }

    /// First element, then successive differences `x[i] - x[i-1]`.
    pub fn adjacent_difference(&self) -> Array {
        self.adjacent(self.to_vec(), |curr, prev| curr - prev)
    }

    /// As [`Array::adjacent_difference`] over `[from, to)`.
    pub fn adjacent_difference_range(&self, from: Size, to: Size) -> Result<Array> {
        Ok(self.adjacent(self.values_in(from, to)?, |curr, prev| curr - prev))
    }

    /// First element, then `f(x[i], x[i-1])`.
    pub fn adjacent_difference_with<F: Fn(Real, Real) -> Real>(&self, f: F) -> Array {
        self.adjacent(self.to_vec(), f)
    }

    /// As [`Array::adjacent_difference_with`] over `[from, to)`.
    pub fn adjacent_difference_range_with<F: Fn(Real, Real) -> Real>(
        &self,
        from: Size,
        to: Size,
        f: F,
    ) -> Result<Array> {
        Ok(self.adjacent(self.values_in(from, to)?, f))
    }

    fn adjacent<F: Fn(Real, Real) -> Real>(&self, values: Vec<Real>, f: F) -> Array {
        let mut out = Vec::with_capacity(values.len());
        if let Some(&head) = values.first() {
            out.push(head);
            out.extend(values.windows(2).map(|w| f(w[1], w[0])));
        }
        Array::root(out, self.indexing())
    }

    /// Index of the first element not less than `value` (array must be
    /// sorted ascending).
    pub fn lower_bound(&self, value: Real) -> Size {
        // whole-extent ranges are always valid
        self.lower_bound_by(self.begin(), self.end(), value, |a, b| a < b)
            .unwrap_or(self.end())
    }

    /// Index of the first element in `[from, to)` for which
    /// `less(element, value)` is false; `to` if there is none.
    pub fn lower_bound_by<F: Fn(Real, Real) -> bool>(
        &self,
        from: Size,
        to: Size,
        value: Real,
        less: F,
    ) -> Result<Size> {
        let values = self.values_in(from, to)?;
        Ok(from + values.partition_point(|&x| less(x, value)))
    }

    /// Index of the first element greater than `value` (array must be
    /// sorted ascending).
    pub fn upper_bound(&self, value: Real) -> Size {
        self.upper_bound_by(self.begin(), self.end(), value, |a, b| a < b)
            .unwrap_or(self.end())
    }

    /// Index of the first element in `[from, to)` for which
    /// `less(value, element)` holds; `to` if there is none.
    pub fn upper_bound_by<F: Fn(Real, Real) -> bool>(
        &self,
        from: Size,
        to: Size,
        value: Real,
        less: F,
    ) -> Result<Size> {
        let values = self.values_in(from, to)?;
        Ok(from + values.partition_point(|&x| !less(value, x)))
    }

    // ── Views ────────────────────────────────────────────────────────────────

    /// Writable view of `[from, to)` sharing this array's buffer.
    pub fn range(&self, from: Size, to: Size) -> Result<Array> {
        let addr = self.carve(from, to)?;
        Ok(Array::view(self.storage.clone(), addr, self.read_only))
    }

    /// Writable view from `from` to the end.
    pub fn range_from(&self, from: Size) -> Result<Array> {
        self.range(from, self.end())
    }

    /// Read-only view of `[from, to)`.
    pub fn const_range(&self, from: Size, to: Size) -> Result<Array> {
        let addr = self.carve(from, to)?;
        Ok(Array::view(self.storage.clone(), addr, true))
    }

    /// The same elements addressed with 1-based indices.
    pub fn to_fortran(&self) -> Array {
        Array::view(self.storage.clone(), self.addr.to_fortran(), self.read_only)
    }

    /// The same elements addressed with 0-based indices.
    pub fn to_zero_based(&self) -> Array {
        Array::view(self.storage.clone(), self.addr.to_zero_based(), self.read_only)
    }

    // ── Bulk operations (contiguous data only) ───────────────────────────────

    /// Set every element to `value`.
    pub fn fill(&mut self, value: Real) -> Result<&mut Self> {
        self.ensure_bulk()?;
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + self.size()].fill(value);
        Ok(self)
    }

    /// Copy the elements of `other`, which must have the same size.
    pub fn fill_from(&mut self, other: &Array) -> Result<&mut Self> {
        self.ensure_bulk()?;
        self.ensure_same_size(other)?;
        let values = other.to_vec();
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + values.len()].copy_from_slice(&values);
        Ok(self)
    }

    /// Exchange contents with `other`, which must have the same size.
    pub fn swap(&mut self, other: &mut Array) -> Result<&mut Self> {
        self.ensure_bulk()?;
        other.ensure_bulk()?;
        self.ensure_same_size(other)?;
        let mine = self.to_vec();
        let theirs = other.to_vec();
        self.storage.scatter(&self.addr, &theirs);
        other.storage.scatter(&other.addr, &mine);
        Ok(self)
    }

    /// Sort ascending in place.
    pub fn sort(&mut self) -> Result<&mut Self> {
        self.ensure_bulk()?;
        let start = self.addr.base();
        self.storage.borrow_mut()[start..start + self.size()].sort_by(Real::total_cmp);
        Ok(self)
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

    fn ensure_same_size(&self, other: &Array) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::IncompatibleShape(format!(
                "arrays of size {} and {}",
                self.size(),
                other.size()
            )));
        }
        Ok(())
    }

    /// Address of the logical sub-range `[from, to)`.
    fn carve(&self, from: Size, to: Size) -> Result<Address> {
        if self.rows() == 1 {
            self.addr.select(Selection::All, Selection::Range(from, to))
        } else {
            self.addr.select(Selection::Range(from, to), Selection::All)
        }
    }

    fn values_in(&self, from: Size, to: Size) -> Result<Vec<Real>> {
        let window = self.carve(from, to)?;
        Ok(self.storage.gather(&window))
    }

    fn non_empty_range(&self, from: Size, to: Size) -> Result<Vec<Real>> {
        let values = self.values_in(from, to)?;
        ensure!(!values.is_empty(), "empty range [{from}, {to})");
        Ok(values)
    }

    fn map<F: Fn(Real) -> Real>(&self, f: F) -> Array {
        Array::root(self.to_vec().into_iter().map(f).collect(), self.indexing())
    }

    fn update<F: FnMut(Real) -> Real>(&mut self, f: F) -> Result<&mut Self> {
        self.ensure_writable()?;
        self.storage.map_in_place(&self.addr, f);
        Ok(self)
    }

    fn zip<F: Fn(Real, Real) -> Real>(&self, other: &Array, f: F) -> Result<Array> {
        self.ensure_same_size(other)?;
        let values = self
            .to_vec()
            .into_iter()
            .zip(other.to_vec())
            .map(|(x, y)| f(x, y))
            .collect();
        Ok(Array::root(values, self.indexing()))
    }

    fn zip_assign<F: Fn(Real, Real) -> Real>(&mut self, other: &Array, f: F) -> Result<&mut Self> {
        self.ensure_writable()?;
        self.ensure_same_size(other)?;
        self.storage
            .zip_in_place(&self.addr, &other.storage, &other.addr, f);
        Ok(self)
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl Clone for Array {
    /// Deep copy into a fresh contiguous buffer.
    fn clone(&self) -> Self {
        Self {
            storage: Storage::from_vec(self.to_vec()),
            addr: Address::dense(self.rows(), self.cols(), self.indexing()),
            read_only: false,
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("values", &self.to_vec())
            .field("indexing", &self.indexing())
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.to_vec() == other.to_vec()
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<Vec<Real>> for Array {
    fn from(v: Vec<Real>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[Real]> for Array {
    fn from(v: &[Real]) -> Self {
        Self::from_slice(v)
    }
}

impl From<DVector<Real>> for Array {
    fn from(v: DVector<Real>) -> Self {
        Self::from_vec(v.as_slice().to_vec())
    }
}

impl FromIterator<Real> for Array {
    fn from_iter<I: IntoIterator<Item = Real>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl Add<Real> for &Array {
    type Output = Array;
    fn add(self, rhs: Real) -> Array {
        self.add_scalar(rhs)
    }
}

impl Sub<Real> for &Array {
    type Output = Array;
    fn sub(self, rhs: Real) -> Array {
        self.sub_scalar(rhs)
    }
}

impl Mul<Real> for &Array {
    type Output = Array;
    fn mul(self, rhs: Real) -> Array {
        self.mul_scalar(rhs)
    }
}

impl Div<Real> for &Array {
    type Output = Array;
    fn div(self, rhs: Real) -> Array {
        self.div_scalar(rhs)
    }
}

impl Neg for &Array {
    type Output = Array;
    fn neg(self) -> Array {
        self.negative()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.to_vec().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn construction_and_shape() {
        let a = Array::new(4);
        assert_eq!(a.size(), 4);
        assert_eq!((a.rows(), a.cols()), (1, 4));
        assert_eq!(a.to_vec(), vec![0.0; 4]);
        assert!(a.is_contiguous());
        assert!(Array::default().is_empty());
    }

    #[test]
    fn arithmetic() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0]);
        let b = Array::from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(a.add(&b).unwrap().to_vec(), vec![5.0, 7.0, 9.0]);
        assert_eq!(b.sub(&a).unwrap().to_vec(), vec![3.0, 3.0, 3.0]);
        assert_eq!(a.mul(&b).unwrap().to_vec(), vec![4.0, 10.0, 18.0]);
        assert_eq!(b.div(&a).unwrap().to_vec(), vec![4.0, 2.5, 2.0]);
        assert_eq!((&a * 2.0).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!((-&a).to_vec(), vec![-1.0, -2.0, -3.0]);
        assert!(matches!(
            a.add(&Array::new(2)),
            Err(Error::IncompatibleShape(_))
        ));
    }

    #[test]
    fn in_place_chains() {
        let mut a = Array::from_slice(&[1.0, 2.0]);
        a.add_assign_scalar(1.0)
            .unwrap()
            .mul_assign_scalar(3.0)
            .unwrap();
        assert_eq!(a.to_vec(), vec![6.0, 9.0]);
    }

    #[test]
    fn dot_and_outer() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0]);
        let b = Array::from_slice(&[4.0, 5.0, 6.0]);
        assert_abs_diff_eq!(a.dot_product(&b).unwrap(), 32.0);
        assert_abs_diff_eq!(a.inner_product(&b).unwrap(), 32.0);
        assert_abs_diff_eq!(a.dot_product_range(&b, 1, 3).unwrap(), 1.0 * 5.0 + 2.0 * 6.0);
        let m = a.outer_product(&b);
        assert_eq!((m.rows(), m.cols()), (3, 3));
        assert_eq!(m.get(2, 1).unwrap(), 15.0);
        let m = a.outer_product_range(&b, 0, 2).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 2));
    }

    #[test]
    fn reductions() {
        let a = Array::from_slice(&[3.0, -1.0, 4.0, 1.0, 5.0]);
        assert_eq!(a.min().unwrap(), -1.0);
        assert_eq!(a.max().unwrap(), 5.0);
        assert_eq!(a.min_range(2, 4).unwrap(), 1.0);
        assert_eq!(a.max_range(0, 2).unwrap(), 3.0);
        assert_eq!(a.accumulate(), 12.0);
        assert_eq!(a.accumulate_from(1.0), 13.0);
        assert_eq!(a.accumulate_range(1, 3, 0.0).unwrap(), 3.0);
        assert!(a.min_range(2, 2).is_err());
        assert!(Array::new(0).max().is_err());
    }

    #[test]
    fn adjacent_difference_keeps_head() {
        let a = Array::from_slice(&[1.0, 4.0, 9.0, 16.0]);
        assert_eq!(a.adjacent_difference().to_vec(), vec![1.0, 3.0, 5.0, 7.0]);
        assert_eq!(
            a.adjacent_difference_with(|c, p| c / p).to_vec(),
            vec![1.0, 4.0, 2.25, 16.0 / 9.0]
        );
        assert_eq!(
            a.adjacent_difference_range(1, 3).unwrap().to_vec(),
            vec![4.0, 5.0]
        );
    }

    #[test]
    fn bounds() {
        let a = Array::from_slice(&[1.0, 2.0, 2.0, 2.0, 5.0]);
        assert_eq!(a.lower_bound(2.0), 1);
        assert_eq!(a.upper_bound(2.0), 4);
        assert_eq!(a.lower_bound(9.0), 5);
        assert_eq!(a.upper_bound(0.0), 0);
        assert_eq!(a.lower_bound_by(2, 5, 2.0, |x, y| x < y).unwrap(), 2);
        let f = a.to_fortran();
        assert_eq!(f.lower_bound(2.0), 2);
        assert_eq!(f.upper_bound(2.0), 5);
    }

    #[test]
    fn ranges_alias_the_parent() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let mut r = a.range(1, 3).unwrap();
        r.set(0, 20.0).unwrap();
        assert_eq!(a.get(1).unwrap(), 20.0);
        let c = a.const_range(0, 2).unwrap();
        assert!(matches!(c.clone().set(0, 1.0), Ok(())));
        let mut c = c;
        assert!(matches!(c.set(0, 1.0), Err(Error::Unsupported(_))));
        assert!(a.range(3, 5).is_err());
    }

    #[test]
    fn transform_range_only_touches_window() {
        let mut a = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        a.transform_range(1, 3, |x| x * 10.0).unwrap();
        assert_eq!(a.to_vec(), vec![1.0, 20.0, 30.0, 4.0]);
        a.transform(|x| x - 1.0).unwrap();
        assert_eq!(a.to_vec(), vec![0.0, 19.0, 29.0, 3.0]);
    }

    #[test]
    fn bulk_operations() {
        let mut a = Array::from_slice(&[3.0, 1.0, 2.0]);
        a.sort().unwrap();
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
        let mut b = Array::from_slice(&[7.0, 8.0, 9.0]);
        a.swap(&mut b).unwrap();
        assert_eq!(a.to_vec(), vec![7.0, 8.0, 9.0]);
        assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0]);
        a.fill(0.5).unwrap();
        assert_eq!(a.to_vec(), vec![0.5; 3]);
        a.fill_from(&b).unwrap();
        assert_eq!(a, b);
        assert!(a.fill_from(&Array::new(2)).is_err());
    }

    #[test]
    fn math_functions() {
        let a = Array::from_slice(&[-4.0, 1.0]);
        assert_eq!(a.abs().to_vec(), vec![4.0, 1.0]);
        assert_eq!(a.sqr().to_vec(), vec![16.0, 1.0]);
        assert_eq!(a.abs().sqrt().to_vec(), vec![2.0, 1.0]);
        assert_abs_diff_eq!(a.abs().log().get(0).unwrap(), 4.0f64.ln());
        assert_abs_diff_eq!(a.exp().get(1).unwrap(), std::f64::consts::E);
    }

    #[test]
    fn clone_is_deep() {
        let a = Array::from_slice(&[1.0, 2.0]);
        let view = a.range(0, 2).unwrap();
        let mut copy = view.clone();
        copy.set(0, 9.0).unwrap();
        assert_eq!(a.get(0).unwrap(), 1.0);
    }

    #[test]
    fn display() {
        let a = Array::from_slice(&[1.0, 2.5]);
        assert_eq!(a.to_string(), "[1, 2.5]");
    }
}
