//! Integration tests for `Array`: views over shared storage, Fortran
//! indexing, bounds checks and the sequence algorithms.

use approx::assert_abs_diff_eq;
use ql_core::Error;
use ql_math::{Array, Indexing, Matrix};

fn array(values: &[f64]) -> Array {
    Array::from_slice(values)
}

// ───────────────────────── views ─────────────────────────

#[test]
fn range_writes_are_visible_in_parent() {
    let a = array(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut middle = a.range(1, 4).unwrap();
    assert_eq!(middle.size(), 3);
    assert_eq!(middle.to_vec(), vec![2.0, 3.0, 4.0]);

    middle.set(0, 20.0).unwrap();
    middle.mul_assign_scalar(10.0).unwrap();
    assert_eq!(a.to_vec(), vec![1.0, 200.0, 30.0, 40.0, 5.0]);
}

#[test]
fn parent_writes_are_visible_in_range() {
    let mut a = array(&[1.0, 2.0, 3.0, 4.0]);
    let tail = a.range_from(2).unwrap();
    a.set(3, -1.0).unwrap();
    assert_eq!(tail.to_vec(), vec![3.0, -1.0]);
}

#[test]
fn nested_ranges_flatten_to_one_address() {
    let a: Array = (0..10).map(f64::from).collect();
    let inner = a.range(2, 8).unwrap().range(1, 4).unwrap();
    assert_eq!(inner.to_vec(), vec![3.0, 4.0, 5.0]);
    assert_eq!(inner.address().base(), 3);
    assert!(inner.is_contiguous());
}

#[test]
fn const_range_rejects_mutation() {
    let a = array(&[1.0, 2.0, 3.0]);
    let mut view = a.const_range(0, 2).unwrap();
    assert!(view.is_read_only());
    assert!(matches!(view.set(0, 9.0), Err(Error::Unsupported(_))));
    assert!(matches!(view.fill(0.0), Err(Error::Unsupported(_))));
    assert!(matches!(
        view.add_assign_scalar(1.0),
        Err(Error::Unsupported(_))
    ));
    // views of a read-only view stay read-only
    let mut nested = view.range(0, 1).unwrap();
    assert!(matches!(nested.set(0, 9.0), Err(Error::Unsupported(_))));
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn clone_is_a_deep_copy() {
    let a = array(&[1.0, 2.0]);
    let mut b = a.range(0, 2).unwrap().clone();
    b.set(0, 5.0).unwrap();
    assert_eq!(a.get(0).unwrap(), 1.0);
    assert!(b.is_contiguous());
}

#[test]
fn column_view_of_matrix_is_strided() {
    let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
    let mut col = m.col(1).unwrap();
    assert_eq!(col.to_vec(), vec![2.0, 4.0, 6.0]);
    assert!(!col.is_contiguous());
    assert!(matches!(col.fill(0.0), Err(Error::NonContiguous)));
    assert!(matches!(col.sort(), Err(Error::NonContiguous)));

    // element-wise updates work on strided views
    col.add_assign_scalar(1.0).unwrap();
    assert_eq!(m.to_vec(), vec![1.0, 3.0, 3.0, 5.0, 5.0, 7.0]);
}

// ───────────────────────── indexing ─────────────────────────

#[test]
fn fortran_view_shifts_indices_by_one() {
    let a = array(&[10.0, 20.0, 30.0]);
    let mut f = a.to_fortran();
    assert!(f.is_fortran());
    assert_eq!(f.begin(), 1);
    assert_eq!(f.end(), 4);
    assert_eq!(f.get(1).unwrap(), 10.0);
    assert_eq!(f.get(3).unwrap(), 30.0);
    assert!(matches!(
        f.get(0),
        Err(Error::IndexOutOfRange { index: 0, .. })
    ));
    assert!(matches!(f.get(4), Err(Error::IndexOutOfRange { .. })));

    f.set(2, -20.0).unwrap();
    assert_eq!(a.get(1).unwrap(), -20.0);

    let back = f.to_zero_based();
    assert_eq!(back.get(0).unwrap(), 10.0);
}

#[test]
fn fortran_ranges_use_fortran_bounds() {
    let a = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]).to_fortran();
    let r = a.range(2, 4).unwrap();
    assert_eq!(r.to_vec(), vec![2.0, 3.0]);
    assert_eq!(r.get(1).unwrap(), 2.0);
    assert_eq!(a.max_range(1, 3).unwrap(), 2.0);
    assert_eq!(a.lower_bound(3.0), 3);
    assert_eq!(a.upper_bound(3.0), 4);
}

#[test]
fn with_indexing_constructs_fortran_array() {
    let a = Array::with_indexing(3, Indexing::Fortran);
    assert!(a.is_fortran());
    assert_eq!(a.size(), 3);
    assert_eq!(a.get(3).unwrap(), 0.0);
}

#[test]
fn range_bounds_are_checked() {
    let a = array(&[1.0, 2.0, 3.0]);
    assert!(matches!(a.range(0, 4), Err(Error::IndexOutOfRange { .. })));
    assert!(matches!(a.range(2, 1), Err(Error::Precondition(_))));
    let empty = a.range(3, 3).unwrap();
    assert!(empty.is_empty());
}

// ───────────────────────── arithmetic ─────────────────────────

#[test]
fn pairwise_arithmetic_requires_equal_sizes() {
    let a = array(&[1.0, 2.0, 3.0]);
    let b = array(&[1.0, 2.0]);
    assert!(matches!(a.add(&b), Err(Error::IncompatibleShape(_))));
    assert!(matches!(a.dot_product(&b), Err(Error::IncompatibleShape(_))));

    let c = array(&[2.0, 4.0, 8.0]);
    assert_eq!(a.add(&c).unwrap().to_vec(), vec![3.0, 6.0, 11.0]);
    assert_eq!(c.div(&a).unwrap().to_vec(), vec![2.0, 2.0, 8.0 / 3.0]);
    assert_abs_diff_eq!(a.dot_product(&c).unwrap(), 34.0);
}

#[test]
fn operators_with_scalars() {
    let a = array(&[1.0, -2.0]);
    assert_eq!((&a * 2.0).to_vec(), vec![2.0, -4.0]);
    assert_eq!((&a + 1.0).to_vec(), vec![2.0, -1.0]);
    assert_eq!((-&a).to_vec(), vec![-1.0, 2.0]);
    assert_eq!(a.abs().to_vec(), vec![1.0, 2.0]);
}

#[test]
fn in_place_updates_chain() {
    let mut a = array(&[1.0, 2.0, 3.0]);
    let b = array(&[1.0, 1.0, 1.0]);
    a.add_assign(&b).unwrap().mul_assign_scalar(2.0).unwrap();
    assert_eq!(a.to_vec(), vec![4.0, 6.0, 8.0]);
}

#[test]
fn self_aliasing_assignment_uses_original_values() {
    let a = array(&[1.0, 2.0, 3.0, 4.0]);
    let mut head = a.range(0, 3).unwrap();
    let tail = a.range(1, 4).unwrap();
    head.add_assign(&tail).unwrap();
    assert_eq!(a.to_vec(), vec![3.0, 5.0, 7.0, 4.0]);
}

#[test]
fn transform_closure_may_read_sibling_views() {
    let mut a = array(&[1.0, 2.0, 3.0]);
    let head = a.range(0, 1).unwrap();
    a.transform(|x| x + head.get(0).unwrap()).unwrap();
    assert_eq!(a.to_vec(), vec![2.0, 3.0, 4.0]);

    let tail = a.range_from(2).unwrap();
    a.transform_range(0, 2, |x| x * tail.get(0).unwrap()).unwrap();
    assert_eq!(a.to_vec(), vec![8.0, 12.0, 4.0]);
}

#[test]
fn vector_matrix_product() {
    let v = array(&[1.0, 2.0]);
    let m = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(v.mul_matrix(&m).unwrap().to_vec(), vec![9.0, 12.0, 15.0]);
    assert!(matches!(
        v.mul_matrix(&m.transpose()),
        Err(Error::IncompatibleShape(_))
    ));
}

// ───────────────────────── algorithms ─────────────────────────

#[test]
fn reductions() {
    let a = array(&[3.0, -1.0, 4.0, 1.0, 5.0]);
    assert_eq!(a.min().unwrap(), -1.0);
    assert_eq!(a.max().unwrap(), 5.0);
    assert_eq!(a.max_range(0, 3).unwrap(), 4.0);
    assert_eq!(a.accumulate(), 12.0);
    assert_eq!(a.accumulate_range(1, 3, 10.0).unwrap(), 13.0);
    assert!(Array::new(0).min().is_err());
}

#[test]
fn adjacent_differences() {
    let a = array(&[1.0, 4.0, 9.0, 16.0]);
    assert_eq!(a.adjacent_difference().to_vec(), vec![1.0, 3.0, 5.0, 7.0]);
    assert_eq!(
        a.adjacent_difference_range(1, 4).unwrap().to_vec(),
        vec![4.0, 5.0, 7.0]
    );
    assert_eq!(
        a.adjacent_difference_with(|c, p| c / p).to_vec(),
        vec![1.0, 4.0, 2.25, 16.0 / 9.0]
    );
}

#[test]
fn bounds_on_sorted_data() {
    let mut a = array(&[5.0, 1.0, 3.0, 3.0, 2.0]);
    a.sort().unwrap();
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 3.0, 5.0]);
    assert_eq!(a.lower_bound(3.0), 2);
    assert_eq!(a.upper_bound(3.0), 4);
    assert_eq!(a.lower_bound(10.0), 5);
    assert_eq!(a.lower_bound_by(0, 3, 3.0, |x, y| x < y).unwrap(), 2);
}

#[test]
fn outer_products() {
    let a = array(&[1.0, 2.0]);
    let b = array(&[3.0, 4.0, 5.0]);
    let m = a.outer_product(&b);
    assert_eq!((m.rows(), m.cols()), (2, 3));
    assert_eq!(m.to_vec(), vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);

    let partial = a.outer_product_range(&b, 1, 3).unwrap();
    assert_eq!(partial.to_vec(), vec![4.0, 5.0, 8.0, 10.0]);
    assert_abs_diff_eq!(a.dot_product_range(&b, 1, 3).unwrap(), 14.0);
}

#[test]
fn fill_and_swap() {
    let mut a = array(&[1.0, 2.0, 3.0]);
    let mut b = array(&[4.0, 5.0, 6.0]);
    a.swap(&mut b).unwrap();
    assert_eq!(a.to_vec(), vec![4.0, 5.0, 6.0]);
    assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0]);

    a.fill_from(&b).unwrap();
    assert_eq!(a, b);
    a.range(1, 3).unwrap().fill(0.0).unwrap();
    assert_eq!(a.to_vec(), vec![1.0, 0.0, 0.0]);
}

#[test]
fn display_and_nalgebra_interop() {
    let a = array(&[1.0, 2.5]);
    assert_eq!(a.to_string(), "[1, 2.5]");
    let v = a.to_dvector();
    assert_eq!(Array::from(v), a);
}
