//! Property tests for arithmetic identities and view invariants.

use proptest::prelude::*;
use ql_math::{Array, Matrix};

fn matrix(max_rows: usize, max_cols: usize) -> impl Strategy<Value = Matrix> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(r, c)| {
        proptest::collection::vec(-100.0_f64..100.0, r * c)
            .prop_map(move |data| Matrix::from_row_slice(r, c, &data).unwrap())
    })
}

fn matrix_pair(max_rows: usize, max_cols: usize) -> impl Strategy<Value = (Matrix, Matrix)> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(r, c)| {
        let v = || proptest::collection::vec(-100.0_f64..100.0, r * c);
        (v(), v()).prop_map(move |(a, b)| {
            (
                Matrix::from_row_slice(r, c, &a).unwrap(),
                Matrix::from_row_slice(r, c, &b).unwrap(),
            )
        })
    })
}

fn close(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= tol * x.abs().max(1.0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn add_then_sub_restores((a, b) in matrix_pair(6, 6)) {
        let back = a.add(&b).unwrap().sub(&b).unwrap();
        prop_assert!(close(&back.to_vec(), &a.to_vec(), 1e-12));
    }

    #[test]
    fn scale_then_divide_restores(a in matrix(6, 6), s in prop_oneof![-50.0_f64..-0.01, 0.01_f64..50.0]) {
        let back = a.mul_scalar(s).div_scalar(s);
        prop_assert!(close(&back.to_vec(), &a.to_vec(), 1e-12));
    }

    #[test]
    fn double_transpose_is_exact(a in matrix(6, 6)) {
        let tt = a.transpose().transpose();
        prop_assert_eq!(tt.rows(), a.rows());
        prop_assert_eq!(tt.to_vec(), a.to_vec());
    }

    #[test]
    fn views_report_consistent_sizes(a in matrix(8, 8), r0 in 0usize..8, c0 in 0usize..8) {
        let (r0, c0) = (r0 % a.rows(), c0 % a.cols());
        let view = a.range(r0, a.rows(), c0, a.cols()).unwrap();
        prop_assert_eq!(view.size(), view.rows() * view.cols());
        prop_assert!(view.address().iter().all(|o| o < a.size()));
        let t = view.transpose();
        prop_assert_eq!(t.size(), view.size());
        prop_assert!(t.address().iter().all(|o| o < a.size()));
    }

    #[test]
    fn array_sort_orders_values(values in proptest::collection::vec(-1e6_f64..1e6, 0..50)) {
        let mut a = Array::from_slice(&values);
        a.sort().unwrap();
        let sorted = a.to_vec();
        prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(sorted.len(), values.len());
    }
}
